//! General-purpose register file.

use std::io::{self, Write};

use crate::hex::to_hex32;

/// Number of general-purpose registers in one hart.
pub const REGISTER_COUNT: usize = 32;

/// Fill pattern written by [`RegisterFile::reset`], distinguishing
/// never-written registers from legitimate zeros.
#[allow(clippy::cast_possible_wrap)]
pub const RESET_PATTERN: i32 = 0xf0f0_f0f0_u32 as i32;

/// The 32 general-purpose registers of one hart.
///
/// Register `x0` is hard-wired to zero: writes to it are discarded and reads
/// of it always produce 0. Every other register holds [`RESET_PATTERN`]
/// until written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    regs: [i32; REGISTER_COUNT],
}

impl RegisterFile {
    /// Creates a register file in reset state.
    #[must_use]
    pub const fn new() -> Self {
        let mut rf = Self {
            regs: [0; REGISTER_COUNT],
        };
        rf.reset();
        rf
    }

    /// Rewrites every register with [`RESET_PATTERN`], then forces `x0`
    /// back to 0.
    pub const fn reset(&mut self) {
        self.regs = [RESET_PATTERN; REGISTER_COUNT];
        self.regs[0] = 0;
    }

    /// Reads register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n > 31`. Register fields are exactly 5 bits wide, so an
    /// out-of-range index is a decoder defect, not a runtime condition.
    #[must_use]
    pub const fn get(&self, n: u32) -> i32 {
        self.regs[n as usize]
    }

    /// Writes register `n`; writes aimed at `x0` are discarded.
    ///
    /// # Panics
    ///
    /// Panics if `n > 31`, as for [`RegisterFile::get`].
    pub const fn set(&mut self, n: u32, val: i32) {
        if n != 0 {
            self.regs[n as usize] = val;
        }
    }

    /// Writes the canonical four-line register dump.
    ///
    /// Each line starts with `hdr` and the row label (`x0`/`x8`/`x16`/`x24`)
    /// right-justified to three columns, followed by eight values as bare
    /// hex words, with an extra space before the fifth.
    ///
    /// # Errors
    ///
    /// Propagates failures from the sink.
    #[allow(clippy::cast_sign_loss)]
    pub fn dump(&self, out: &mut dyn Write, hdr: &str) -> io::Result<()> {
        for row in 0..4 {
            let label = format!("x{}", row * 8);
            write!(out, "{hdr}{label:>3}")?;
            for col in 0..8 {
                let sep = if col == 4 { "  " } else { " " };
                write!(out, "{sep}{}", to_hex32(self.regs[row * 8 + col] as u32))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
