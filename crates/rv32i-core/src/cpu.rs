//! Single-hart CPU composition and run loop.

use std::io::{self, Write};

use crate::hart::Hart;
use crate::memory::Memory;

/// A CPU with exactly one hart.
///
/// Wraps a [`Hart`] over borrowed memory and drives it until it halts or an
/// instruction limit is reached, then reports how the run ended.
#[derive(Debug)]
pub struct SingleHartCpu<'m> {
    hart: Hart<'m>,
}

impl<'m> SingleHartCpu<'m> {
    /// Creates a CPU whose single hart executes against `mem`.
    #[must_use]
    pub const fn new(mem: &'m mut Memory) -> Self {
        Self {
            hart: Hart::new(mem),
        }
    }

    /// The underlying hart.
    #[must_use]
    pub const fn hart(&self) -> &Hart<'m> {
        &self.hart
    }

    /// The underlying hart, mutably, for pre-run configuration.
    pub const fn hart_mut(&mut self) -> &mut Hart<'m> {
        &mut self.hart
    }

    /// Runs until halt or `exec_limit` instructions, tracing to stdout.
    ///
    /// # Errors
    ///
    /// Propagates stdout write failures.
    pub fn run(&mut self, exec_limit: u64) -> io::Result<()> {
        self.run_to(exec_limit, &mut io::stdout())
    }

    /// Runs until halt or until `exec_limit` instructions have been
    /// fetched, writing enabled trace output and the final report to `out`.
    ///
    /// An `exec_limit` of zero means unbounded. Register `x2` is set to the
    /// memory size before the first instruction. The report is the halt
    /// reason on its own line (only when the hart halted) followed by the
    /// instruction count.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn run_to(&mut self, exec_limit: u64, out: &mut dyn Write) -> io::Result<()> {
        let size = self.hart.memory_size();
        self.hart.set_reg(2, size as i32);
        if exec_limit == 0 {
            while !self.hart.is_halted() {
                self.hart.tick_to("", out)?;
            }
        } else {
            while !self.hart.is_halted() && self.hart.insn_counter() < exec_limit {
                self.hart.tick_to("", out)?;
            }
        }
        if self.hart.is_halted() {
            writeln!(out, "{}", self.hart.halt_reason())?;
        }
        writeln!(out, "{} instructions executed", self.hart.insn_counter())?;
        Ok(())
    }
}
