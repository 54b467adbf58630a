//! Hart state machine: fetch, dispatch, halt bookkeeping, and dumps.
//!
//! A hart is either running or halted; halting is terminal and carries one
//! of a fixed set of reasons. Nothing here surfaces halts as `Result`s —
//! callers poll [`Hart::is_halted`] and [`Hart::halt_reason`] after ticking.

mod exec;

use std::fmt;
use std::io::{self, Write};

use crate::hex::to_hex32;
use crate::memory::Memory;
use crate::registers::RegisterFile;

/// Column width the rendered instruction is padded to in execution traces.
pub const INSTRUCTION_WIDTH: usize = 35;

/// Why a hart stopped; reported verbatim by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HaltReason {
    /// Not halted.
    None,
    /// An `ebreak` reached execution.
    Ebreak,
    /// An `ecall` reached execution.
    Ecall,
    /// A CSRRS-family instruction named a CSR outside the modeled range.
    IllegalCsr,
    /// A word with no RV32I interpretation reached execution.
    IllegalInstruction,
    /// The pc stopped being a multiple of 4.
    PcAlignment,
}

impl HaltReason {
    /// The exact report string for this reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ebreak => "EBREAK instruction",
            Self::Ecall => "ECALL instruction",
            Self::IllegalCsr => "Illegal CSR in CRRSS instruction",
            Self::IllegalInstruction => "Illegal instruction",
            Self::PcAlignment => "PC alignment error",
        }
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated hardware thread.
///
/// The hart owns its register file exclusively and borrows the memory it
/// executes against for its whole lifetime; the memory lives outside and
/// outlives the hart.
#[derive(Debug)]
pub struct Hart<'m> {
    mem: &'m mut Memory,
    regs: RegisterFile,
    pc: u32,
    insn_counter: u64,
    halt_reason: HaltReason,
    mhartid: u32,
    show_instructions: bool,
    show_registers: bool,
}

impl<'m> Hart<'m> {
    /// Creates a hart in power-on state over `mem`.
    #[must_use]
    pub const fn new(mem: &'m mut Memory) -> Self {
        Self {
            mem,
            regs: RegisterFile::new(),
            pc: 0,
            insn_counter: 0,
            halt_reason: HaltReason::None,
            mhartid: 0,
            show_instructions: false,
            show_registers: false,
        }
    }

    /// Enables printing each executed instruction with its computation.
    pub const fn set_show_instructions(&mut self, b: bool) {
        self.show_instructions = b;
    }

    /// Enables dumping the hart state before each instruction.
    pub const fn set_show_registers(&mut self, b: bool) {
        self.show_registers = b;
    }

    /// Reports whether the hart has halted. Halting is terminal.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        !matches!(self.halt_reason, HaltReason::None)
    }

    /// Why the hart halted; [`HaltReason::None`] while running.
    #[must_use]
    pub const fn halt_reason(&self) -> HaltReason {
        self.halt_reason
    }

    /// Number of instructions fetched since the last reset.
    #[must_use]
    pub const fn insn_counter(&self) -> u64 {
        self.insn_counter
    }

    /// Sets the ID the `mhartid` CSR reads back.
    pub const fn set_mhartid(&mut self, id: u32) {
        self.mhartid = id;
    }

    /// Current program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Reads general-purpose register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n > 31`, as [`RegisterFile::get`] does.
    #[must_use]
    pub const fn reg(&self, n: u32) -> i32 {
        self.regs.get(n)
    }

    /// Writes general-purpose register `n`; writes to `x0` are discarded.
    ///
    /// # Panics
    ///
    /// Panics if `n > 31`, as [`RegisterFile::set`] does.
    pub const fn set_reg(&mut self, n: u32, val: i32) {
        self.regs.set(n, val);
    }

    /// Size of the attached memory in bytes.
    #[must_use]
    pub const fn memory_size(&self) -> u32 {
        self.mem.size()
    }

    /// Returns the hart to power-on state: pc 0, counter 0, running, all
    /// registers back to the reset pattern.
    pub const fn reset(&mut self) {
        self.pc = 0;
        self.regs.reset();
        self.insn_counter = 0;
        self.halt_reason = HaltReason::None;
    }

    /// Advances the simulation by one instruction, tracing to stdout.
    ///
    /// # Errors
    ///
    /// Propagates stdout write failures.
    pub fn tick(&mut self, hdr: &str) -> io::Result<()> {
        self.tick_to(hdr, &mut io::stdout())
    }

    /// Advances the simulation by one instruction.
    ///
    /// A halted hart does nothing. Otherwise, in order: dump the hart to
    /// `out` when register tracing is on; halt on a misaligned pc without
    /// counting the instruction; count the fetch; fetch the word at pc and
    /// execute it, writing the trace line to `out` when instruction tracing
    /// is on. Every handler advances the pc itself; control transfers set it
    /// outright and nothing adds a default +4 on top.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`. Architectural conditions never
    /// surface here; they halt the hart instead.
    pub fn tick_to(&mut self, hdr: &str, out: &mut dyn Write) -> io::Result<()> {
        if self.is_halted() {
            return Ok(());
        }
        if self.show_registers {
            self.dump(out, hdr)?;
        }
        if self.pc % 4 != 0 {
            self.halt_reason = HaltReason::PcAlignment;
            return Ok(());
        }
        self.insn_counter += 1;
        let insn = self.mem.get32(self.pc);
        if self.show_instructions {
            write!(out, "{hdr}{}: {}  ", to_hex32(self.pc), to_hex32(insn))?;
            self.exec(insn, Some(out))
        } else {
            self.exec(insn, None)
        }
    }

    /// Writes the register dump followed by the pc line.
    ///
    /// # Errors
    ///
    /// Propagates failures from the sink.
    pub fn dump(&self, out: &mut dyn Write, hdr: &str) -> io::Result<()> {
        self.regs.dump(out, hdr)?;
        writeln!(out, "{hdr}{:>3} {}", "pc", to_hex32(self.pc))
    }
}
