//! Core crate for the RV32I instruction-set simulator.

/// Fixed-width hexadecimal rendering helpers.
pub mod hex;
pub use hex::{to_hex0x12, to_hex0x20, to_hex0x32, to_hex32, to_hex8};

/// Instruction-word field extraction and encoding constants.
pub mod encoding;

/// Total classification of instruction words into decoded variants.
pub mod decoder;
pub use decoder::{decode, AluOp, BranchOp, CsrOp, Instruction, LoadOp, StoreOp};

/// Assembly-text rendering of decoded instructions.
pub mod disasm;
pub use disasm::{disassemble, render, ILLEGAL_INSN_TEXT, MNEMONIC_WIDTH};

/// Byte-addressable little-endian simulated memory.
pub mod memory;
pub use memory::{LoadError, Memory, FILL_BYTE};

/// General-purpose register file.
pub mod registers;
pub use registers::{RegisterFile, REGISTER_COUNT, RESET_PATTERN};

/// Hart state machine: fetch, execute, halt bookkeeping.
pub mod hart;
pub use hart::{HaltReason, Hart, INSTRUCTION_WIDTH};

/// Single-hart CPU composition and run loop.
pub mod cpu;
pub use cpu::SingleHartCpu;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
