//! Assembly-text rendering of decoded instructions.
//!
//! The renderer is the second consumer of [`decode`]: it turns a decoded
//! instruction back into the listing text, anchored at the address the word
//! was fetched from so `jal` and branch targets come out absolute.

use crate::decoder::{decode, AluOp, Instruction};
use crate::hex::{to_hex0x12, to_hex0x20, to_hex0x32};

/// Column width the mnemonic field is padded to.
pub const MNEMONIC_WIDTH: usize = 8;

/// Sentinel text for words with no RV32I interpretation.
pub const ILLEGAL_INSN_TEXT: &str = "ERROR: UNIMPLEMENTED INSTRUCTION";

/// Decodes and renders the instruction word located at `addr`.
#[must_use]
pub fn disassemble(addr: u32, insn: u32) -> String {
    render(addr, &decode(insn))
}

/// Renders a decoded instruction located at `addr`.
///
/// `addr` anchors the absolute targets of `jal` and the branches; every
/// other form ignores it.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn render(addr: u32, insn: &Instruction) -> String {
    match *insn {
        Instruction::Lui { rd, imm } => {
            format!("{}{},{}", mnemonic("lui"), reg(rd), to_hex0x20((imm >> 12) as u32))
        }
        Instruction::Auipc { rd, imm } => {
            format!("{}{},{}", mnemonic("auipc"), reg(rd), to_hex0x20((imm >> 12) as u32))
        }
        Instruction::Jal { rd, imm } => format!(
            "{}{},{}",
            mnemonic("jal"),
            reg(rd),
            to_hex0x32(addr.wrapping_add(imm as u32))
        ),
        Instruction::Jalr { rd, rs1, imm } => {
            format!("{}{},{}", mnemonic("jalr"), reg(rd), base_disp(rs1, imm))
        }
        Instruction::Branch { op, rs1, rs2, imm } => format!(
            "{}{},{},{}",
            mnemonic(op.mnemonic()),
            reg(rs1),
            reg(rs2),
            to_hex0x32(addr.wrapping_add(imm as u32))
        ),
        Instruction::Load { op, rd, rs1, imm } => format!(
            "{}{},{}",
            mnemonic(op.mnemonic()),
            reg(rd),
            base_disp(rs1, imm)
        ),
        Instruction::Store { op, rs1, rs2, imm } => format!(
            "{}{},{}",
            mnemonic(op.mnemonic()),
            reg(rs2),
            base_disp(rs1, imm)
        ),
        Instruction::AluImm { op, rd, rs1, imm } => match alu_imm_mnemonic(op) {
            Some(m) => format!("{}{},{},{imm}", mnemonic(m), reg(rd), reg(rs1)),
            None => ILLEGAL_INSN_TEXT.to_string(),
        },
        Instruction::AluReg { op, rd, rs1, rs2 } => format!(
            "{}{},{},{}",
            mnemonic(op.mnemonic()),
            reg(rd),
            reg(rs1),
            reg(rs2)
        ),
        Instruction::Ecall => "ecall".to_string(),
        Instruction::Ebreak => "ebreak".to_string(),
        Instruction::Csr { op, rd, csr, src } => {
            if op.is_immediate() {
                format!(
                    "{}{},{},{src}",
                    mnemonic(op.mnemonic()),
                    reg(rd),
                    to_hex0x12(csr)
                )
            } else {
                format!(
                    "{}{},{},{}",
                    mnemonic(op.mnemonic()),
                    reg(rd),
                    to_hex0x12(csr),
                    reg(src)
                )
            }
        }
        Instruction::Illegal { .. } => ILLEGAL_INSN_TEXT.to_string(),
    }
}

fn mnemonic(m: &str) -> String {
    format!("{m:<MNEMONIC_WIDTH$}")
}

fn reg(r: u32) -> String {
    format!("x{r}")
}

fn base_disp(base: u32, disp: i32) -> String {
    format!("{disp}({})", reg(base))
}

/// Immediate-form spelling of an ALU operation; `Sub` has none.
const fn alu_imm_mnemonic(op: AluOp) -> Option<&'static str> {
    match op {
        AluOp::Add => Some("addi"),
        AluOp::Slt => Some("slti"),
        AluOp::Sltu => Some("sltiu"),
        AluOp::Xor => Some("xori"),
        AluOp::Or => Some("ori"),
        AluOp::And => Some("andi"),
        AluOp::Sll => Some("slli"),
        AluOp::Srl => Some("srli"),
        AluOp::Sra => Some("srai"),
        AluOp::Sub => None,
    }
}
