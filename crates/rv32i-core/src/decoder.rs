//! Single-pass instruction classification.
//!
//! [`decode`] maps any 32-bit word to a tagged [`Instruction`] carrying its
//! already-extracted operand fields. Classification is total: a combination
//! with no RV32I meaning becomes [`Instruction::Illegal`] instead of an
//! error, and the text renderer and the executor both consume the same
//! decoded value, so they can never disagree about what a word means.

use crate::encoding::{
    funct3, funct3_alu, funct3_branch, funct3_csr, funct3_load, funct3_store, funct7, imm_b, imm_i,
    imm_j, imm_s, imm_u, opcode, rd, rs1, rs2, FUNCT7_ALT, FUNCT7_BASE, INSN_EBREAK, INSN_ECALL,
    OPCODE_ALU_IMM, OPCODE_AUIPC, OPCODE_BTYPE, OPCODE_JAL, OPCODE_JALR, OPCODE_LOAD,
    OPCODE_LUI, OPCODE_RTYPE, OPCODE_STYPE, OPCODE_SYSTEM,
};

/// Comparison selected by a conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum BranchOp {
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
}

impl BranchOp {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Beq => "beq",
            Self::Bne => "bne",
            Self::Blt => "blt",
            Self::Bge => "bge",
            Self::Bltu => "bltu",
            Self::Bgeu => "bgeu",
        }
    }
}

/// Width and extension behavior of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum LoadOp {
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
}

impl LoadOp {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Lb => "lb",
            Self::Lh => "lh",
            Self::Lw => "lw",
            Self::Lbu => "lbu",
            Self::Lhu => "lhu",
        }
    }
}

/// Width of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum StoreOp {
    Sb,
    Sh,
    Sw,
}

impl StoreOp {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Sb => "sb",
            Self::Sh => "sh",
            Self::Sw => "sw",
        }
    }
}

/// Arithmetic/logic operation shared by the immediate and register forms.
///
/// `Sub` exists only in the register form; the immediate opcode has no
/// encoding for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum AluOp {
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
}

impl AluOp {
    /// Mnemonic of the register-register form.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Sll => "sll",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Xor => "xor",
            Self::Srl => "srl",
            Self::Sra => "sra",
            Self::Or => "or",
            Self::And => "and",
        }
    }

    /// Returns `true` for the three shift operations, whose operand renders
    /// and executes as a 5-bit amount rather than a full immediate.
    #[must_use]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Sll | Self::Srl | Self::Sra)
    }
}

/// CSR access form of the SYSTEM opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum CsrOp {
    Csrrw,
    Csrrs,
    Csrrc,
    Csrrwi,
    Csrrsi,
    Csrrci,
}

impl CsrOp {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Csrrw => "csrrw",
            Self::Csrrs => "csrrs",
            Self::Csrrc => "csrrc",
            Self::Csrrwi => "csrrwi",
            Self::Csrrsi => "csrrsi",
            Self::Csrrci => "csrrci",
        }
    }

    /// Returns `true` for the `csrr*i` forms, whose source operand is the
    /// 5-bit zero-extended `zimm` field instead of a register.
    #[must_use]
    pub const fn is_immediate(self) -> bool {
        matches!(self, Self::Csrrwi | Self::Csrrsi | Self::Csrrci)
    }

    /// Returns `true` for the set-bits forms, which carry the illegal-index
    /// halt check.
    #[must_use]
    pub const fn is_set_form(self) -> bool {
        matches!(self, Self::Csrrs | Self::Csrrsi)
    }
}

/// A classified RV32I instruction with extracted operand fields.
///
/// Immediates are stored fully reassembled and sign-extended; shift-immediate
/// operations store the amount already reduced modulo [`crate::encoding::XLEN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Instruction {
    /// `lui rd,imm` — load upper immediate.
    Lui {
        /// Destination register.
        rd: u32,
        /// U-type immediate, low 12 bits zero.
        imm: i32,
    },
    /// `auipc rd,imm` — add upper immediate to pc.
    Auipc {
        /// Destination register.
        rd: u32,
        /// U-type immediate, low 12 bits zero.
        imm: i32,
    },
    /// `jal rd,offset` — jump and link.
    Jal {
        /// Link register.
        rd: u32,
        /// J-type offset relative to the instruction address.
        imm: i32,
    },
    /// `jalr rd,imm(rs1)` — indirect jump and link.
    Jalr {
        /// Link register.
        rd: u32,
        /// Base register.
        rs1: u32,
        /// I-type displacement.
        imm: i32,
    },
    /// Conditional branch relative to the instruction address.
    Branch {
        /// Comparison to apply.
        op: BranchOp,
        /// Left comparand register.
        rs1: u32,
        /// Right comparand register.
        rs2: u32,
        /// B-type offset relative to the instruction address.
        imm: i32,
    },
    /// Memory read into `rd`.
    Load {
        /// Width/extension of the read.
        op: LoadOp,
        /// Destination register.
        rd: u32,
        /// Base register.
        rs1: u32,
        /// I-type displacement.
        imm: i32,
    },
    /// Memory write of the low bits of `rs2`.
    Store {
        /// Width of the write.
        op: StoreOp,
        /// Base register.
        rs1: u32,
        /// Source register.
        rs2: u32,
        /// S-type displacement.
        imm: i32,
    },
    /// Register-immediate ALU operation.
    AluImm {
        /// Operation; never `Sub`, which has no immediate encoding.
        op: AluOp,
        /// Destination register.
        rd: u32,
        /// Source register.
        rs1: u32,
        /// I-type immediate; already reduced mod 32 for shifts.
        imm: i32,
    },
    /// Register-register ALU operation.
    AluReg {
        /// Operation.
        op: AluOp,
        /// Destination register.
        rd: u32,
        /// Left source register.
        rs1: u32,
        /// Right source register.
        rs2: u32,
    },
    /// Environment call.
    Ecall,
    /// Environment breakpoint.
    Ebreak,
    /// CSR read-modify-write.
    Csr {
        /// Access form.
        op: CsrOp,
        /// Destination register for the prior CSR value.
        rd: u32,
        /// 12-bit CSR address.
        csr: u32,
        /// Source operand: a register number, or the `zimm` value for the
        /// immediate forms.
        src: u32,
    },
    /// Any word with no RV32I interpretation; the raw word is kept so the
    /// renderer and executor can report it.
    Illegal {
        /// The unrecognized instruction word.
        insn: u32,
    },
}

/// Classifies one 32-bit instruction word.
///
/// Dispatch order mirrors the encoding: primary opcode, then `funct3` where
/// the opcode covers a family, then `funct7` to split the shift and add/sub
/// pairs, and for SYSTEM a final discriminator on the whole word to separate
/// `ecall`/`ebreak` from the CSR forms.
#[must_use]
pub const fn decode(insn: u32) -> Instruction {
    match opcode(insn) {
        OPCODE_LUI => Instruction::Lui {
            rd: rd(insn),
            imm: imm_u(insn),
        },
        OPCODE_AUIPC => Instruction::Auipc {
            rd: rd(insn),
            imm: imm_u(insn),
        },
        OPCODE_JAL => Instruction::Jal {
            rd: rd(insn),
            imm: imm_j(insn),
        },
        OPCODE_JALR => Instruction::Jalr {
            rd: rd(insn),
            rs1: rs1(insn),
            imm: imm_i(insn),
        },
        OPCODE_BTYPE => decode_branch(insn),
        OPCODE_LOAD => decode_load(insn),
        OPCODE_STYPE => decode_store(insn),
        OPCODE_ALU_IMM => decode_alu_imm(insn),
        OPCODE_RTYPE => decode_alu_reg(insn),
        OPCODE_SYSTEM => decode_system(insn),
        _ => Instruction::Illegal { insn },
    }
}

const fn decode_branch(insn: u32) -> Instruction {
    let op = match funct3(insn) {
        funct3_branch::BEQ => BranchOp::Beq,
        funct3_branch::BNE => BranchOp::Bne,
        funct3_branch::BLT => BranchOp::Blt,
        funct3_branch::BGE => BranchOp::Bge,
        funct3_branch::BLTU => BranchOp::Bltu,
        funct3_branch::BGEU => BranchOp::Bgeu,
        _ => return Instruction::Illegal { insn },
    };
    Instruction::Branch {
        op,
        rs1: rs1(insn),
        rs2: rs2(insn),
        imm: imm_b(insn),
    }
}

const fn decode_load(insn: u32) -> Instruction {
    let op = match funct3(insn) {
        funct3_load::LB => LoadOp::Lb,
        funct3_load::LH => LoadOp::Lh,
        funct3_load::LW => LoadOp::Lw,
        funct3_load::LBU => LoadOp::Lbu,
        funct3_load::LHU => LoadOp::Lhu,
        _ => return Instruction::Illegal { insn },
    };
    Instruction::Load {
        op,
        rd: rd(insn),
        rs1: rs1(insn),
        imm: imm_i(insn),
    }
}

const fn decode_store(insn: u32) -> Instruction {
    let op = match funct3(insn) {
        funct3_store::SB => StoreOp::Sb,
        funct3_store::SH => StoreOp::Sh,
        funct3_store::SW => StoreOp::Sw,
        _ => return Instruction::Illegal { insn },
    };
    Instruction::Store {
        op,
        rs1: rs1(insn),
        rs2: rs2(insn),
        imm: imm_s(insn),
    }
}

const fn decode_alu_imm(insn: u32) -> Instruction {
    let imm = imm_i(insn);
    let (op, imm) = match funct3(insn) {
        funct3_alu::ADD => (AluOp::Add, imm),
        funct3_alu::SLT => (AluOp::Slt, imm),
        funct3_alu::SLTU => (AluOp::Sltu, imm),
        funct3_alu::XOR => (AluOp::Xor, imm),
        funct3_alu::OR => (AluOp::Or, imm),
        funct3_alu::AND => (AluOp::And, imm),
        // slli carries no funct7 check, so a set high bit can surface as a
        // negative rendered amount; srli/srai constrain funct7 and cannot.
        funct3_alu::SLL => (AluOp::Sll, imm % 32),
        funct3_alu::SRX => match funct7(insn) {
            FUNCT7_BASE => (AluOp::Srl, imm % 32),
            FUNCT7_ALT => (AluOp::Sra, imm % 32),
            _ => return Instruction::Illegal { insn },
        },
        _ => return Instruction::Illegal { insn },
    };
    Instruction::AluImm {
        op,
        rd: rd(insn),
        rs1: rs1(insn),
        imm,
    }
}

const fn decode_alu_reg(insn: u32) -> Instruction {
    let op = match funct3(insn) {
        funct3_alu::SLL => AluOp::Sll,
        funct3_alu::SLT => AluOp::Slt,
        funct3_alu::SLTU => AluOp::Sltu,
        funct3_alu::XOR => AluOp::Xor,
        funct3_alu::OR => AluOp::Or,
        funct3_alu::AND => AluOp::And,
        funct3_alu::ADD => match funct7(insn) {
            FUNCT7_BASE => AluOp::Add,
            FUNCT7_ALT => AluOp::Sub,
            _ => return Instruction::Illegal { insn },
        },
        funct3_alu::SRX => match funct7(insn) {
            FUNCT7_BASE => AluOp::Srl,
            FUNCT7_ALT => AluOp::Sra,
            _ => return Instruction::Illegal { insn },
        },
        _ => return Instruction::Illegal { insn },
    };
    Instruction::AluReg {
        op,
        rd: rd(insn),
        rs1: rs1(insn),
        rs2: rs2(insn),
    }
}

const fn decode_system(insn: u32) -> Instruction {
    let op = match funct3(insn) {
        0b000 => {
            return match insn {
                INSN_ECALL => Instruction::Ecall,
                INSN_EBREAK => Instruction::Ebreak,
                _ => Instruction::Illegal { insn },
            }
        }
        funct3_csr::CSRRW => CsrOp::Csrrw,
        funct3_csr::CSRRS => CsrOp::Csrrs,
        funct3_csr::CSRRC => CsrOp::Csrrc,
        funct3_csr::CSRRWI => CsrOp::Csrrwi,
        funct3_csr::CSRRSI => CsrOp::Csrrsi,
        funct3_csr::CSRRCI => CsrOp::Csrrci,
        _ => return Instruction::Illegal { insn },
    };
    Instruction::Csr {
        op,
        rd: rd(insn),
        csr: insn >> 20,
        src: rs1(insn),
    }
}
