//! RV32I instruction-word field extraction and encoding constants.
//!
//! Register and function fields occupy fixed bit ranges of every word; the
//! five immediate forms are reassembled from their scattered bit groups and
//! sign-extended by shifting the group up to bit 31 and arithmetic-shifting
//! back down.

/// Register width in bits; shift amounts are taken modulo this.
pub const XLEN: u32 = 32;

/// Primary opcode for `lui`.
pub const OPCODE_LUI: u32 = 0b011_0111;
/// Primary opcode for `auipc`.
pub const OPCODE_AUIPC: u32 = 0b001_0111;
/// Primary opcode for `jal`.
pub const OPCODE_JAL: u32 = 0b110_1111;
/// Primary opcode for `jalr`.
pub const OPCODE_JALR: u32 = 0b110_0111;
/// Primary opcode for the conditional-branch family.
pub const OPCODE_BTYPE: u32 = 0b110_0011;
/// Primary opcode for the load family.
pub const OPCODE_LOAD: u32 = 0b000_0011;
/// Primary opcode for the store family.
pub const OPCODE_STYPE: u32 = 0b010_0011;
/// Primary opcode for the ALU-immediate family.
pub const OPCODE_ALU_IMM: u32 = 0b001_0011;
/// Primary opcode for the register-register ALU family.
pub const OPCODE_RTYPE: u32 = 0b011_0011;
/// Primary opcode for the SYSTEM family (`ecall`/`ebreak`/CSR forms).
pub const OPCODE_SYSTEM: u32 = 0b111_0011;

/// funct3 values for the conditional-branch family.
pub mod funct3_branch {
    #![allow(missing_docs)]
    pub const BEQ: u32 = 0b000;
    pub const BNE: u32 = 0b001;
    pub const BLT: u32 = 0b100;
    pub const BGE: u32 = 0b101;
    pub const BLTU: u32 = 0b110;
    pub const BGEU: u32 = 0b111;
}

/// funct3 values for the load family.
pub mod funct3_load {
    #![allow(missing_docs)]
    pub const LB: u32 = 0b000;
    pub const LH: u32 = 0b001;
    pub const LW: u32 = 0b010;
    pub const LBU: u32 = 0b100;
    pub const LHU: u32 = 0b101;
}

/// funct3 values for the store family.
pub mod funct3_store {
    #![allow(missing_docs)]
    pub const SB: u32 = 0b000;
    pub const SH: u32 = 0b001;
    pub const SW: u32 = 0b010;
}

/// funct3 values shared by the ALU-immediate and register-register families.
pub mod funct3_alu {
    #![allow(missing_docs)]
    pub const ADD: u32 = 0b000;
    pub const SLL: u32 = 0b001;
    pub const SLT: u32 = 0b010;
    pub const SLTU: u32 = 0b011;
    pub const XOR: u32 = 0b100;
    pub const SRX: u32 = 0b101;
    pub const OR: u32 = 0b110;
    pub const AND: u32 = 0b111;
}

/// funct3 values for the CSR forms of the SYSTEM family.
pub mod funct3_csr {
    #![allow(missing_docs)]
    pub const CSRRW: u32 = 0b001;
    pub const CSRRS: u32 = 0b010;
    pub const CSRRC: u32 = 0b011;
    pub const CSRRWI: u32 = 0b101;
    pub const CSRRSI: u32 = 0b110;
    pub const CSRRCI: u32 = 0b111;
}

/// funct7 value selecting `srl`/`add` (and the immediate shift `srli`).
pub const FUNCT7_BASE: u32 = 0b000_0000;
/// funct7 value selecting `sra`/`sub` (and the immediate shift `srai`).
pub const FUNCT7_ALT: u32 = 0b010_0000;

/// Full-word encoding of `ecall`.
pub const INSN_ECALL: u32 = 0x0000_0073;
/// Full-word encoding of `ebreak`.
pub const INSN_EBREAK: u32 = 0x0010_0073;

/// CSR address of the `mhartid` register.
pub const CSR_MHARTID: u32 = 0xf14;

/// Extracts the primary opcode, bits 0..=6.
#[must_use]
pub const fn opcode(insn: u32) -> u32 {
    insn & 0x7f
}

/// Extracts the destination register field `rd`, bits 7..=11.
#[must_use]
pub const fn rd(insn: u32) -> u32 {
    (insn >> 7) & 0x1f
}

/// Extracts the `funct3` discriminator, bits 12..=14.
#[must_use]
pub const fn funct3(insn: u32) -> u32 {
    (insn >> 12) & 0x7
}

/// Extracts the first source register field `rs1`, bits 15..=19.
#[must_use]
pub const fn rs1(insn: u32) -> u32 {
    (insn >> 15) & 0x1f
}

/// Extracts the second source register field `rs2`, bits 20..=24.
#[must_use]
pub const fn rs2(insn: u32) -> u32 {
    (insn >> 20) & 0x1f
}

/// Extracts the `funct7` discriminator, bits 25..=31.
#[must_use]
pub const fn funct7(insn: u32) -> u32 {
    (insn >> 25) & 0x7f
}

/// Extracts the sign-extended I-type immediate (bits 31..=20).
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn imm_i(insn: u32) -> i32 {
    (insn as i32) >> 20
}

/// Extracts the U-type immediate: the top 20 bits, low 12 bits zero.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn imm_u(insn: u32) -> i32 {
    (insn & 0xffff_f000) as i32
}

/// Extracts the sign-extended S-type immediate `{insn[31:25], insn[11:7]}`.
#[must_use]
pub const fn imm_s(insn: u32) -> i32 {
    let imm = ((insn >> 25) << 5) | ((insn >> 7) & 0x1f);
    sign_extend(imm, 12)
}

/// Extracts the sign-extended B-type immediate
/// `{insn[31], insn[7], insn[30:25], insn[11:8], 0}`.
#[must_use]
pub const fn imm_b(insn: u32) -> i32 {
    let imm = (((insn >> 31) & 0x1) << 12)
        | (((insn >> 7) & 0x1) << 11)
        | (((insn >> 25) & 0x3f) << 5)
        | (((insn >> 8) & 0xf) << 1);
    sign_extend(imm, 13)
}

/// Extracts the sign-extended J-type immediate
/// `{insn[31], insn[19:12], insn[20], insn[30:21], 0}`.
#[must_use]
pub const fn imm_j(insn: u32) -> i32 {
    let imm = (((insn >> 31) & 0x1) << 20)
        | (((insn >> 12) & 0xff) << 12)
        | (((insn >> 20) & 0x1) << 11)
        | (((insn >> 21) & 0x3ff) << 1);
    sign_extend(imm, 21)
}

#[allow(clippy::cast_possible_wrap)]
const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

#[cfg(test)]
mod tests {
    use super::{
        funct3, funct7, imm_b, imm_i, imm_j, imm_s, imm_u, opcode, rd, rs1, rs2, INSN_EBREAK,
        INSN_ECALL, OPCODE_ALU_IMM, OPCODE_JAL, OPCODE_LUI, OPCODE_SYSTEM,
    };

    #[test]
    fn fields_of_canonical_addi() {
        // addi x1,x0,5
        let insn = 0x0050_0093;
        assert_eq!(opcode(insn), OPCODE_ALU_IMM);
        assert_eq!(rd(insn), 1);
        assert_eq!(funct3(insn), 0);
        assert_eq!(rs1(insn), 0);
        assert_eq!(imm_i(insn), 5);
    }

    #[test]
    fn fields_of_canonical_rtype() {
        // sub x3,x1,x2
        let insn = 0x4020_81b3;
        assert_eq!(rd(insn), 3);
        assert_eq!(rs1(insn), 1);
        assert_eq!(rs2(insn), 2);
        assert_eq!(funct7(insn), 0b010_0000);
    }

    #[test]
    fn i_immediate_sign_extends() {
        // addi x1,x0,-1
        assert_eq!(imm_i(0xfff0_0093), -1);
        // addi x1,x0,-2048
        assert_eq!(imm_i(0x8000_0093), -2048);
        assert_eq!(imm_i(0x7ff0_0093), 2047);
    }

    #[test]
    fn u_immediate_keeps_low_bits_clear() {
        // lui x1,0x12345
        let insn = 0x1234_50b7;
        assert_eq!(opcode(insn), OPCODE_LUI);
        assert_eq!(imm_u(insn), 0x1234_5000);
        assert_eq!(imm_u(insn) & 0xfff, 0);
    }

    #[test]
    fn s_immediate_reassembles() {
        // sw x1,0(x0)
        assert_eq!(imm_s(0x0010_2023), 0);
        // sw x1,-4(x0) -> imm[11:5]=0x7f, imm[4:0]=0x1c
        assert_eq!(imm_s(0xfe10_2e23), -4);
    }

    #[test]
    fn b_immediate_reassembles() {
        // beq x1,x2,8
        assert_eq!(imm_b(0x0020_8463), 8);
        // bne x1,x2,-8 -> backward branch
        assert_eq!(imm_b(0xfe20_9ce3), -8);
    }

    #[test]
    fn j_immediate_reassembles() {
        // jal x1,8
        let insn = 0x0080_00ef;
        assert_eq!(opcode(insn), OPCODE_JAL);
        assert_eq!(imm_j(insn), 8);
        // jal x0,-4
        assert_eq!(imm_j(0xffdf_f06f), -4);
    }

    #[test]
    fn system_words_are_distinct() {
        assert_eq!(opcode(INSN_ECALL), OPCODE_SYSTEM);
        assert_eq!(opcode(INSN_EBREAK), OPCODE_SYSTEM);
        assert_ne!(INSN_ECALL, INSN_EBREAK);
    }
}
