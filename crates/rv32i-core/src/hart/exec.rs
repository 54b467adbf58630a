//! Per-family execution handlers.
//!
//! Each handler applies one instruction family's semantics and advances the
//! pc itself; control transfers set it outright and halting handlers leave
//! it at the faulting instruction. When a trace sink is supplied the handler
//! writes one line: the rendered instruction padded to
//! [`INSTRUCTION_WIDTH`], then a comment showing the concrete operand values
//! and the computed result. With no sink, no formatting work happens at all.

use std::io::{self, Write};

use super::{HaltReason, Hart, INSTRUCTION_WIDTH};
use crate::decoder::{decode, AluOp, BranchOp, CsrOp, Instruction, LoadOp, StoreOp};
use crate::disasm::render;
use crate::encoding::CSR_MHARTID;
use crate::hex::to_hex0x32;

/// Register values print in trace comments as the `0x`-prefixed hex of
/// their two's-complement bit pattern.
#[allow(clippy::cast_sign_loss)]
fn hx(v: i32) -> String {
    to_hex0x32(v as u32)
}

fn trace(out: &mut dyn Write, pc: u32, insn: &Instruction, comment: &str) -> io::Result<()> {
    writeln!(out, "{:<INSTRUCTION_WIDTH$}// {comment}", render(pc, insn))
}

#[allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation
)]
impl Hart<'_> {
    pub(crate) fn exec(&mut self, insn: u32, pos: Option<&mut dyn Write>) -> io::Result<()> {
        match decode(insn) {
            Instruction::Lui { rd, imm } => self.exec_lui(rd, imm, pos),
            Instruction::Auipc { rd, imm } => self.exec_auipc(rd, imm, pos),
            Instruction::Jal { rd, imm } => self.exec_jal(rd, imm, pos),
            Instruction::Jalr { rd, rs1, imm } => self.exec_jalr(rd, rs1, imm, pos),
            Instruction::Branch { op, rs1, rs2, imm } => self.exec_branch(op, rs1, rs2, imm, pos),
            Instruction::Load { op, rd, rs1, imm } => self.exec_load(op, rd, rs1, imm, pos),
            Instruction::Store { op, rs1, rs2, imm } => self.exec_store(op, rs1, rs2, imm, pos),
            // No subtract-immediate encoding exists; the variant is only
            // constructable by hand.
            Instruction::AluImm { op: AluOp::Sub, .. } | Instruction::Illegal { .. } => {
                self.exec_illegal(insn, pos)
            }
            Instruction::AluImm { op, rd, rs1, imm } => self.exec_alu_imm(op, rd, rs1, imm, pos),
            Instruction::AluReg { op, rd, rs1, rs2 } => self.exec_alu_reg(op, rd, rs1, rs2, pos),
            Instruction::Ecall => self.exec_ecall(pos),
            Instruction::Ebreak => self.exec_ebreak(pos),
            Instruction::Csr { op, rd, csr, src } => self.exec_csr(op, rd, csr, src, pos),
        }
    }

    fn exec_lui(&mut self, rd: u32, imm: i32, pos: Option<&mut dyn Write>) -> io::Result<()> {
        if let Some(out) = pos {
            let comment = format!("x{rd} = {}", hx(imm));
            trace(out, self.pc, &Instruction::Lui { rd, imm }, &comment)?;
        }
        self.regs.set(rd, imm);
        self.pc = self.pc.wrapping_add(4);
        Ok(())
    }

    fn exec_auipc(&mut self, rd: u32, imm: i32, pos: Option<&mut dyn Write>) -> io::Result<()> {
        let val = self.pc.wrapping_add(imm as u32);
        if let Some(out) = pos {
            let comment = format!(
                "x{rd} = {} + {} = {}",
                to_hex0x32(self.pc),
                to_hex0x32(imm as u32),
                to_hex0x32(val)
            );
            trace(out, self.pc, &Instruction::Auipc { rd, imm }, &comment)?;
        }
        self.regs.set(rd, val as i32);
        self.pc = self.pc.wrapping_add(4);
        Ok(())
    }

    fn exec_jal(&mut self, rd: u32, imm: i32, pos: Option<&mut dyn Write>) -> io::Result<()> {
        let link = self.pc.wrapping_add(4);
        let target = self.pc.wrapping_add(imm as u32);
        if let Some(out) = pos {
            let comment = format!(
                "x{rd} = {},  pc = {} + {} = {}",
                to_hex0x32(link),
                to_hex0x32(self.pc),
                to_hex0x32(imm as u32),
                to_hex0x32(target)
            );
            trace(out, self.pc, &Instruction::Jal { rd, imm }, &comment)?;
        }
        self.regs.set(rd, link as i32);
        self.pc = target;
        Ok(())
    }

    fn exec_jalr(
        &mut self,
        rd: u32,
        rs1: u32,
        imm: i32,
        pos: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let link = self.pc.wrapping_add(4);
        let base = self.regs.get(rs1) as u32;
        let target = base.wrapping_add(imm as u32) & 0xffff_fffe;
        if let Some(out) = pos {
            let comment = format!(
                "x{rd} = {},  pc = ({} + {}) & 0xfffffffe = {}",
                to_hex0x32(link),
                to_hex0x32(imm as u32),
                to_hex0x32(base),
                to_hex0x32(target)
            );
            trace(out, self.pc, &Instruction::Jalr { rd, rs1, imm }, &comment)?;
        }
        self.regs.set(rd, link as i32);
        self.pc = target;
        Ok(())
    }

    fn exec_branch(
        &mut self,
        op: BranchOp,
        rs1: u32,
        rs2: u32,
        imm: i32,
        pos: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let lhs = self.regs.get(rs1);
        let rhs = self.regs.get(rs2);
        let taken = match op {
            BranchOp::Beq => lhs == rhs,
            BranchOp::Bne => lhs != rhs,
            BranchOp::Blt => lhs < rhs,
            BranchOp::Bge => lhs >= rhs,
            BranchOp::Bltu => (lhs as u32) < (rhs as u32),
            BranchOp::Bgeu => (lhs as u32) >= (rhs as u32),
        };
        let target = if taken {
            self.pc.wrapping_add(imm as u32)
        } else {
            self.pc.wrapping_add(4)
        };
        if let Some(out) = pos {
            let sym = match op {
                BranchOp::Beq => "==",
                BranchOp::Bne => "!=",
                BranchOp::Blt => "<",
                BranchOp::Bge => ">=",
                BranchOp::Bltu => "<U",
                BranchOp::Bgeu => ">=U",
            };
            let comment = format!(
                "pc += ({} {sym} {} ? {} : 4) = {}",
                hx(lhs),
                hx(rhs),
                to_hex0x32(imm as u32),
                to_hex0x32(target)
            );
            trace(out, self.pc, &Instruction::Branch { op, rs1, rs2, imm }, &comment)?;
        }
        self.pc = target;
        Ok(())
    }

    fn exec_load(
        &mut self,
        op: LoadOp,
        rd: u32,
        rs1: u32,
        imm: i32,
        pos: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let base = self.regs.get(rs1) as u32;
        let addr = base.wrapping_add(imm as u32);
        let val = match op {
            LoadOp::Lb => self.mem.get8_sx(addr),
            LoadOp::Lh => self.mem.get16_sx(addr),
            LoadOp::Lw => self.mem.get32_sx(addr),
            LoadOp::Lbu => i32::from(self.mem.get8(addr)),
            LoadOp::Lhu => i32::from(self.mem.get16(addr)),
        };
        if let Some(out) = pos {
            let ext = if matches!(op, LoadOp::Lbu | LoadOp::Lhu) {
                "zx"
            } else {
                "sx"
            };
            let unit = match op {
                LoadOp::Lb | LoadOp::Lbu => "m8",
                LoadOp::Lh | LoadOp::Lhu => "m16",
                LoadOp::Lw => "m32",
            };
            let comment = format!(
                "x{rd} = {ext}({unit}({} + {})) = {}",
                to_hex0x32(base),
                to_hex0x32(imm as u32),
                hx(val)
            );
            trace(out, self.pc, &Instruction::Load { op, rd, rs1, imm }, &comment)?;
        }
        self.regs.set(rd, val);
        self.pc = self.pc.wrapping_add(4);
        Ok(())
    }

    fn exec_store(
        &mut self,
        op: StoreOp,
        rs1: u32,
        rs2: u32,
        imm: i32,
        pos: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let base = self.regs.get(rs1) as u32;
        let addr = base.wrapping_add(imm as u32);
        let val = self.regs.get(rs2) as u32;
        let (unit, stored) = match op {
            StoreOp::Sb => ("m8", val & 0xff),
            StoreOp::Sh => ("m16", val & 0xffff),
            StoreOp::Sw => ("m32", val),
        };
        if let Some(out) = pos {
            let comment = format!(
                "{unit}({} + {}) = {}",
                to_hex0x32(base),
                to_hex0x32(imm as u32),
                to_hex0x32(stored)
            );
            trace(out, self.pc, &Instruction::Store { op, rs1, rs2, imm }, &comment)?;
        }
        match op {
            StoreOp::Sb => self.mem.set8(addr, stored as u8),
            StoreOp::Sh => self.mem.set16(addr, stored as u16),
            StoreOp::Sw => self.mem.set32(addr, stored),
        }
        self.pc = self.pc.wrapping_add(4);
        Ok(())
    }

    fn exec_alu_imm(
        &mut self,
        op: AluOp,
        rd: u32,
        rs1: u32,
        imm: i32,
        pos: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let a = self.regs.get(rs1);
        let val = match op {
            AluOp::Add => a.wrapping_add(imm),
            AluOp::Slt => i32::from(a < imm),
            AluOp::Sltu => i32::from((a as u32) < (imm as u32)),
            AluOp::Xor => a ^ imm,
            AluOp::Or => a | imm,
            AluOp::And => a & imm,
            AluOp::Sll => a.wrapping_shl(imm as u32),
            AluOp::Srl => ((a as u32).wrapping_shr(imm as u32)) as i32,
            AluOp::Sra => a.wrapping_shr(imm as u32),
            AluOp::Sub => unreachable!(),
        };
        if let Some(out) = pos {
            let comment = match op {
                AluOp::Add => format!("x{rd} = {} + {} = {}", hx(a), hx(imm), hx(val)),
                AluOp::Slt => format!("x{rd} = ({} < {}) ? 1 : 0 = {}", hx(a), hx(imm), hx(val)),
                AluOp::Sltu => {
                    format!("x{rd} = ({} <U {}) ? 1 : 0 = {}", hx(a), hx(imm), hx(val))
                }
                AluOp::Xor => format!("x{rd} = {} ^ {} = {}", hx(a), hx(imm), hx(val)),
                AluOp::Or => format!("x{rd} = {} | {} = {}", hx(a), hx(imm), hx(val)),
                AluOp::And => format!("x{rd} = {} & {} = {}", hx(a), hx(imm), hx(val)),
                AluOp::Sll => format!("x{rd} = {} << {imm} = {}", hx(a), hx(val)),
                AluOp::Srl | AluOp::Sra => format!("x{rd} = {} >> {imm} = {}", hx(a), hx(val)),
                AluOp::Sub => unreachable!(),
            };
            trace(out, self.pc, &Instruction::AluImm { op, rd, rs1, imm }, &comment)?;
        }
        self.regs.set(rd, val);
        self.pc = self.pc.wrapping_add(4);
        Ok(())
    }

    fn exec_alu_reg(
        &mut self,
        op: AluOp,
        rd: u32,
        rs1: u32,
        rs2: u32,
        pos: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let a = self.regs.get(rs1);
        let b = self.regs.get(rs2);
        let shamt = (b as u32) & 0x1f;
        let val = match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Slt => i32::from(a < b),
            AluOp::Sltu => i32::from((a as u32) < (b as u32)),
            AluOp::Xor => a ^ b,
            AluOp::Or => a | b,
            AluOp::And => a & b,
            AluOp::Sll => a.wrapping_shl(shamt),
            AluOp::Srl => ((a as u32) >> shamt) as i32,
            AluOp::Sra => a >> shamt,
        };
        if let Some(out) = pos {
            let comment = match op {
                AluOp::Add => format!("x{rd} = {} + {} = {}", hx(a), hx(b), hx(val)),
                AluOp::Sub => format!("x{rd} = {} - {} = {}", hx(a), hx(b), hx(val)),
                AluOp::Slt => format!("x{rd} = ({} < {}) ? 1 : 0 = {}", hx(a), hx(b), hx(val)),
                AluOp::Sltu => format!("x{rd} = ({} <U {}) ? 1 : 0 = {}", hx(a), hx(b), hx(val)),
                AluOp::Xor => format!("x{rd} = {} ^ {} = {}", hx(a), hx(b), hx(val)),
                AluOp::Or => format!("x{rd} = {} | {} = {}", hx(a), hx(b), hx(val)),
                AluOp::And => format!("x{rd} = {} & {} = {}", hx(a), hx(b), hx(val)),
                AluOp::Sll => format!("x{rd} = {} << {shamt} = {}", hx(a), hx(val)),
                AluOp::Srl | AluOp::Sra => format!("x{rd} = {} >> {shamt} = {}", hx(a), hx(val)),
            };
            trace(out, self.pc, &Instruction::AluReg { op, rd, rs1, rs2 }, &comment)?;
        }
        self.regs.set(rd, val);
        self.pc = self.pc.wrapping_add(4);
        Ok(())
    }

    fn exec_ecall(&mut self, pos: Option<&mut dyn Write>) -> io::Result<()> {
        if let Some(out) = pos {
            trace(out, self.pc, &Instruction::Ecall, "HALT")?;
        }
        self.halt_reason = HaltReason::Ecall;
        Ok(())
    }

    fn exec_ebreak(&mut self, pos: Option<&mut dyn Write>) -> io::Result<()> {
        if let Some(out) = pos {
            trace(out, self.pc, &Instruction::Ebreak, "HALT")?;
        }
        self.halt_reason = HaltReason::Ebreak;
        Ok(())
    }

    fn exec_csr(
        &mut self,
        op: CsrOp,
        rd: u32,
        csr: u32,
        src: u32,
        pos: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let decoded = Instruction::Csr { op, rd, csr, src };
        // Only the set forms police the CSR index.
        if op.is_set_form() && csr > 31 && csr != CSR_MHARTID {
            if let Some(out) = pos {
                trace(out, self.pc, &decoded, "HALT")?;
            }
            self.halt_reason = HaltReason::IllegalCsr;
            return Ok(());
        }
        let operand = if op.is_immediate() {
            src as i32
        } else {
            self.regs.get(src)
        };
        let skip_read = matches!(op, CsrOp::Csrrw | CsrOp::Csrrwi) && rd == 0;
        let old = if skip_read { 0 } else { self.csr_read(csr) };
        let new_val = match op {
            CsrOp::Csrrw | CsrOp::Csrrwi => Some(operand),
            CsrOp::Csrrs | CsrOp::Csrrsi => (src != 0).then_some(old | operand),
            CsrOp::Csrrc | CsrOp::Csrrci => (src != 0).then_some(old & !operand),
        };
        if let Some(out) = pos {
            let comment = format!("x{rd} = {}", hx(old));
            trace(out, self.pc, &decoded, &comment)?;
        }
        self.regs.set(rd, old);
        if let Some(v) = new_val {
            self.csr_write(csr, v);
        }
        self.pc = self.pc.wrapping_add(4);
        Ok(())
    }

    /// CSR reads alias the general register file by the low five index
    /// bits; 0xf14 reads the configured hart ID instead.
    const fn csr_read(&self, csr: u32) -> i32 {
        if csr == CSR_MHARTID {
            self.mhartid as i32
        } else {
            self.regs.get(csr & 0x1f)
        }
    }

    /// CSR writes alias the general register file; writes aimed at the
    /// hart-ID register are discarded.
    const fn csr_write(&mut self, csr: u32, val: i32) {
        if csr != CSR_MHARTID {
            self.regs.set(csr & 0x1f, val);
        }
    }

    fn exec_illegal(&mut self, insn: u32, pos: Option<&mut dyn Write>) -> io::Result<()> {
        if let Some(out) = pos {
            writeln!(out, "{}", render(self.pc, &Instruction::Illegal { insn }))?;
        }
        self.halt_reason = HaltReason::IllegalInstruction;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_wrap)]
mod tests {
    use crate::hart::{HaltReason, Hart};
    use crate::memory::Memory;

    fn step(hart: &mut Hart<'_>) {
        hart.tick_to("", &mut Vec::new()).unwrap();
    }

    #[test]
    fn lui_loads_upper_immediate() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x1234_5137); // lui x2,0x12345
        let mut hart = Hart::new(&mut mem);
        step(&mut hart);
        assert_eq!(hart.reg(2), 0x1234_5000);
        assert_eq!(hart.pc(), 4);
        assert!(!hart.is_halted());
    }

    #[test]
    fn addi_wraps_on_overflow() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0010_8113); // addi x2,x1,1
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, i32::MAX);
        step(&mut hart);
        assert_eq!(hart.reg(2), i32::MIN);
    }

    #[test]
    fn jal_links_and_jumps() {
        let mut mem = Memory::new(0x200);
        mem.set32(0x100, 0x0200_00ef); // jal x1,0x20
        let mut hart = Hart::new(&mut mem);
        hart.pc = 0x100;
        step(&mut hart);
        assert_eq!(hart.pc(), 0x120);
        assert_eq!(hart.reg(1), 0x104);
    }

    #[test]
    fn jalr_clears_the_low_target_bit() {
        let mut mem = Memory::new(0x200);
        mem.set32(0, 0x0010_8167); // jalr x2,1(x1)
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, 0x103);
        step(&mut hart);
        assert_eq!(hart.pc(), 0x104);
        assert_eq!(hart.reg(2), 4);
    }

    #[test]
    fn branch_taken_and_not_taken() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0020_8463); // beq x1,x2,8
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, 5);
        hart.set_reg(2, 5);
        step(&mut hart);
        assert_eq!(hart.pc(), 8);

        let mut mem = Memory::new(16);
        mem.set32(0, 0x0020_9463); // bne x1,x2,8
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, 5);
        hart.set_reg(2, 5);
        step(&mut hart);
        assert_eq!(hart.pc(), 4);
    }

    #[test]
    fn bltu_compares_unsigned() {
        // x1 = -1 is the largest unsigned value, so bltu x1,x2 falls
        // through where blt jumps.
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0020_e463); // bltu x1,x2,8
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, -1);
        hart.set_reg(2, 1);
        step(&mut hart);
        assert_eq!(hart.pc(), 4);

        let mut mem = Memory::new(16);
        mem.set32(0, 0x0020_c463); // blt x1,x2,8
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, -1);
        hart.set_reg(2, 1);
        step(&mut hart);
        assert_eq!(hart.pc(), 8);
    }

    #[test]
    fn store_then_load_round_trips_a_word() {
        let mut mem = Memory::new(64);
        mem.set32(0, 0x0230_2023); // sw x3,32(x0)
        mem.set32(4, 0x0200_2203); // lw x4,32(x0)
        {
            let mut hart = Hart::new(&mut mem);
            hart.set_reg(3, 0xdead_beef_u32 as i32);
            step(&mut hart);
            step(&mut hart);
            assert_eq!(hart.reg(4), 0xdead_beef_u32 as i32);
        }
        assert_eq!(mem.get32(32), 0xdead_beef);
    }

    #[test]
    fn lb_sign_extends_and_lbu_zero_extends() {
        let mut mem = Memory::new(64);
        mem.set32(0, 0x0200_0283); // lb x5,32(x0)
        mem.set32(4, 0x0200_4303); // lbu x6,32(x0)
        mem.set8(32, 0xa5);
        let mut hart = Hart::new(&mut mem);
        step(&mut hart);
        step(&mut hart);
        assert_eq!(hart.reg(5), 0xffff_ffa5_u32 as i32);
        assert_eq!(hart.reg(6), 0xa5);
    }

    #[test]
    fn sb_stores_only_the_low_byte() {
        let mut mem = Memory::new(64);
        mem.set32(0, 0x0010_0823); // sb x1,16(x0)
        {
            let mut hart = Hart::new(&mut mem);
            hart.set_reg(1, 0x1234_5678);
            step(&mut hart);
        }
        assert_eq!(mem.get8(16), 0x78);
        assert_eq!(mem.get8(17), 0xa5);
    }

    #[test]
    fn sll_masks_the_shift_amount_to_five_bits() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0020_91b3); // sll x3,x1,x2
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, 1);
        hart.set_reg(2, 33);
        step(&mut hart);
        assert_eq!(hart.reg(3), 2);
    }

    #[test]
    fn sra_keeps_the_sign_and_srl_does_not() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x4020_d1b3); // sra x3,x1,x2
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, -16);
        hart.set_reg(2, 2);
        step(&mut hart);
        assert_eq!(hart.reg(3), -4);

        let mut mem = Memory::new(16);
        mem.set32(0, 0x0020_d1b3); // srl x3,x1,x2
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, -16);
        hart.set_reg(2, 2);
        step(&mut hart);
        assert_eq!(hart.reg(3), 0x3fff_fffc);
    }

    #[test]
    fn sltiu_treats_minus_one_as_largest() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0xfff0_3113); // sltiu x2,x0,-1
        let mut hart = Hart::new(&mut mem);
        step(&mut hart);
        assert_eq!(hart.reg(2), 1);
    }

    #[test]
    fn slli_ignores_funct7_and_masks_negative_shamt() {
        // funct7 is not decoded for slli, so bit 31 reaches the immediate
        // and -31 % 32 stays -31; the shift itself masks to five bits.
        let mut mem = Memory::new(16);
        mem.set32(0, 0xfe10_9093); // slli x1,x1,-31
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, 3);
        step(&mut hart);
        assert!(!hart.is_halted());
        assert_eq!(hart.reg(1), 6);
    }

    #[test]
    fn ecall_halts_without_advancing_pc() {
        let mut mem = Memory::new(16);
        mem.set32(4, 0x0000_0073); // ecall
        mem.set32(0, 0x0000_0013); // addi x0,x0,0
        let mut hart = Hart::new(&mut mem);
        step(&mut hart);
        step(&mut hart);
        assert_eq!(hart.halt_reason(), HaltReason::Ecall);
        assert_eq!(hart.pc(), 4);
        assert_eq!(hart.insn_counter(), 2);
    }

    #[test]
    fn illegal_word_halts_with_reason() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0xffff_ffff);
        let mut hart = Hart::new(&mut mem);
        step(&mut hart);
        assert_eq!(hart.halt_reason(), HaltReason::IllegalInstruction);
        assert_eq!(hart.pc(), 0);
        assert_eq!(hart.insn_counter(), 1);
    }

    #[test]
    fn csrrs_reads_the_hart_id() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0xf140_22f3); // csrrs x5,0xf14,x0
        let mut hart = Hart::new(&mut mem);
        hart.set_mhartid(7);
        step(&mut hart);
        assert!(!hart.is_halted());
        assert_eq!(hart.reg(5), 7);
        assert_eq!(hart.pc(), 4);
    }

    #[test]
    fn csrrs_halts_on_unmodeled_csr() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x1230_20f3); // csrrs x1,0x123,x0
        let mut hart = Hart::new(&mut mem);
        step(&mut hart);
        assert_eq!(hart.halt_reason(), HaltReason::IllegalCsr);
        assert_eq!(hart.pc(), 0);
    }

    #[test]
    fn csrrw_does_not_police_the_csr_index() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x1230_1073); // csrrw x0,0x123,x0
        let mut hart = Hart::new(&mut mem);
        step(&mut hart);
        assert!(!hart.is_halted());
        assert_eq!(hart.pc(), 4);
    }

    #[test]
    fn csrrw_swaps_through_the_register_alias() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0033_12f3); // csrrw x5,0x003,x6
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(3, 0x11);
        hart.set_reg(6, 0x22);
        step(&mut hart);
        assert_eq!(hart.reg(5), 0x11);
        assert_eq!(hart.reg(3), 0x22);
    }

    #[test]
    fn csrrsi_sets_bits_in_the_alias() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0052_e373); // csrrsi x6,0x005,5
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(5, 0x50);
        step(&mut hart);
        assert_eq!(hart.reg(6), 0x50);
        assert_eq!(hart.reg(5), 0x55);
    }

    #[test]
    fn writes_to_the_hart_id_csr_are_discarded() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0xf144_d073); // csrrwi x0,0xf14,9
        mem.set32(4, 0xf140_22f3); // csrrs x5,0xf14,x0
        let mut hart = Hart::new(&mut mem);
        hart.set_mhartid(3);
        step(&mut hart);
        assert!(!hart.is_halted());
        step(&mut hart);
        assert_eq!(hart.reg(5), 3);
    }

    #[test]
    fn trace_line_shows_the_computation() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0010_8113); // addi x2,x1,1
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(1, i32::MAX);
        hart.set_show_instructions(true);
        let mut out = Vec::new();
        hart.tick_to("", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "00000000: 00108113  addi    x2,x1,1                    \
             // x2 = 0x7fffffff + 0x00000001 = 0x80000000\n"
        );
    }

    #[test]
    fn jal_trace_shows_link_and_target() {
        let mut mem = Memory::new(0x200);
        mem.set32(0x100, 0x0200_00ef); // jal x1,0x20
        let mut hart = Hart::new(&mut mem);
        hart.pc = 0x100;
        hart.set_show_instructions(true);
        let mut out = Vec::new();
        hart.tick_to("", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "00000100: 020000ef  jal     x1,0x00000120              \
             // x1 = 0x00000104,  pc = 0x00000100 + 0x00000020 = 0x00000120\n"
        );
    }

    #[test]
    fn store_trace_shows_address_and_value() {
        let mut mem = Memory::new(64);
        mem.set32(0, 0x0230_2023); // sw x3,32(x0)
        let mut hart = Hart::new(&mut mem);
        hart.set_reg(3, 0xdead_beef_u32 as i32);
        hart.set_show_instructions(true);
        let mut out = Vec::new();
        hart.tick_to("", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "00000000: 02302023  sw      x3,32(x0)                  \
             // m32(0x00000000 + 0x00000020) = 0xdeadbeef\n"
        );
    }

    #[test]
    fn ebreak_trace_reports_halt() {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0010_0073); // ebreak
        let mut hart = Hart::new(&mut mem);
        hart.set_show_instructions(true);
        let mut out = Vec::new();
        hart.tick_to("", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "00000000: 00100073  ebreak                             // HALT\n"
        );
    }
}
