//! Property coverage for the universal invariants of the machine model:
//! total decode, the x0 pin, memory clamping, and counter behavior.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use proptest::prelude::*;
use rstest as _;
use rv32i_core::{decode, render, Hart, Memory, RegisterFile, SingleHartCpu};
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

proptest! {
    #[test]
    fn property_any_word_decodes_and_renders(word in any::<u32>(), addr in any::<u32>()) {
        let text = render(addr, &decode(word));
        prop_assert!(!text.is_empty());
    }

    #[test]
    fn property_x0_stays_zero_across_any_single_step(
        word in any::<u32>(),
        seed in prop::collection::vec(any::<i32>(), 31)
    ) {
        let mut mem = Memory::new(64);
        mem.set32(0, word);
        let mut hart = Hart::new(&mut mem);
        for (i, &v) in seed.iter().enumerate() {
            hart.set_reg(i as u32 + 1, v);
        }
        hart.tick_to("", &mut Vec::new()).unwrap();
        prop_assert_eq!(hart.reg(0), 0);
        prop_assert_eq!(hart.insn_counter(), 1);
    }

    #[test]
    fn property_out_of_range_accesses_read_zero_and_drop_writes(
        size in 16u32..0x400,
        offset in 0u32..0x1000,
        value in any::<u8>()
    ) {
        let mut mem = Memory::new(size);
        let addr = mem.size() + offset;
        mem.set8(addr, value);
        prop_assert_eq!(mem.get8(addr), 0);
    }

    #[test]
    fn property_in_range_bytes_round_trip(
        addr in 0u32..64,
        value in any::<u8>()
    ) {
        let mut mem = Memory::new(64);
        mem.set8(addr, value);
        prop_assert_eq!(mem.get8(addr), value);
    }

    #[test]
    fn property_words_compose_little_endian(addr in prop::sample::select(vec![0u32, 4, 16, 40]), value in any::<u32>()) {
        let mut mem = Memory::new(64);
        mem.set32(addr, value);
        prop_assert_eq!(mem.get32(addr), value);
        prop_assert_eq!(u32::from(mem.get16(addr)), value & 0xffff);
        prop_assert_eq!(u32::from(mem.get16(addr + 2)), value >> 16);
        prop_assert_eq!(u32::from(mem.get8(addr)), value & 0xff);
    }

    #[test]
    fn property_sign_extension_matches_narrow_reinterpretation(addr in 0u32..64, value in any::<u8>()) {
        let mut mem = Memory::new(64);
        mem.set8(addr, value);
        prop_assert_eq!(mem.get8_sx(addr), i32::from(value as i8));
        prop_assert_eq!(mem.get8_sx(addr) as u32 & 0xff, u32::from(value));
    }

    #[test]
    fn property_memory_size_rounds_up_to_sixteen(size in 0u32..0x1_0000) {
        let mem = Memory::new(size);
        prop_assert_eq!(mem.size() % 16, 0);
        prop_assert!(mem.size() >= size);
        prop_assert!(mem.size() < size + 16);
    }

    #[test]
    fn property_register_writes_round_trip_except_x0(n in 1u32..32, value in any::<i32>()) {
        let mut regs = RegisterFile::new();
        regs.set(n, value);
        prop_assert_eq!(regs.get(n), value);
        regs.set(0, value);
        prop_assert_eq!(regs.get(0), 0);
    }

    #[test]
    fn property_exec_limit_bounds_the_fetch_count(limit in 1u64..50) {
        let mut mem = Memory::new(16);
        mem.set32(0, 0x0000_0063); // beq x0,x0,0
        let mut cpu = SingleHartCpu::new(&mut mem);
        cpu.run_to(limit, &mut Vec::new()).unwrap();
        prop_assert_eq!(cpu.hart().insn_counter(), limit);
    }
}
