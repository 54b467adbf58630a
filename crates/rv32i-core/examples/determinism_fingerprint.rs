//! Deterministic run fingerprint generator used by CI cross-host comparison.

use proptest as _;
use rstest as _;
use rv32i_core::{Memory, SingleHartCpu};
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut mem = Memory::new(0x100);

    // Sum 5+4+3+2+1 into x6, store the result at 0x40, then stop.
    let program: [u32; 7] = [
        0x0050_0293, // addi x5,x0,5
        0x0000_0313, // addi x6,x0,0
        0x0053_0333, // add  x6,x6,x5
        0xfff2_8293, // addi x5,x5,-1
        0xfe02_9ce3, // bne  x5,x0,-8
        0x0460_2023, // sw   x6,64(x0)
        0x0010_0073, // ebreak
    ];
    let mut addr = 0;
    for word in program {
        mem.set32(addr, word);
        addr += 4;
    }

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    {
        let mut cpu = SingleHartCpu::new(&mut mem);
        cpu.run_to(0, &mut std::io::sink())
            .expect("sink writes cannot fail");

        hash_bytes(&mut hash, &cpu.hart().insn_counter().to_le_bytes());
        hash_bytes(&mut hash, cpu.hart().halt_reason().as_str().as_bytes());
        hash_bytes(&mut hash, &cpu.hart().pc().to_le_bytes());
        for n in 0..32 {
            hash_bytes(&mut hash, &cpu.hart().reg(n).to_le_bytes());
        }
    }
    for addr in 0..mem.size() {
        hash_bytes(&mut hash, &[mem.get8(addr)]);
    }

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
