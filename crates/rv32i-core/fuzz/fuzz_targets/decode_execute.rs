#![no_main]

use libfuzzer_sys::fuzz_target;
use rv32i_core::{decode, render, Hart, Memory};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let addr = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    let _ = render(addr, &decode(word));

    let mut mem = Memory::new(0x100);
    let image_end = data.len().min(8 + 0x100);
    let _ = mem.load(&data[8..image_end]);

    let mut hart = Hart::new(&mut mem);
    hart.set_show_instructions(true);
    let mut sink = Vec::new();
    for _ in 0..16 {
        if hart.is_halted() {
            break;
        }
        let _ = hart.tick_to("", &mut sink);
    }
});
