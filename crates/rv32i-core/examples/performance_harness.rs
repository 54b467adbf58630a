//! Performance harness for rv32i-core benchmarking.
//!
//! Measures instruction throughput using the production run loop.
//!
//! ## Usage
//!
//! ```sh
//! cargo run --release -p rv32i-core --example performance_harness
//! ```
//!
//! Each workload is an endless loop; the run loop is driven in bounded
//! batches and the hart is reset between batches. The benchmark runs on
//! multiple threads to reflect batch-simulation usage, one memory and one
//! hart per thread.

#![allow(clippy::pedantic)]

use proptest as _;
use rstest as _;
use rv32i_core::{Memory, SingleHartCpu};
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const BATCH_INSTRUCTIONS: u64 = 100_000;
const NUM_THREADS: usize = 4;

static NOP_LOOP: [u32; 2] = [
    0x0000_0013, // addi x0,x0,0
    0xfe00_0ee3, // beq  x0,x0,-4
];

static ALU_LOOP: [u32; 4] = [
    0x0010_8093, // addi x1,x1,1
    0x0011_81b3, // add  x3,x3,x1
    0x0011_c233, // xor  x4,x3,x1
    0xfe00_0ae3, // beq  x0,x0,-12
];

static MEMORY_LOOP: [u32; 3] = [
    0x0410_2023, // sw x1,64(x0)
    0x0400_2103, // lw x2,64(x0)
    0xfe00_0ce3, // beq x0,x0,-8
];

static MIXED_LOOP: [u32; 5] = [
    0x0000_0013, // addi x0,x0,0
    0x0010_8093, // addi x1,x1,1
    0x0410_2023, // sw   x1,64(x0)
    0x0400_2103, // lw   x2,64(x0)
    0xfe00_08e3, // beq  x0,x0,-16
];

#[derive(Debug, Clone, Copy)]
struct BenchmarkResult {
    name: &'static str,
    instructions_per_second: f64,
}

fn benchmark(name: &'static str, program: &'static [u32], duration: Duration) -> BenchmarkResult {
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let tx = tx.clone();
            thread::spawn(move || {
                let mut mem = Memory::new(0x100);
                let mut addr = 0;
                for word in program {
                    mem.set32(addr, *word);
                    addr += 4;
                }

                let mut cpu = SingleHartCpu::new(&mut mem);
                let mut total = 0u64;
                let start = Instant::now();

                while start.elapsed() < duration {
                    cpu.run_to(BATCH_INSTRUCTIONS, &mut io::sink())
                        .expect("sink writes cannot fail");
                    total += cpu.hart().insn_counter();
                    cpu.hart_mut().reset();
                }

                tx.send(total).ok();
            })
        })
        .collect();

    for h in handles {
        h.join().ok();
    }

    drop(tx);

    let total: u64 = rx.into_iter().sum();
    BenchmarkResult {
        name,
        instructions_per_second: total as f64 / duration.as_secs_f64(),
    }
}

fn format_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.2}", n)
    }
}

fn print_results(results: &[BenchmarkResult]) {
    println!();
    println!("{:<14} {:>12} {:>12}", "benchmark", "instr/sec", "ns/instr");
    for result in results {
        println!(
            "{:<14} {:>12} {:>12.1}",
            result.name,
            format_number(result.instructions_per_second),
            1e9 / result.instructions_per_second
        );
    }
}

fn main() {
    let warmup = Duration::from_millis(200);
    let benchmark_duration = Duration::from_secs(1);

    println!("Running warmup for {warmup:?}...");
    let _ = benchmark("warmup", &NOP_LOOP, warmup);

    println!("Running benchmarks for {benchmark_duration:?} each...");

    let results = [
        benchmark("nop_loop", &NOP_LOOP, benchmark_duration),
        benchmark("alu_loop", &ALU_LOOP, benchmark_duration),
        benchmark("memory_loop", &MEMORY_LOOP, benchmark_duration),
        benchmark("mixed_loop", &MIXED_LOOP, benchmark_duration),
    ];
    print_results(&results);
}
