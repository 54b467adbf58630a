//! CLI entry point for the RV32I simulator binary.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use rv32i_core::{disassemble, to_hex32, Memory, SingleHartCpu};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: rv32i-sim [-d] [-i] [-r] [-z] [-l exec-limit] [-m hex-mem-size] infile

Options:
  -d                 show the disassembly before execution
  -i                 show each instruction as it executes
  -l <exec-limit>    maximum number of instructions to execute (0 = no limit)
  -m <hex-mem-size>  memory size in hex bytes (default: 100)
  -r                 dump the hart state before each instruction
  -z                 dump the hart state and memory after the simulation
  -h, --help         show this help message

Examples:
  rv32i-sim program.bin
  rv32i-sim -d -z -m 8000 program.bin
  rv32i-sim -i -l 1000 program.bin
";

const DEFAULT_MEMORY_SIZE: u32 = 0x100;

#[derive(Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
struct SimArgs {
    infile: PathBuf,
    memory_size: u32,
    exec_limit: u64,
    show_disassembly: bool,
    show_instructions: bool,
    show_registers: bool,
    dump_state: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(SimArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut infile: Option<PathBuf> = None;
    let mut memory_size = DEFAULT_MEMORY_SIZE;
    let mut exec_limit: u64 = 0;
    let mut show_disassembly = false;
    let mut show_instructions = false;
    let mut show_registers = false;
    let mut dump_state = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "-d" {
            show_disassembly = true;
            continue;
        }

        if arg == "-i" {
            show_instructions = true;
            continue;
        }

        if arg == "-r" {
            show_registers = true;
            continue;
        }

        if arg == "-z" {
            dump_state = true;
            continue;
        }

        if arg == "-l" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -l".to_string())?;
            exec_limit = value
                .to_string_lossy()
                .parse()
                .map_err(|_| format!("invalid exec-limit: {}", value.to_string_lossy()))?;
            continue;
        }

        if arg == "-m" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -m".to_string())?;
            memory_size = u32::from_str_radix(value.to_string_lossy().as_ref(), 16)
                .map_err(|_| format!("invalid hex-mem-size: {}", value.to_string_lossy()))?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if infile.is_some() {
            return Err("multiple input files provided".to_string());
        }
        infile = Some(PathBuf::from(arg));
    }

    let infile = infile.ok_or_else(|| "missing input file".to_string())?;
    Ok(ParseResult::Run(SimArgs {
        infile,
        memory_size,
        exec_limit,
        show_disassembly,
        show_instructions,
        show_registers,
        dump_state,
    }))
}

fn disassemble_image<W: Write>(mem: &Memory, out: &mut W) -> io::Result<()> {
    let mut addr = 0;
    while addr < mem.size() {
        let word = mem.get32(addr);
        writeln!(
            out,
            "{}: {}  {}",
            to_hex32(addr),
            to_hex32(word),
            disassemble(addr, word)
        )?;
        addr += 4;
    }
    Ok(())
}

fn run_simulation(args: &SimArgs) -> Result<(), i32> {
    let mut mem = Memory::new(args.memory_size);
    if let Err(e) = mem.load_file(&args.infile) {
        eprintln!("{e}");
        eprintln!("{USAGE_TEXT}");
        return Err(1);
    }

    if args.show_disassembly {
        let stdout = io::stdout();
        if let Err(e) = disassemble_image(&mem, &mut stdout.lock()) {
            eprintln!("error: failed to write output: {e}");
            return Err(1);
        }
    }

    // The cpu holds the memory borrow; the hart dump happens inside its
    // scope, the memory dump after.
    {
        let mut cpu = SingleHartCpu::new(&mut mem);
        cpu.hart_mut().set_show_instructions(args.show_instructions);
        cpu.hart_mut().set_show_registers(args.show_registers);

        if let Err(e) = cpu.run(args.exec_limit) {
            eprintln!("error: failed to write output: {e}");
            return Err(1);
        }

        if args.dump_state {
            let stdout = io::stdout();
            if let Err(e) = cpu.hart().dump(&mut stdout.lock(), "") {
                eprintln!("error: failed to write output: {e}");
                return Err(1);
            }
        }
    }

    if args.dump_state {
        let stdout = io::stdout();
        if let Err(e) = mem.dump(&mut stdout.lock()) {
            eprintln!("error: failed to write output: {e}");
            return Err(1);
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run_simulation(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
