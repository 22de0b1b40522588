use {
    crate::{
        common::{debug_println, DEBUG},
        prime,
    },
    asm::ast::Ast,
    clap::{Parser, Subcommand},
    isa::{Program, Reg},
    std::{path::PathBuf, sync::atomic::Ordering},
    vm::{elf, mem, Cpu, Memory},
};

#[derive(Debug, Parser)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report whether a number is prime
    Check {
        /// Number to test
        #[arg(default_value_t = 30)]
        n: i64,

        /// Run the divisor scan as machine code on the emulated CPU
        #[arg(long)]
        vm: bool,
    },
    /// Assemble a source file to a hex listing
    Assemble {
        /// Input assembly file
        input_path: PathBuf,

        /// Output file for the listing [leave unspecified for stdout]
        #[arg(short)]
        output_path: Option<PathBuf>,
    },
    /// Run an ELF image or an assembly source file
    Run {
        /// Input file
        input_path: PathBuf,

        /// Print the register file after execution
        #[arg(long)]
        print_registers: bool,
    },
}

pub(crate) fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    DEBUG.store(cli.debug, Ordering::Relaxed);
    match cli.command {
        Command::Check { n, vm } => {
            let primality = if vm && n != 1 {
                prime::Primality::from_divisor_count(n, vm_divisor_count(n)?)
            } else {
                prime::classify(n)
            };
            print!("{}", prime::sentence(n, primality));
        }
        Command::Assemble {
            input_path,
            output_path,
        } => {
            let src = std::fs::read_to_string(input_path)?;
            let ast = Ast::try_from(&*src)?;
            debug_println!("{ast:#?}");
            let program = Program::try_from(&ast)?;
            match output_path {
                Some(output_path) => std::fs::write(output_path, program.to_string())?,
                None => print!("{program}"),
            }
        }
        Command::Run {
            input_path,
            print_registers,
        } => {
            let data = std::fs::read(&input_path)?;
            let mut mem = Memory::new();
            let pc = if data.starts_with(elf::MAGIC) {
                elf::load(&mut mem, &data)?
            } else {
                let src = String::from_utf8(data)?;
                let ast = Ast::try_from(&*src)?;
                debug_println!("{ast:#?}");
                let program = Program::try_from(&ast)?;
                mem.load(mem::BASE, &program.to_bytes())?;
                mem::BASE
            };
            let mut cpu = Cpu::new(mem, pc);
            let exit = cpu.run(&mut std::io::stdout())?;
            debug_println!("ran {} instructions", exit.instructions);
            if print_registers {
                println!("{}", cpu.regs);
            }
            std::process::exit(exit.code as i32);
        }
    }
    Ok(())
}

// The same scan `prime::divisor_count` does, as RV32 machine code with n
// handed over in a0 and the count coming back as the exit code.
fn vm_divisor_count(n: i64) -> anyhow::Result<u32> {
    anyhow::ensure!(
        i32::try_from(n).is_ok(),
        "the emulated scan only handles 32-bit values",
    );
    let ast = Ast::try_from(include_str!("../demos/divisors.s"))?;
    let program = Program::try_from(&ast)?;
    let mut mem = Memory::new();
    mem.load(mem::BASE, &program.to_bytes())?;
    let mut cpu = Cpu::new(mem, mem::BASE);
    cpu.regs.set(Reg::A0, n as i32 as u32);
    let exit = cpu.run(&mut std::io::sink())?;
    debug_println!("ran {} instructions", exit.instructions);
    Ok(exit.code)
}
