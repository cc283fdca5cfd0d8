//! LS-8 Emulator - CLI Entry Point
//!
//! `ls8 <program>` loads a program file and runs it until HLT, printing every
//! PRN value on its own line. See `ls8 --help` for tracing, debugging and
//! disassembly options.

use clap::Parser;
use ls8::{Cpu, CpuConfig, CpuError, LoadError};
use ls8::cpu::ConfigError;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Exit status when `--max-cycles` stops a program that has not halted.
const EXIT_CYCLE_LIMIT: u8 = 3;

#[derive(Parser)]
#[command(name = "ls8")]
#[command(version)]
#[command(about = "An emulator for the LS-8 8-bit computer")]
struct Cli {
    /// Path to the program file (one binary byte per line)
    program: PathBuf,

    /// Log a trace line before every instruction (stderr)
    #[arg(short, long)]
    trace: bool,

    /// Stop after this many instructions
    #[arg(short, long)]
    max_cycles: Option<u64>,

    /// RET also writes the return address into its operand register
    #[arg(long)]
    legacy_ret: bool,

    /// JSON machine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the final machine state as JSON to this file
    #[arg(long)]
    dump_state: Option<PathBuf>,

    /// Print a disassembly of the program instead of running it
    #[arg(short, long, conflicts_with = "debug")]
    disasm: bool,

    /// Open the interactive debugger
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Cpu(#[from] CpuError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode machine state: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[cfg(not(feature = "tui"))]
    #[error("this build has no debugger (enable the `tui` feature)")]
    NoDebugger,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.trace);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(trace: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if trace {
        builder.filter_module("ls8::cpu", log::LevelFilter::Trace);
    }
    builder.format_timestamp(None).init();
}

fn run(cli: &Cli) -> Result<ExitCode, AppError> {
    let mut config = match &cli.config {
        Some(path) => CpuConfig::from_json_file(path)?,
        None => CpuConfig::default(),
    };
    if cli.legacy_ret {
        config.legacy_ret = true;
    }

    let program = ls8::load_program(&cli.program)?;
    log::info!("loaded {} ({} bytes)", cli.program.display(), program.len());

    if cli.disasm {
        print!("{}", ls8::disassemble(&program.bytes));
        return Ok(ExitCode::SUCCESS);
    }

    if cli.debug {
        return debug_program(program.bytes, config);
    }

    let mut cpu = Cpu::with_config(config);
    cpu.load_program(&program.bytes).map_err(CpuError::from)?;

    let stdout = std::io::stdout();
    let result = execute(&mut cpu, cli.max_cycles, &mut stdout.lock());

    if let Some(path) = &cli.dump_state {
        let json = serde_json::to_string_pretty(&cpu)?;
        std::fs::write(path, json)?;
    }

    Ok(result?.exit_code())
}

/// How a run that did not fault came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Halted,
    CycleLimit,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Halted => ExitCode::SUCCESS,
            Outcome::CycleLimit => ExitCode::from(EXIT_CYCLE_LIMIT),
        }
    }
}

/// Run to completion, writing each PRN value to `out` as it is produced.
fn execute<W: Write>(
    cpu: &mut Cpu,
    max_cycles: Option<u64>,
    out: &mut W,
) -> Result<Outcome, AppError> {
    while cpu.is_running() {
        if let Some(max) = max_cycles {
            if cpu.cycles >= max {
                log::warn!("stopped at cycle limit {} (PC={:03})", max, cpu.regs.pc);
                return Ok(Outcome::CycleLimit);
            }
        }

        cpu.step()?;
        for value in cpu.take_output() {
            writeln!(out, "{}", value)?;
        }
    }

    log::info!("halted after {} cycles", cpu.cycles);
    Ok(Outcome::Halted)
}

#[cfg(feature = "tui")]
fn debug_program(program: Vec<u8>, config: CpuConfig) -> Result<ExitCode, AppError> {
    ls8::run_debugger(program, config)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(not(feature = "tui"))]
fn debug_program(_program: Vec<u8>, _config: CpuConfig) -> Result<ExitCode, AppError> {
    Err(AppError::NoDebugger)
}
