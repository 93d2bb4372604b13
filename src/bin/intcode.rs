// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run an Intcode program, either with numeric inputs given on the command line, or interactively
//! in ASCII mode using stdin and stdout

use intcode::ascii::{decode_ascii, encode_ascii};
use intcode::prelude::*;
use std::error::Error;
use std::fs::read_to_string;
use std::io::{self, Write, stdin};
use std::path::PathBuf;

use clap::Parser;
use log::info;

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "Intcode runner", long_about = None)]
struct Args {
    #[arg(help = "The comma-separated program to run")]
    source: PathBuf,
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    #[arg(help = "Comma-separated input values")]
    input: Vec<i64>,
    #[arg(short, long)]
    #[arg(help = "Read input lines from stdin and print output as ASCII text")]
    ascii: bool,
    #[arg(short, long)]
    #[arg(help = "Stop after this many outputs")]
    limit: Option<usize>,
    #[arg(short, long)]
    #[arg(help = "Print each executed instruction to stderr once finished")]
    trace: bool,
    #[arg(long)]
    #[arg(help = "Print every non-zero memory cell once finished, as `address: value` lines")]
    dump: bool,
}

fn get_line() -> Result<Vec<i64>, Box<dyn Error>> {
    let mut buf = String::new();
    if stdin().read_line(&mut buf)? == 0 {
        return Err("stdin closed while the program was awaiting input".into());
    }
    Ok(encode_ascii(&buf)?)
}

fn print_output(output: &[i64], ascii: bool) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout().lock();
    if ascii {
        write!(stdout, "{}", decode_ascii(output)?)?;
    } else {
        for value in output {
            writeln!(stdout, "{value}")?;
        }
    }
    stdout.flush()?;
    Ok(())
}

fn run(exec: &mut Executor<QueueIo>, ascii: bool) -> Result<State, Box<dyn Error>> {
    loop {
        let state = exec.run()?;
        print_output(&exec.io_mut().take_outputs(), ascii)?;
        match state {
            State::AwaitingInput if ascii => exec.io_mut().extend(get_line()?),
            _ => break Ok(state),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let program: Program = read_to_string(&args.source)
        .map_err(|e| format!("failed to read {}: {e}", args.source.display()))?
        .parse()?;
    info!("loaded {} integers from {}", program.len(), args.source.display());

    let mut queue = QueueIo::with_inputs(args.input);
    queue.set_output_limit(args.limit);
    let mut exec = Executor::new(program, queue);
    if args.trace {
        exec.start_trace();
    }

    let result = run(&mut exec, args.ascii);

    if let Some(trace) = exec.end_trace() {
        let mut stderr = io::stderr().lock();
        for instr in trace.0 {
            writeln!(stderr, "{instr}")?;
        }
    }

    let state = result?;
    info!("stopped in state {state:?} at ip {}", exec.ip());
    if state == State::AwaitingInput {
        eprintln!("program is still awaiting input");
    }

    if args.dump {
        let mut stdout = io::stdout().lock();
        for (address, value) in exec.memory().cells() {
            writeln!(stdout, "{address}: {value}")?;
        }
    }
    Ok(())
}
