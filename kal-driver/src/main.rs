//! Kaleidoscope Compiler Driver
//!
//! `kal [INPUT]` compiles and runs a Kaleidoscope program unit by unit,
//! reading from stdin when no file is given.

use anyhow::{Context, Result};
use clap::Parser;
use kal_driver::{Session, SessionOptions};
use kal_frontend::{CharSource, ReaderSource};
use kal_vm::ExecutionEngine;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "kal", version, about = "Kaleidoscope compiler and interpreter")]
struct Args {
    /// Source file to run (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Print the IR of every lowered function to stderr
    #[clap(long)]
    print_ir: bool,

    /// Print every parsed unit as JSON to stderr
    #[clap(long)]
    emit_ast: bool,

    /// Do not print the `ready>` prompt
    #[clap(long)]
    no_prompt: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG still overrides the default level
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let options = SessionOptions {
        print_ir: args.print_ir,
        emit_ast: args.emit_ast,
        prompt: !args.no_prompt && args.input.is_none(),
    };

    let failed = match &args.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            let parser = kal_frontend::Parser::with_filename(ReaderSource::new(file), &path.display().to_string());
            run_session(parser, options)?
        }
        None => {
            let parser = kal_frontend::Parser::with_filename(ReaderSource::new(io::stdin()), "<stdin>");
            run_session(parser, options)?
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Run every unit from `parser`; true when any unit failed
fn run_session<S: CharSource>(parser: kal_frontend::Parser<S>, options: SessionOptions) -> Result<bool> {
    let engine = ExecutionEngine::with_echo(true);
    let mut session = Session::new(parser, engine, io::stderr(), options);
    session.run()?;
    Ok(session.has_errors())
}
