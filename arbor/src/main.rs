//! Arbor CLI

use arbor::ast::Decoder;
use arbor::error::report_error;
use arbor::interp::Interpreter;
use arbor::{wire, Config, Error, Program};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Once;

#[derive(Parser)]
#[command(name = "arbor", version, about = "Tree-walking interpreter for wire-format ASTs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode and run a wire document
    Run {
        /// Wire document to run
        file: PathBuf,
        /// TOML file with interpreter settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Maximum number of active call frames
        #[arg(long)]
        max_depth: Option<usize>,
        /// Give every call its own frame, even in tail position
        #[arg(long)]
        no_tail_calls: bool,
    },
    /// Decode and print the normalized JSON form (debug)
    Dump {
        /// Wire document to dump
        file: PathBuf,
    },
    /// Decode without running
    Check {
        /// Wire document to check
        file: PathBuf,
    },
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber when `RUST_LOG` is set
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let (path, result) = match &cli.command {
        Command::Run {
            file,
            config,
            max_depth,
            no_tail_calls,
        } => (
            file,
            run_file(file, config.as_deref(), *max_depth, *no_tail_calls),
        ),
        Command::Dump { file } => (file, dump_file(file)),
        Command::Check { file } => (file, check_file(file)),
    };

    if let Err(e) = result {
        let filename = path.display().to_string();
        let source = std::fs::read_to_string(path).unwrap_or_default();
        if report_error(&filename, &source, &e).is_err() {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}

fn read_source(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::io_error(format!("cannot read {}: {e}", path.display())))
}

fn decode(source: &str) -> Result<(Program, Decoder), Error> {
    let doc = wire::read(source)?;
    let mut decoder = Decoder::new();
    let program = decoder.program(&doc)?;
    Ok((program, decoder))
}

fn run_file(
    path: &Path,
    config_path: Option<&Path>,
    max_depth: Option<usize>,
    no_tail_calls: bool,
) -> Result<(), Error> {
    let mut config = match config_path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    if let Some(depth) = max_depth {
        config.max_depth = depth;
    }
    if no_tail_calls {
        config.tail_calls = false;
    }
    config.validate()?;

    let source = read_source(path)?;
    let (program, _) = decode(&source)?;
    let mut interp = Interpreter::with_config(config);
    interp.run(&program)?;
    tracing::debug!(peak_depth = interp.peak_depth(), "finished");
    Ok(())
}

fn dump_file(path: &Path) -> Result<(), Error> {
    let source = read_source(path)?;
    let (program, _) = decode(&source)?;
    let json = serde_json::to_string_pretty(&program.to_json())
        .map_err(|e| Error::io_error(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn check_file(path: &Path) -> Result<(), Error> {
    let source = read_source(path)?;
    let filename = path.display().to_string();
    let (program, decoder) = decode(&source)?;

    for token in decoder.bare_tokens() {
        println!(
            "note: {filename}:{}: bare token `{}` read as a string",
            token.span, token.node
        );
    }
    println!("✓ {filename} decodes to {} statement(s)", program.stmts.len());
    Ok(())
}
