//! Cairn runner.
//!
//! Usage: `cairn-run <image> [--entry NAME] [--trace] [--disassemble]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use cairn_foundation::{Error, Result};
use cairn_machine::MachineConfig;
use cairn_machine::config::DEFAULT_ENTRY_POINT;
use cairn_runtime::{disassemble, format_stack, init_logging, run_image};

#[derive(Parser, Debug)]
#[command(name = "cairn-run", version)]
#[command(about = "Run a Cairn binary image and print the final stack")]
struct Args {
    /// Binary image to load
    image: PathBuf,

    /// Name of the value to execute
    #[arg(long, default_value = DEFAULT_ENTRY_POINT)]
    entry: String,

    /// Log every executed operation
    #[arg(long)]
    trace: bool,

    /// Print the image as source instead of running it
    #[arg(long)]
    disassemble: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(if args.trace { "warn,cairn_machine=trace" } else { "warn" });

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let image = std::fs::read(&args.image)
        .map_err(|e| Error::io(format!("failed to read '{}': {e}", args.image.display())))?;

    let source = args.image.display().to_string();

    if args.disassemble {
        let listing = disassemble(&image).map_err(|e| e.in_source(source.as_str()))?;
        print!("{listing}");
        return Ok(ExitCode::SUCCESS);
    }

    let config = MachineConfig::default()
        .with_entry_point(args.entry.clone())
        .with_trace(args.trace);
    let outcome = run_image(&image, config).map_err(|e| e.in_source(source.as_str()))?;
    print!("{}", format_stack(&outcome.stack));

    Ok(if outcome.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
