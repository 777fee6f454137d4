//! Cairn assembler.
//!
//! Usage: `cairn-asm <inputs...> -o <output>`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use cairn_runtime::{Assembly, init_logging};

#[derive(Parser, Debug)]
#[command(name = "cairn-asm", version)]
#[command(about = "Assemble Cairn source files into one binary image")]
struct Args {
    /// Source files, assembled in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Path of the image to write
    #[arg(short, long, default_value = "out.cairn")]
    output: PathBuf,
}

fn main() -> ExitCode {
    init_logging("warn");
    let args = Args::parse();

    let mut assembly = Assembly::new();
    let mut failed = false;
    for input in &args.inputs {
        match assembly.add_file(input) {
            Ok(report) => {
                eprintln!("{}: {} values, {} errors", report.source, report.loaded, report.errors);
            }
            Err(e) => {
                error!("{e}");
                failed = true;
            }
        }
    }
    for diagnostic in assembly.diagnostics() {
        eprintln!("{diagnostic}");
    }

    if let Err(e) = assembly.write_to(&args.output) {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    info!(values = assembly.len(), output = %args.output.display(), "image written");

    if failed || assembly.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
