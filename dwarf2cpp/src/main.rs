use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dwarf2cpp::Options;

/// Reconstruct an approximate C++ header from the DWARF debug info
/// embedded in an ELF binary.
#[derive(Debug, Clone, clap::Parser)]
struct Cli {
    /// Input ELF with DWARF debug info
    elf: PathBuf,
    /// Output path for the reconstructed header
    output: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    let options = Options {
        elf: cli.elf,
        output: cli.output,
    };
    common::run(|| dwarf2cpp::extract(&options))
}
