use clap::Parser;
use std::process::ExitCode;

use guardpatch::cli::{execute, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = guardpatch::init_with_logger(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let output = execute(cli);
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    ExitCode::from(output.exit_code)
}
