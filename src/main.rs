//! Tilesmith - Command-line tool for tile analysis and sprite export

use std::process::ExitCode;

use tilesmith::cli;

fn main() -> ExitCode {
    cli::run()
}
