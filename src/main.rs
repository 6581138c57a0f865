//! ansiweather - current weather for your shell prompt
//!
//! Prints a one-line, colorized summary of current conditions, served from a
//! local cache when it is recent enough.

use std::process::ExitCode;

use clap::Parser;

use ansiweather::app;
use ansiweather::cli::Cli;
use ansiweather::logging::init_logger;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match app::run(&cli).await {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_timeout() => {
            eprintln!("ansiweather: {} (try again shortly)", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("ansiweather: {}", e);
            ExitCode::FAILURE
        }
    }
}
