//! Artbox CLI - maintenance tools for an artwork repository

mod cli;

use clap::Parser;

fn main() {
    // Logging is initialized in run() once the flags are known
    let cli_args = cli::Cli::parse();

    let mut app = cli::ArtboxApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
