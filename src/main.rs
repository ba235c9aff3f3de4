use std::error::Error;

use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands};

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    logging::init_logging(cli.log_level, cli.log_file.as_deref())?;
    match cli.command {
        Commands::Build(args) => commands::run_build(&args),
        Commands::Watch(args) => commands::run_watch(&args),
        Commands::Cell(args) => commands::run_cell(&args),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
