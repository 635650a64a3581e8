use anyhow::Result;
use clap::Parser;

mod cli;
mod logging;
mod parse_cmd;
mod resolve_cmd;
mod run_cmd;
mod validate_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Command::Parse(args) => parse_cmd::run_parse(args),
        Command::Resolve(args) => resolve_cmd::run_resolve(args),
        Command::Validate(args) => validate_cmd::run_validate(args),
        Command::Run(args) => run_cmd::run_pipeline(args),
    }
}
