//! mig CLI - schema migrations discovered across multiple directories

use clap::Parser;
use std::process;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::ExitCode;
use commands::{create, down, history, mark, new, redo, to, up};

fn main() -> process::ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Up(args) => up::execute(args, &cli.global),
        cli::Commands::Down(args) => down::execute(args, &cli.global),
        cli::Commands::Redo(args) => redo::execute(args, &cli.global),
        cli::Commands::To(args) => to::execute(args, &cli.global),
        cli::Commands::Mark(args) => mark::execute(args, &cli.global),
        cli::Commands::History(args) => history::execute(args, &cli.global),
        cli::Commands::New(args) => new::execute(args, &cli.global),
        cli::Commands::Create(args) => create::execute(args, &cli.global),
    };

    match result {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => process::ExitCode::from(u8::try_from(*code).unwrap_or(1)),
            None => {
                eprintln!("Error: {err:#}");
                process::ExitCode::FAILURE
            }
        },
    }
}
