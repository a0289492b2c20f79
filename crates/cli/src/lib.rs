pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "slotty",
    about = "Slotty operator CLI",
    long_about = "Talk to the scheduling assistant, inspect free slots, and check runtime readiness.",
    after_help = "Examples:\n  slotty chat \"what slots are free tomorrow?\"\n  slotty slots --day 2026-03-07\n  slotty doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Send one message to the assistant and print its reply")]
    Chat {
        #[arg(help = "The message to send", required = true)]
        message: Vec<String>,
    },
    #[command(about = "List free slots for a day")]
    Slots {
        #[arg(long, help = "Local calendar day (YYYY-MM-DD); defaults to today")]
        day: Option<chrono::NaiveDate>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and calendar connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { message } => commands::chat::run(&message.join(" ")),
        Command::Slots { day } => commands::slots::run(day),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
