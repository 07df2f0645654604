//! `milkman` command-line entry point.
use anyhow::Result;
use clap::Parser;

use milkman::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        return commands::version::run();
    }

    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = logging::Logger::new(command);

    let result = match &args.command {
        cli::Command::Init(opts) => commands::init::run(&args.global, opts, &log),
        cli::Command::Plan(opts) => commands::plan::run(&args.global, opts, &log),
        cli::Command::Recipes => commands::recipes::run(&args.global, &log),
        cli::Command::Version => commands::version::run(),
    };
    if let Err(e) = result {
        log.error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}
