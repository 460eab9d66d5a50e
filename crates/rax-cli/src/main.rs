#![warn(missing_docs)]

//! Entry point for the `rax` binary.

mod cli;
mod error;
mod fixture;
mod replay;

use std::process;

use clap::Parser;
use rax::{Settings, build_call, parse_spec};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{
    cli::{CallArgs, Cli, Commands, ParseArgs, RunArgs},
    error::Result,
    fixture::Fixture,
    replay::{ReplayOptions, replay},
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    let log_spec = logging::compute_spec(
        log.trace,
        log.debug,
        log.log_level.as_deref(),
        log.log_filter.as_deref(),
    );
    let env_filter = logging::env_filter_from_spec(&log_spec);
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    match command {
        Commands::Run(args) => run_fixture(&args),
        Commands::Parse(args) => parse(&args),
        Commands::Call(args) => call(&args),
    }
}

/// Replay a fixture and print the log.
fn run_fixture(args: &RunArgs) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let fixture = Fixture::load(&args.fixture)?;
    let opts = ReplayOptions {
        unavailable: args.unavailable,
        scripts: args.scripts,
    };
    for line in replay(&fixture, settings, &opts)? {
        println!("{line}");
    }
    Ok(())
}

/// Print the kind and expression of an attribute value.
fn parse(args: &ParseArgs) -> Result<()> {
    let (kind, expression) = parse_spec(&args.value)?;
    println!("kind: {kind}");
    println!("expression: {expression}");
    Ok(())
}

/// Print the call text for an expression and payload.
fn call(args: &CallArgs) -> Result<()> {
    println!("{}", build_call(&args.expression, &args.payload));
    Ok(())
}
