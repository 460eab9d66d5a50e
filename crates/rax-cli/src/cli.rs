//! Command-line interface definitions for the `rax` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `rax` binary.
#[derive(Parser, Debug)]
#[command(
    name = "rax",
    about = "Exercise declarative rax bindings against a page fixture",
    version
)]
pub struct Cli {
    /// Logging controls shared across rax binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a page from a fixture, install its bindings and replay its steps.
    Run(RunArgs),
    /// Parse a binding attribute value and print its kind and expression.
    Parse(ParseArgs),
    /// Print the call text an expression and JSON payload would produce.
    Call(CallArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Page fixture in RON syntax.
    #[arg(value_name = "FIXTURE")]
    pub fixture: PathBuf,

    /// Optional settings file (RON) overriding attribute names and display texts.
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Run with no evaluator attached, as before the host bridge is ready.
    #[arg(long)]
    pub unavailable: bool,

    /// Forward inline scripts before replaying the steps.
    #[arg(long)]
    pub scripts: bool,
}

/// Arguments for the `parse` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Attribute value, e.g. `"click (notify-clicked)"`.
    #[arg(value_name = "VALUE")]
    pub value: String,
}

/// Arguments for the `call` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CallArgs {
    /// Expression evaluating to a one-argument procedure.
    #[arg(value_name = "EXPRESSION")]
    pub expression: String,

    /// Payload JSON text.
    #[arg(value_name = "JSON", default_value = "{}")]
    pub payload: String,
}
