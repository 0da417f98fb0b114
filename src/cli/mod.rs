//! Command-line interface

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quota-gate", about = "Admission-controlled API gateway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the gateway server
    Serve,
    /// Apply database schema migrations and exit
    Migrate,
}
