//! Command-line interface

pub mod seed;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "campus-assistant-api", about = "Semantic-cache question answering for campus services")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve,
    /// Bulk-load topics and aliases from a JSON seed file
    Seed {
        /// Path to the seed file
        #[arg(long, default_value = "seed.json")]
        file: PathBuf,
    },
}
