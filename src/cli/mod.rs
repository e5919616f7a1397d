//! CLI module for the marketplace discovery service
//!
//! - `serve`: run the discovery HTTP API

pub mod serve;

use clap::{Parser, Subcommand};

/// Marketplace discovery - text and image product search
#[derive(Parser)]
#[command(name = "marketplace-discovery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the discovery API server
    Serve(serve::ServeArgs),
}
