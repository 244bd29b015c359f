//! CLI module - Command-line interface for Tuneshare
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Tuneshare - social music sharing backend
#[derive(Parser)]
#[command(name = "tuneshare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Register a user account
    Register {
        username: String,
        email: String,
        password: String,
        /// Initial profile bio
        #[arg(long)]
        bio: Option<String>,
    },

    /// Search users by username
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },
}

pub use commands::*;
