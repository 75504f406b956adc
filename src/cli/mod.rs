//! CLI module - Command-line interface for userdesk
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// userdesk - user management API server
#[derive(Parser)]
#[command(name = "userdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts directly against the database
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user. The password is read from USERDESK_PASSWORD or stdin.
    #[command(alias = "a")]
    Add {
        username: String,
        email: String,
        /// Optional display name
        #[arg(long)]
        full_name: Option<String>,
    },

    /// List users
    #[command(alias = "ls")]
    List {
        /// Substring matched against username, email and full name
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Delete a user by ID
    #[command(alias = "rm")]
    Remove {
        id: i32,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

pub use commands::*;
