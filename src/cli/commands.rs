//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EventDesk command-line client
#[derive(Parser, Debug)]
#[command(name = "eventdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API base URL (overrides config file and EVENTDESK_API_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session file holding the stored tokens
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the issued tokens
    Login {
        /// Account username
        username: String,

        /// Account password
        #[arg(long, env = "EVENTDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show what the stored session contains (no network)
    Status,

    /// Show the current user as seen by the server
    Whoami,

    /// List events
    Events,

    /// Book a seat at an event
    Book {
        /// Event id
        id: i64,
    },

    /// List your bookings
    Bookings,

    /// Cancel one of your bookings
    Cancel {
        /// Booking id
        id: i64,
    },

    /// Show the admin dashboard
    Dashboard,

    /// Send an arbitrary authenticated request
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// Path relative to the base URL
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Extra header as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}
