//! CLI module
//!
//! Command-line front end over the resource API.
//!
//! # Commands
//!
//! - `login` / `logout` - Start or end a session
//! - `status` - Inspect the stored session offline
//! - `whoami` - Current user
//! - `events` / `book` - Browse and book events
//! - `bookings` / `cancel` - Manage your bookings
//! - `dashboard` - Admin figures
//! - `request` - Raw authenticated request

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
