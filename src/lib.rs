//! mantweak - Manual page margin stripper and table realigner
//!
//! Reads formatted text one line at a time, removes the indentation that
//! nesting added, and lines up tab- or space-separated tables on tab stops.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod parser;
pub mod process;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::{Config, PartialConfig};
pub use error::{ConfigError, Result};
pub use process::{format_stream, format_str};
