//! Core types and utilities shared across the tsb crates.
//!
//! This crate provides the vocabulary every pipeline stage speaks: the
//! invoked [`Command`] and its build [`Mode`], [`Diagnostic`]s for non-fatal
//! advisories, and the [`ProcessEnv`] snapshot the script sandbox and the
//! environment reconciler read from.

mod command;
mod diagnostic;
mod env;
mod utils;

pub use command::{Command, Mode};
pub use diagnostic::{Diagnostic, Severity};
pub use env::ProcessEnv;
pub use utils::{resolve_path, value_to_string};

/// Name of the program, used in user-facing messages.
pub const PROGRAM: &str = "tsb";

/// Default file name of the config script.
pub const CONFIG_FILE_NAME: &str = "tsb.config.lua";
