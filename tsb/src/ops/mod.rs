//! Core operations.
//!
//! This module contains the logic behind tsb commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;

pub use check::check;
