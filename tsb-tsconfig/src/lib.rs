// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Compiler options (`tsconfig.json`) resolution.
//!
//! Option files may extend each other through `extends`. The
//! [`OptionChainResolver`] reads the chain from the leaf upwards, rejects
//! cycles of any length, and folds the nodes from the root down so that child
//! values override parent values.

mod error;
mod node;
mod resolve;

pub use error::{Error, Result};
pub use node::{CompilerOptions, CompilerOptionsNode, JSX_OPTIONS, Jsx};
pub use resolve::{OptionChain, OptionChainResolver, ResolvedOptions, resolve_options_path};

/// File name looked up when a compiler options reference names a directory.
pub const DEFAULT_FILE_NAME: &str = "tsconfig.json";
