// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Config script loading and sandboxed evaluation.
//!
//! A config script is a Lua file that returns its configuration table.
//! [`ScriptLoader`] finds the file, checks that it compiles and turns it into
//! a [`TranspiledScript`]; [`ScriptSandbox`] runs that script in a fresh Lua
//! state with a deliberately small environment and captures the export.
//!
//! ```ignore
//! let script = ScriptLoader::load(Path::new("tsb.config.lua"))?;
//! let export = ScriptSandbox::new(ProcessEnv::capture(), cwd).run(&script)?;
//! let (data, hooks) = export.into_parts(&["extend_rules"])?;
//! ```

mod error;
mod hooks;
mod loader;
mod sandbox;

pub use error::{Error, Result};
pub use hooks::Hooks;
pub use loader::{ScriptLoader, TranspiledScript};
pub use sandbox::{ScriptExport, ScriptSandbox};
