// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Resolution of a tsb config script into a [`ResolvedConfig`].
//!
//! [`ConfigPipeline`] runs the stages in order and stops at the first one
//! that fails:
//!
//! 1. load and check the script ([`tsb_script::ScriptLoader`])
//! 2. run it and capture its export ([`tsb_script::ScriptSandbox`])
//! 3. validate the export against [`config_shape`]
//! 4. check the index HTML template exists, if one is declared
//! 5. resolve the compiler options chain, if `tsconfig_path` is declared
//! 6. reconcile `env` and `index_html_env` with the process environment
//! 7. assemble the resolved configuration and apply extension hooks
//!
//! ```ignore
//! let resolved = ConfigPipeline::new(Command::Build)
//!     .config("tsb.config.lua")
//!     .run()?;
//! ```

mod config;
mod env;
mod error;
mod extensions;
mod pipeline;
mod resolved;
mod schema;

pub use config::{InsertScriptTag, ValidatedConfig};
pub use env::{EnvDeclaration, MissingVar, reconcile};
pub use error::{Error, Result};
pub use extensions::{ExtensionAxis, Extensions};
pub use pipeline::ConfigPipeline;
pub use resolved::{DevServer, ResolvedConfig};
pub use schema::{HOOK_FIELDS, config_shape};
