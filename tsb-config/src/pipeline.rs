//! The config resolution pipeline.

use std::path::PathBuf;

use tracing::debug;
use tsb_core::{CONFIG_FILE_NAME, Command, ProcessEnv, resolve_path};
use tsb_script::{ScriptLoader, ScriptSandbox};
use tsb_tsconfig::{OptionChainResolver, resolve_options_path};

use crate::config::ValidatedConfig;
use crate::env::reconcile;
use crate::error::{Error, Result};
use crate::resolved::{Parts, ResolvedConfig};
use crate::schema::HOOK_FIELDS;

/// Resolves a config script for one command.
///
/// Every run starts from scratch: the script, the compiler options chain and
/// the environment snapshot are read again and nothing is cached.
#[derive(Debug, Clone)]
pub struct ConfigPipeline {
    config_path: PathBuf,
    command: Command,
    env: ProcessEnv,
    cwd: PathBuf,
}

impl ConfigPipeline {
    /// A pipeline for `command` reading `tsb.config.lua` in the current
    /// directory with the live process environment.
    pub fn new(command: Command) -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILE_NAME),
            command,
            env: ProcessEnv::capture(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Config script to read. Relative paths are taken from the working
    /// directory.
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Environment snapshot to resolve against.
    pub fn env(mut self, env: ProcessEnv) -> Self {
        self.env = env;
        self
    }

    /// Working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Path of the config script this pipeline reads.
    pub fn config_path(&self) -> PathBuf {
        resolve_path(&self.cwd, &self.config_path)
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Run every stage, stopping at the first failure.
    pub fn run(&self) -> Result<ResolvedConfig> {
        let config_path = self.config_path();
        debug!(path = %config_path.display(), command = %self.command, "resolving config");

        let script = ScriptLoader::load(&config_path)?;
        let export = ScriptSandbox::new(self.env.clone(), &self.cwd).run(&script)?;
        let (raw, hooks) = export.into_parts(HOOK_FIELDS)?;
        debug!(hooks = ?hooks, "captured config export");

        let config = ValidatedConfig::from_value(&config_path, raw)?;
        let dir = script.dir();
        debug!("config validated");

        if let Some(index_html) = &config.index_html_path {
            let path = resolve_path(dir, index_html);
            if !path.is_file() {
                return Err(Box::new(Error::IndexHtmlNotFound { path }));
            }
        }

        let mut diagnostics = Vec::new();
        let tsconfig = match &config.tsconfig_path {
            Some(reference) => {
                let path = resolve_options_path(dir, reference)?;
                let chain = OptionChainResolver::resolve(&path)?;
                debug!(files = chain.resolved.chain.len(), "compiler options resolved");
                diagnostics.extend(chain.diagnostics);
                Some((path, chain.resolved))
            }
            None => None,
        };

        let env = reconcile("env", &config.env.clone().unwrap_or_default(), &self.env);
        let index_html_env = reconcile(
            "index_html_env",
            &config.index_html_env.clone().unwrap_or_default(),
            &self.env,
        );
        let (env, index_html_env) = match (env, index_html_env) {
            (Ok(env), Ok(index_html_env)) => (env, index_html_env),
            (env, index_html_env) => {
                let missing = env
                    .err()
                    .into_iter()
                    .chain(index_html_env.err())
                    .flatten()
                    .collect();
                return Err(Box::new(Error::EnvMissing { missing }));
            }
        };
        debug!(
            env = env.len(),
            index_html_env = index_html_env.len(),
            "environment reconciled"
        );

        ResolvedConfig::assemble(Parts {
            config_path,
            command: self.command,
            config,
            tsconfig,
            env,
            index_html_env,
            diagnostics,
            hooks,
        })
    }
}
