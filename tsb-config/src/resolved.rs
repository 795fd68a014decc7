//! The configuration handed to the bundler.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use serde_json::Value;
use tsb_core::{Command, Diagnostic, Mode, resolve_path};
use tsb_script::Hooks;
use tsb_tsconfig::ResolvedOptions;

use crate::config::{InsertScriptTag, ValidatedConfig};
use crate::error::Result;
use crate::extensions::{ExtensionAxis, Extensions};

pub(crate) const DEFAULT_BUNDLE_NAME: &str = "bundle";
pub(crate) const DEFAULT_HOST: &str = "localhost";
pub(crate) const DEFAULT_PORT: u16 = 8080;
pub(crate) const DEFAULT_PUBLIC_PATH: &str = "/";

/// Dev server settings, defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevServer {
    pub host: String,
    pub port: u16,
    pub hot_loading: bool,
    pub public_dir: Option<PathBuf>,
    pub public_path: String,
    pub single_page_app: bool,
    pub headers: BTreeMap<String, String>,
}

/// A fully resolved configuration for one command.
///
/// Paths are absolute, resolved against the directory of the config script.
/// Per-command lists such as `hash_files_for` are reduced to flags for
/// [`ResolvedConfig::command`].
#[derive(Debug, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub command: Command,
    pub mode: Mode,
    pub config_path: PathBuf,
    pub main: PathBuf,
    pub out_dir: PathBuf,
    /// Where the main bundle is written: `out_dir`, or its
    /// `main_out_sub_dir` subdirectory.
    pub main_out_dir: PathBuf,
    pub main_bundle_name: String,
    pub tsconfig_path: Option<PathBuf>,
    pub tsconfig: Option<ResolvedOptions>,
    pub index_html_path: Option<PathBuf>,
    pub output_index_html: bool,
    pub insert_script_tag: InsertScriptTag,
    pub react_hot_loading: bool,
    pub hash_files: bool,
    pub clear_out_dir: bool,
    pub additional_files_to_parse: Vec<PathBuf>,
    /// Build-time defines.
    pub env: BTreeMap<String, String>,
    /// Index HTML template parameters.
    pub index_html_env: BTreeMap<String, String>,
    pub dev_server: DevServer,
    pub extensions: Extensions,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(serialize_with = "hook_names")]
    pub hooks: Hooks,
}

fn hook_names<S: Serializer>(hooks: &Hooks, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(hooks.names())
}

/// Everything the earlier pipeline stages produced.
pub(crate) struct Parts {
    pub config_path: PathBuf,
    pub command: Command,
    pub config: ValidatedConfig,
    pub tsconfig: Option<(PathBuf, ResolvedOptions)>,
    pub env: BTreeMap<String, String>,
    pub index_html_env: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
    pub hooks: Hooks,
}

impl ResolvedConfig {
    /// Apply defaults, resolve paths and run the extension hooks.
    pub(crate) fn assemble(parts: Parts) -> Result<Self> {
        let Parts {
            config_path,
            command,
            config,
            tsconfig,
            env,
            index_html_env,
            diagnostics,
            hooks,
        } = parts;
        let dir = config_path.parent().unwrap_or(Path::new("")).to_path_buf();
        let resolve = |path: &str| resolve_path(&dir, path);
        let applies = |commands: Option<&Vec<Command>>, default: &[Command]| {
            commands.map_or(default, Vec::as_slice).contains(&command)
        };

        let out_dir = resolve(&config.out_dir);
        let main_out_dir = match &config.main_out_sub_dir {
            Some(sub_dir) => resolve_path(&out_dir, sub_dir),
            None => out_dir.clone(),
        };
        let (tsconfig_path, tsconfig) = tsconfig.unzip();

        let mut resolved = Self {
            command,
            mode: command.mode(),
            main: resolve(&config.main),
            out_dir,
            main_out_dir,
            main_bundle_name: config
                .main_bundle_name
                .unwrap_or_else(|| DEFAULT_BUNDLE_NAME.to_string()),
            tsconfig_path,
            tsconfig,
            index_html_path: config.index_html_path.as_deref().map(resolve),
            output_index_html: applies(config.output_index_html_for.as_ref(), &Command::ALL),
            insert_script_tag: config.insert_script_tag.unwrap_or_default(),
            react_hot_loading: config.react_hot_loading.unwrap_or(false),
            hash_files: applies(config.hash_files_for.as_ref(), &[Command::Build]),
            clear_out_dir: applies(config.clear_out_dir_before.as_ref(), &[Command::Build]),
            additional_files_to_parse: config
                .additional_files_to_parse
                .iter()
                .flatten()
                .map(|path| resolve(path))
                .collect(),
            env,
            index_html_env,
            dev_server: DevServer {
                host: config.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: config.port.unwrap_or(DEFAULT_PORT),
                hot_loading: config.hot_loading.unwrap_or(true),
                public_dir: config.public_dir.as_deref().map(resolve),
                public_path: config
                    .public_path
                    .unwrap_or_else(|| DEFAULT_PUBLIC_PATH.to_string()),
                single_page_app: config.single_page_app.unwrap_or(false),
                headers: config.headers.unwrap_or_default(),
            },
            extensions: Extensions::default(),
            diagnostics,
            config_path,
            hooks: Hooks::none(),
        };

        resolved.extensions = Extensions::build(&resolved, &hooks)?;
        resolved.hooks = hooks;
        Ok(resolved)
    }

    /// File name of the main bundle, with a content hash placeholder when
    /// files are hashed for this command.
    pub fn bundle_file_name(&self) -> String {
        if self.hash_files {
            format!("{}.[contenthash].js", self.main_bundle_name)
        } else {
            format!("{}.js", self.main_bundle_name)
        }
    }

    /// Run the script's hook for `axis` over `items`.
    ///
    /// For items the bundler adds beyond [`ResolvedConfig::extensions`].
    pub fn extend(&self, axis: ExtensionAxis, items: Vec<Value>) -> Result<Vec<Value>> {
        Ok(self
            .hooks
            .apply(axis.hook_field(), items, self.mode, self.command)?)
    }

    /// Warnings collected while resolving.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_warning())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parts(command: Command, config: ValidatedConfig) -> Parts {
        Parts {
            config_path: PathBuf::from("/project/tsb.config.lua"),
            command,
            config,
            tsconfig: None,
            env: BTreeMap::new(),
            index_html_env: BTreeMap::new(),
            diagnostics: Vec::new(),
            hooks: Hooks::none(),
        }
    }

    fn minimal() -> ValidatedConfig {
        ValidatedConfig {
            main: "src/index.ts".to_string(),
            out_dir: "build".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_for_build() {
        let resolved = ResolvedConfig::assemble(parts(Command::Build, minimal())).unwrap();

        assert_eq!(resolved.mode, Mode::Production);
        assert_eq!(resolved.main, PathBuf::from("/project/src/index.ts"));
        assert_eq!(resolved.out_dir, PathBuf::from("/project/build"));
        assert_eq!(resolved.main_out_dir, resolved.out_dir);
        assert_eq!(resolved.main_bundle_name, "bundle");
        assert_eq!(resolved.bundle_file_name(), "bundle.[contenthash].js");
        assert!(resolved.output_index_html);
        assert!(resolved.hash_files);
        assert!(resolved.clear_out_dir);
        assert_eq!(resolved.insert_script_tag, InsertScriptTag::Body);
        assert_eq!(resolved.dev_server.host, "localhost");
        assert_eq!(resolved.dev_server.port, 8080);
        assert_eq!(resolved.dev_server.public_path, "/");
        assert!(resolved.dev_server.hot_loading);
        assert!(!resolved.dev_server.single_page_app);
        assert!(!resolved.react_hot_loading);
    }

    #[test]
    fn test_per_command_flags_for_serve() {
        let config = ValidatedConfig {
            main_out_sub_dir: Some("js".to_string()),
            output_index_html_for: Some(vec![Command::Build]),
            hash_files_for: Some(vec![]),
            ..minimal()
        };
        let resolved = ResolvedConfig::assemble(parts(Command::Serve, config)).unwrap();

        assert_eq!(resolved.mode, Mode::Development);
        assert_eq!(resolved.main_out_dir, PathBuf::from("/project/build/js"));
        assert!(!resolved.output_index_html);
        assert!(!resolved.hash_files);
        assert!(!resolved.clear_out_dir);
        assert_eq!(resolved.bundle_file_name(), "bundle.js");
    }

    #[test]
    fn test_serialized_hooks_are_names() {
        let resolved = ResolvedConfig::assemble(parts(Command::Watch, minimal())).unwrap();
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["hooks"], json!([]));
        assert_eq!(value["command"], json!("watch"));
        assert_eq!(value["insert_script_tag"], json!("body"));
    }

    #[test]
    fn test_default_extensions() {
        let mut parts = parts(Command::Serve, minimal());
        parts.env = BTreeMap::from([("API_URL".to_string(), "https://x".to_string())]);
        let resolved = ResolvedConfig::assemble(parts).unwrap();

        let loaders: Vec<_> = resolved
            .extensions
            .loaders
            .iter()
            .map(|l| l["loader"].as_str().unwrap())
            .collect();
        assert_eq!(loaders, vec!["babel-loader", "ts-loader"]);
        assert_eq!(resolved.extensions.rules[0]["use"], json!(resolved.extensions.loaders));

        let plugins: Vec<_> = resolved
            .extensions
            .plugins
            .iter()
            .map(|p| p["plugin"].as_str().unwrap())
            .collect();
        assert_eq!(plugins, vec!["define", "hot-module-replacement"]);
        assert_eq!(
            resolved.extensions.plugins[0]["options"]["process.env.API_URL"],
            json!("\"https://x\"")
        );
    }
}
