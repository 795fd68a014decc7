//! Bundler extension items and the hooks that rewrite them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};
use tsb_core::Command;
use tsb_script::Hooks;

use crate::config::InsertScriptTag;
use crate::resolved::ResolvedConfig;

/// Pattern matched by the source rule.
pub const SOURCE_PATTERN: &str = r"\.(ts|tsx|js|jsx|cjs|mjs)$";

/// A kind of item the bundler configuration is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionAxis {
    /// Script preprocessing steps.
    Loaders,
    /// Bundler plugins.
    Plugins,
    /// File matching rules.
    Rules,
}

impl ExtensionAxis {
    pub const ALL: [ExtensionAxis; 3] = [
        ExtensionAxis::Loaders,
        ExtensionAxis::Plugins,
        ExtensionAxis::Rules,
    ];

    /// Config field holding the hook for this axis.
    pub fn hook_field(&self) -> &'static str {
        match self {
            ExtensionAxis::Loaders => "extend_loaders",
            ExtensionAxis::Plugins => "extend_plugins",
            ExtensionAxis::Rules => "extend_rules",
        }
    }
}

/// Item descriptors handed to the bundler, after extension hooks ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extensions {
    pub loaders: Vec<Value>,
    pub rules: Vec<Value>,
    pub plugins: Vec<Value>,
}

impl Extensions {
    pub fn get(&self, axis: ExtensionAxis) -> &[Value] {
        match axis {
            ExtensionAxis::Loaders => &self.loaders,
            ExtensionAxis::Plugins => &self.plugins,
            ExtensionAxis::Rules => &self.rules,
        }
    }

    /// Build the items for `config`, letting `hooks` rewrite each axis.
    ///
    /// Loaders are extended first since the source rule uses them.
    pub(crate) fn build(config: &ResolvedConfig, hooks: &Hooks) -> tsb_script::Result<Self> {
        let (mode, command) = (config.mode, config.command);

        let loaders = hooks.apply(
            ExtensionAxis::Loaders.hook_field(),
            default_loaders(config),
            mode,
            command,
        )?;
        let rules = hooks.apply(
            ExtensionAxis::Rules.hook_field(),
            default_rules(config, &loaders),
            mode,
            command,
        )?;
        let plugins = hooks.apply(
            ExtensionAxis::Plugins.hook_field(),
            default_plugins(config),
            mode,
            command,
        )?;

        Ok(Self {
            loaders,
            rules,
            plugins,
        })
    }
}

fn default_loaders(config: &ResolvedConfig) -> Vec<Value> {
    let mut babel_plugins = Vec::new();
    if config.react_hot_loading && config.command != Command::Build {
        babel_plugins.push(json!("react-hot-loader/babel"));
    }

    vec![
        json!({
            "loader": "babel-loader",
            "options": {
                "babelrc": false,
                "presets": [[
                    "@babel/preset-env",
                    {
                        "modules": false,
                        "useBuiltIns": "usage",
                        "corejs": { "version": 3, "proposals": true }
                    }
                ]],
                "plugins": babel_plugins
            }
        }),
        json!({
            "loader": "ts-loader",
            "options": { "transpileOnly": true }
        }),
    ]
}

fn default_rules(config: &ResolvedConfig, loaders: &[Value]) -> Vec<Value> {
    let include: Vec<String> = config
        .tsconfig
        .iter()
        .flat_map(|options| options.include.iter())
        .chain(config.additional_files_to_parse.iter())
        .map(|path| path.display().to_string())
        .collect();

    vec![json!({
        "test": SOURCE_PATTERN,
        "include": include,
        "use": loaders
    })]
}

fn default_plugins(config: &ResolvedConfig) -> Vec<Value> {
    let mut plugins = Vec::new();

    if let Some(tsconfig_path) = &config.tsconfig_path {
        plugins.push(json!({
            "plugin": "fork-ts-checker",
            "options": { "typescript": { "configFile": tsconfig_path.display().to_string() } }
        }));
    }

    let defines: BTreeMap<String, Value> = config
        .env
        .iter()
        .map(|(name, value)| {
            // Substituted as source text, so the value is quoted
            let literal = Value::from(value.as_str()).to_string();
            (format!("process.env.{name}"), Value::String(literal))
        })
        .collect();
    if !defines.is_empty() {
        plugins.push(json!({ "plugin": "define", "options": defines }));
    }

    if config.output_index_html
        && let Some(template) = &config.index_html_path
    {
        let inject = match config.insert_script_tag {
            InsertScriptTag::Body => json!("body"),
            InsertScriptTag::Head => json!("head"),
            InsertScriptTag::Disabled => json!(false),
        };
        plugins.push(json!({
            "plugin": "html",
            "options": {
                "template": template.display().to_string(),
                "inject": inject,
                "templateParameters": config.index_html_env
            }
        }));
    }

    if config.command == Command::Serve && config.dev_server.hot_loading {
        plugins.push(json!({ "plugin": "hot-module-replacement" }));
    }

    plugins
}
