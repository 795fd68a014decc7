//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Summary of a resolved config.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config script.
    pub config_path: PathBuf,
    pub command: String,
    pub mode: String,
    /// Entry module.
    pub main: String,
    /// Where the main bundle is written.
    pub bundle: String,
    /// Compiler options files, leaf first.
    pub options_chain: Vec<String>,
    pub env_count: usize,
    pub index_html_env_count: usize,
    /// Hooks the script defines.
    pub hooks: Vec<String>,
    /// Item count per extension hook field.
    pub extensions: Vec<(&'static str, usize)>,
    pub warnings: Vec<String>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        if !self.warnings.is_empty() {
            out.newline();
        }

        out.preformatted(&format!(
            "✓ {} is valid for `{}` ({})",
            self.config_path.display(),
            self.command,
            self.mode
        ));
        out.newline();

        out.key_value_indented("main", &self.main);
        out.key_value_indented("bundle", &self.bundle);
        out.key_value_indented(
            "env",
            &format!(
                "{} defined, {} template parameter{}",
                self.env_count,
                self.index_html_env_count,
                if self.index_html_env_count == 1 { "" } else { "s" }
            ),
        );

        if !self.options_chain.is_empty() {
            out.newline();
            out.section("compiler options");
            for (i, path) in self.options_chain.iter().enumerate() {
                out.numbered_item(i + 1, path);
            }
        }

        out.newline();
        out.section("extensions");
        for (field, count) in &self.extensions {
            let hooked = if self.hooks.iter().any(|h| h == field) {
                " (hooked)"
            } else {
                ""
            };
            out.list_item(&format!("{field}: {count}{hooked}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordedOutput;

    fn report() -> CheckReport {
        CheckReport {
            config_path: PathBuf::from("tsb.config.lua"),
            command: "serve".to_string(),
            mode: "development".to_string(),
            main: "/p/src/index.ts".to_string(),
            bundle: "/p/dist/bundle.js".to_string(),
            options_chain: vec![
                "/p/tsconfig.json".to_string(),
                "/p/tsconfig.base.json".to_string(),
            ],
            env_count: 2,
            index_html_env_count: 1,
            hooks: vec!["extend_rules".to_string()],
            extensions: vec![("extend_loaders", 2), ("extend_rules", 1)],
            warnings: vec![],
        }
    }

    #[test]
    fn test_render_valid_config() {
        let mut out = RecordedOutput::default();
        report().render(&mut out);

        assert_eq!(
            out.lines,
            vec![
                "✓ tsb.config.lua is valid for `serve` (development)",
                "",
                "  main: /p/src/index.ts",
                "  bundle: /p/dist/bundle.js",
                "  env: 2 defined, 1 template parameter",
                "",
                "  compiler options:",
                "    1. /p/tsconfig.json",
                "    2. /p/tsconfig.base.json",
                "",
                "  extensions:",
                "    - extend_loaders: 2",
                "    - extend_rules: 1 (hooked)",
            ]
        );
    }

    #[test]
    fn test_warnings_come_first() {
        let mut out = RecordedOutput::default();
        CheckReport {
            warnings: vec!["no sourceMap".to_string()],
            ..report()
        }
        .render(&mut out);

        assert_eq!(out.lines[0], "warning: no sourceMap");
        assert_eq!(out.lines[1], "");
    }
}
