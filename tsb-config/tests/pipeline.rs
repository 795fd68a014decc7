//! End-to-end resolution of config scripts on disk.

use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;
use tsb_config::{ConfigPipeline, Error, ExtensionAxis, InsertScriptTag};
use tsb_core::{Command, Mode, ProcessEnv, Severity};

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    dir
}

fn pipeline(dir: &Path, command: Command, env: &[(&str, &str)]) -> ConfigPipeline {
    ConfigPipeline::new(command)
        .cwd(dir)
        .env(env.iter().copied().collect::<ProcessEnv>())
}

const FULL_CONFIG: &str = r#"
local shared = require("shared")

return {
  main = "src/index.tsx",
  out_dir = shared.out_dir,
  main_out_sub_dir = "js",
  tsconfig_path = "tsconfig.json",
  index_html_path = "src/index.html",
  index_html_env = { TITLE = "App" },
  insert_script_tag = "head",
  hash_files_for = { "build", "watch" },
  clear_out_dir_before = {},
  additional_files_to_parse = { "../shared/src" },
  env = { API_URL = null, DEBUG = "false", RETRIES = 3 },
  host = "0.0.0.0",
  port = 3000,
  single_page_app = true,
  headers = { ["X-Frame-Options"] = "DENY" },
  extend_rules = function(rules, mode, command)
    table.insert(rules, { test = "\\.svg$", mode = mode, command = command })
    return rules
  end,
}
"#;

fn full_project() -> TempDir {
    project(&[
        ("tsb.config.lua", FULL_CONFIG),
        ("shared.lua", "return { out_dir = 'dist' }"),
        ("src/index.html", "<html></html>"),
        (
            "tsconfig.json",
            r#"{ "extends": "./tsconfig.base.json", "compilerOptions": { "sourceMap": true } }"#,
        ),
        (
            "tsconfig.base.json",
            r#"{ "include": ["src"], "compilerOptions": { "module": "esnext", "jsx": "react" } }"#,
        ),
    ])
}

#[test]
fn test_full_config_resolves() {
    let dir = full_project();
    let root = dir.path();
    let resolved = pipeline(root, Command::Build, &[("API_URL", "https://x")])
        .run()
        .unwrap();

    assert_eq!(resolved.command, Command::Build);
    assert_eq!(resolved.mode, Mode::Production);
    assert_eq!(resolved.config_path, root.join("tsb.config.lua"));
    assert_eq!(resolved.main, root.join("src/index.tsx"));
    assert_eq!(resolved.out_dir, root.join("dist"));
    assert_eq!(resolved.main_out_dir, root.join("dist/js"));
    assert_eq!(resolved.index_html_path, Some(root.join("src/index.html")));
    assert_eq!(resolved.insert_script_tag, InsertScriptTag::Head);
    assert!(resolved.hash_files);
    assert!(!resolved.clear_out_dir);
    assert!(resolved.output_index_html);
    assert_eq!(
        resolved.additional_files_to_parse,
        vec![root.parent().unwrap().join("shared/src")]
    );

    assert_eq!(resolved.env["API_URL"], "https://x");
    assert_eq!(resolved.env["DEBUG"], "false");
    assert_eq!(resolved.env["RETRIES"], "3");
    assert_eq!(resolved.index_html_env["TITLE"], "App");

    assert_eq!(resolved.dev_server.host, "0.0.0.0");
    assert_eq!(resolved.dev_server.port, 3000);
    assert!(resolved.dev_server.single_page_app);
    assert_eq!(resolved.dev_server.headers["X-Frame-Options"], "DENY");

    let tsconfig = resolved.tsconfig.as_ref().unwrap();
    assert_eq!(resolved.tsconfig_path, Some(root.join("tsconfig.json")));
    assert_eq!(tsconfig.include, vec![root.join("src")]);
    assert_eq!(tsconfig.compiler_options.module.as_deref(), Some("esnext"));
    assert_eq!(tsconfig.compiler_options.source_map, Some(true));
    assert!(resolved.diagnostics.is_empty());

    let rules = &resolved.extensions.rules;
    assert_eq!(rules.len(), 2);
    assert_eq!(
        rules[1],
        json!({ "test": "\\.svg$", "mode": "production", "command": "build" })
    );
    assert_eq!(
        serde_json::to_value(&resolved).unwrap()["hooks"],
        json!(["extend_rules"])
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let dir = full_project();
    let pipeline = pipeline(dir.path(), Command::Serve, &[("API_URL", "https://x")]);
    assert_eq!(pipeline.run().unwrap(), pipeline.run().unwrap());
}

#[test]
fn test_missing_env_lists_every_variable_and_field() {
    let dir = project(&[(
        "tsb.config.lua",
        r#"return {
          main = "a.ts",
          out_dir = "out",
          env = { API_URL = null, DEBUG = "false" },
          index_html_env = { TITLE = null },
        }"#,
    )]);

    let err = pipeline(dir.path(), Command::Build, &[]).run().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r"
    missing environment variables:
      - API_URL (declared in `env`)
      - TITLE (declared in `index_html_env`)
    ");
}

#[test]
fn test_missing_required_fields_are_all_reported() {
    let dir = project(&[("tsb.config.lua", "return { port = 'eighty' }")]);

    let err = pipeline(dir.path(), Command::Build, &[]).run().unwrap_err();
    match *err {
        Error::ConfigValidation { violations, .. } => {
            assert_eq!(violations.paths(), vec!["main", "out_dir", "port"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_missing_config_script() {
    let dir = project(&[]);
    let err = pipeline(dir.path(), Command::Build, &[]).run().unwrap_err();
    assert!(matches!(
        *err,
        Error::Script(tsb_script::Error::ConfigNotFound { .. })
    ));
}

#[test]
fn test_custom_config_path() {
    let dir = project(&[(
        "config/app.lua",
        r#"return { main = "../src/main.ts", out_dir = "../build" }"#,
    )]);

    let resolved = pipeline(dir.path(), Command::Watch, &[])
        .config("config/app.lua")
        .run()
        .unwrap();
    assert_eq!(resolved.main, dir.path().join("src/main.ts"));
    assert_eq!(resolved.out_dir, dir.path().join("build"));
    assert!(!resolved.hash_files);
}

#[test]
fn test_index_html_must_exist() {
    let dir = project(&[(
        "tsb.config.lua",
        r#"return { main = "a.ts", out_dir = "out", index_html_path = "index.html" }"#,
    )]);

    let err = pipeline(dir.path(), Command::Build, &[]).run().unwrap_err();
    match *err {
        Error::IndexHtmlNotFound { path } => assert_eq!(path, dir.path().join("index.html")),
        other => panic!("expected missing template, got {other:?}"),
    }
}

#[test]
fn test_options_cycle_stops_pipeline() {
    let dir = project(&[
        (
            "tsb.config.lua",
            r#"return { main = "a.ts", out_dir = "out", tsconfig_path = "tsconfig.json" }"#,
        ),
        ("tsconfig.json", r#"{ "extends": "./tsconfig.json", "include": ["src"] }"#),
    ]);

    let err = pipeline(dir.path(), Command::Build, &[]).run().unwrap_err();
    assert!(matches!(
        *err,
        Error::Options(tsb_tsconfig::Error::OptionsCycle { .. })
    ));
}

#[test]
fn test_advisories_are_collected() {
    let dir = project(&[
        (
            "tsb.config.lua",
            r#"return { main = "a.ts", out_dir = "out", tsconfig_path = "." }"#,
        ),
        (
            "tsconfig.json",
            r#"{ "include": ["src"], "compilerOptions": { "module": "commonjs" } }"#,
        ),
    ]);

    let resolved = pipeline(dir.path(), Command::Build, &[]).run().unwrap();
    assert_eq!(resolved.warnings().count(), 2);
    assert!(
        resolved
            .diagnostics
            .iter()
            .all(|d| d.severity == Severity::Warning && d.stage == "tsconfig")
    );
}

#[test]
fn test_script_error_stops_pipeline() {
    let dir = project(&[("tsb.config.lua", "error('no config for you')")]);
    let err = pipeline(dir.path(), Command::Build, &[]).run().unwrap_err();
    assert!(matches!(
        *err,
        Error::Script(tsb_script::Error::ConfigExecution { .. })
    ));
}

#[test]
fn test_extend_with_extra_items() {
    let dir = project(&[(
        "tsb.config.lua",
        r#"return {
          main = "a.ts",
          out_dir = "out",
          extend_plugins = function(plugins, mode)
            local kept = {}
            for _, plugin in ipairs(plugins) do
              if plugin.plugin ~= "define" then
                table.insert(kept, plugin)
              end
            end
            table.insert(kept, { plugin = "analyzer", mode = mode })
            return kept
          end,
        }"#,
    )]);

    let resolved = pipeline(dir.path(), Command::Serve, &[]).run().unwrap();
    assert_eq!(
        resolved.extensions.plugins,
        vec![
            json!({ "plugin": "hot-module-replacement" }),
            json!({ "plugin": "analyzer", "mode": "development" }),
        ]
    );

    let extra = resolved
        .extend(ExtensionAxis::Plugins, vec![json!({ "plugin": "define" })])
        .unwrap();
    assert_eq!(extra, vec![json!({ "plugin": "analyzer", "mode": "development" })]);

    let untouched = resolved
        .extend(ExtensionAxis::Loaders, vec![json!({ "loader": "x" })])
        .unwrap();
    assert_eq!(untouched, vec![json!({ "loader": "x" })]);
}

#[test]
fn test_config_path_is_resolved_against_cwd() {
    let pipeline = ConfigPipeline::new(Command::Build)
        .cwd("/work")
        .config("sub/../tsb.config.lua");
    assert_eq!(pipeline.config_path(), PathBuf::from("/work/tsb.config.lua"));
}
