use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use tsb_schema::Violations;

use crate::env::MissingVar;

/// Result type for tsb-config operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Script(tsb_script::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Options(tsb_tsconfig::Error),

    #[error("invalid config script '{path}':\n{}", .violations.bullet_list())]
    #[diagnostic(
        code(tsb::config_validation),
        help("fix the fields listed above in the table the script returns")
    )]
    ConfigValidation {
        path: PathBuf,
        violations: Violations,
    },

    #[error("could not read the export of '{path}' as configuration")]
    #[diagnostic(code(tsb::config_validation))]
    ConfigDeserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not find index HTML template at '{path}'")]
    #[diagnostic(
        code(tsb::index_html_not_found),
        help("check the `index_html_path` option of the config script")
    )]
    IndexHtmlNotFound { path: PathBuf },

    #[error("missing environment variables:\n{}", render_missing(.missing))]
    #[diagnostic(
        code(tsb::env_missing),
        help("set these variables or give them a default in the config script")
    )]
    EnvMissing { missing: Vec<MissingVar> },
}

fn render_missing(missing: &[MissingVar]) -> String {
    missing
        .iter()
        .map(|var| format!("  - {} (declared in `{}`)", var.name, var.field))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<Box<tsb_script::Error>> for Box<Error> {
    fn from(err: Box<tsb_script::Error>) -> Self {
        Box::new(Error::Script(*err))
    }
}

impl From<Box<tsb_tsconfig::Error>> for Box<Error> {
    fn from(err: Box<tsb_tsconfig::Error>) -> Self {
        Box::new(Error::Options(*err))
    }
}
