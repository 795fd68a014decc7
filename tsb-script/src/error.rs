use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for tsb-script operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("config script not found: '{path}'")]
    #[diagnostic(
        code(tsb::config_not_found),
        help("create a tsb.config.lua file or pass --config <path>")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("failed to read '{path}'")]
    #[diagnostic(code(tsb::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config script '{path}' failed static checks:\n{}", .diagnostics.join("\n"))]
    #[diagnostic(code(tsb::config_type_error))]
    ConfigType {
        path: PathBuf,
        diagnostics: Vec<String>,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("config script '{path}' could not be transpiled: invalid UTF-8 at byte {offset}")]
    #[diagnostic(
        code(tsb::config_transpile_error),
        help("save the config script as UTF-8")
    )]
    ConfigTranspile { path: PathBuf, offset: usize },

    #[error("config script '{path}' raised an error")]
    #[diagnostic(code(tsb::config_execution_error))]
    ConfigExecution {
        path: PathBuf,
        #[source_code]
        src: NamedSource<String>,
        #[label("raised here")]
        span: Option<SourceSpan>,
        #[source]
        source: mlua::Error,
    },

    #[error("config script '{path}' has no default export")]
    #[diagnostic(
        code(tsb::config_missing_export),
        help("end the script with `return {{ ... }}` or assign `exports.default`")
    )]
    ConfigMissingExport { path: PathBuf },

    #[error("the export of '{path}' could not be converted to configuration data")]
    #[diagnostic(code(tsb::config_conversion_error))]
    Conversion {
        path: PathBuf,
        #[source]
        source: mlua::Error,
    },

    #[error("extension hook '{name}' failed")]
    #[diagnostic(
        code(tsb::hook_error),
        help("the hook must return the new list of items")
    )]
    Hook {
        name: String,
        #[source]
        source: mlua::Error,
    },
}

/// Source context for script errors.
///
/// Knows the script path and text, and finds the line a Lua message points
/// at so errors can carry a label.
#[derive(Debug, Clone)]
pub(crate) struct SourceContext {
    path: PathBuf,
    src: String,
}

impl SourceContext {
    pub(crate) fn new(path: &Path, src: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            src: src.into(),
        }
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.path.display().to_string(), self.src.clone())
    }

    /// Span of the line a Lua message refers to, if any.
    ///
    /// Lua prefixes positions as `<chunk>:<line>:`. The chunk name is the
    /// script path, which Lua may shorten from the left, so only the file
    /// name is matched.
    pub(crate) fn span_for(&self, message: &str) -> Option<SourceSpan> {
        let name = self.path.file_name()?.to_string_lossy();
        let rest = &message[message.find(name.as_ref())? + name.len()..];
        let digits: String = rest
            .strip_prefix(':')?
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let line: usize = digits.parse().ok()?;
        line_span(&self.src, line)
    }

    pub(crate) fn type_error(&self, message: String) -> Box<Error> {
        let span = self.span_for(&message);
        Box::new(Error::ConfigType {
            path: self.path.clone(),
            diagnostics: vec![message],
            src: self.named_source(),
            span,
        })
    }

    pub(crate) fn execution_error(&self, source: mlua::Error) -> Box<Error> {
        let span = self.span_for(&source.to_string());
        Box::new(Error::ConfigExecution {
            path: self.path.clone(),
            src: self.named_source(),
            span,
            source,
        })
    }

    pub(crate) fn conversion_error(&self, source: mlua::Error) -> Box<Error> {
        Box::new(Error::Conversion {
            path: self.path.clone(),
            source,
        })
    }
}

/// Byte span of the 1-based `line` in `src`.
fn line_span(src: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (i, text) in src.split('\n').enumerate() {
        if i + 1 == line {
            return Some(SourceSpan::from((offset, text.len())));
        }
        offset += text.len() + 1;
    }
    None
}
