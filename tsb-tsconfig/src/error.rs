use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use tsb_schema::Violations;

/// Result type for tsb-tsconfig operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("could not resolve compiler options file '{path}'")]
    #[diagnostic(code(tsb::options_not_found))]
    OptionsNotFound {
        path: PathBuf,
        referenced_by: Option<PathBuf>,
        #[help]
        help: String,
    },

    #[error("failed to read compiler options file '{path}'")]
    #[diagnostic(code(tsb::options_read_error))]
    OptionsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed compiler options file '{path}': {message}")]
    #[diagnostic(code(tsb::options_read_error))]
    OptionsSyntax {
        path: PathBuf,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
    },

    #[error("compiler options chain is cyclic: {}", render_chain(.chain))]
    #[diagnostic(
        code(tsb::options_cycle),
        help("remove the `extends` that points back into the chain")
    )]
    OptionsCycle { chain: Vec<PathBuf> },

    #[error("invalid compiler options file '{path}':\n{}", .violations.bullet_list())]
    #[diagnostic(code(tsb::options_validation))]
    OptionsValidation {
        path: PathBuf,
        violations: Violations,
    },

    #[error("no files in the `include` option of '{path}'")]
    #[diagnostic(
        code(tsb::options_empty_include),
        help("specify some files to parse, e.g. \"include\": [\"src\"]")
    )]
    OptionsEmptyInclude { path: PathBuf },
}

pub(crate) fn not_found(path: PathBuf, referenced_by: Option<&Path>) -> Box<Error> {
    let help = match referenced_by {
        Some(parent) => format!("referenced by `extends` in '{}'", parent.display()),
        None => "check the `tsconfig_path` option of the config script".to_string(),
    };
    Box::new(Error::OptionsNotFound {
        path,
        referenced_by: referenced_by.map(Path::to_path_buf),
        help,
    })
}

fn render_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Create a syntax error from a json5 error, labelled when it has a location.
pub(crate) fn syntax_error(path: &Path, src: &str, err: json5::Error) -> Box<Error> {
    let (message, span) = match err {
        json5::Error::Message { msg, location } => {
            let span = location
                .and_then(|l| offset_of(src, l.line, l.column))
                .map(|offset| SourceSpan::from((offset, 1)));
            (msg, span)
        }
    };
    Box::new(Error::OptionsSyntax {
        path: path.to_path_buf(),
        message,
        src: NamedSource::new(path.display().to_string(), src.to_string()),
        span,
    })
}

/// Byte offset of a 1-based line and column.
fn offset_of(src: &str, line: usize, column: usize) -> Option<usize> {
    let start: usize = src
        .split_inclusive('\n')
        .take(line.checked_sub(1)?)
        .map(str::len)
        .sum();
    let text = src[start..].lines().next().unwrap_or("");
    let within: usize = text
        .chars()
        .take(column.saturating_sub(1))
        .map(char::len_utf8)
        .sum();
    Some((start + within).min(src.len().saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of() {
        let src = "{\n  \"a\": ,\n}";
        assert_eq!(offset_of(src, 1, 1), Some(0));
        assert_eq!(offset_of(src, 2, 8), Some(9));
        assert_eq!(offset_of(src, 0, 1), None);
    }

    #[test]
    fn test_cycle_message() {
        let err = Error::OptionsCycle {
            chain: vec![
                PathBuf::from("/p/a.json"),
                PathBuf::from("/p/b.json"),
                PathBuf::from("/p/a.json"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "compiler options chain is cyclic: /p/a.json -> /p/b.json -> /p/a.json"
        );
    }
}
