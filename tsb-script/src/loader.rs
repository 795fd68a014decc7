//! Locating, checking and transpiling config scripts.

use std::path::{Path, PathBuf};

use mlua::{ChunkMode, Lua};
use tracing::debug;

use crate::error::{Error, Result, SourceContext};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// A config script ready to run in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspiledScript {
    path: PathBuf,
    chunk_name: String,
    source: String,
}

impl TranspiledScript {
    /// Path of the script on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the script. Relative paths in the config are
    /// resolved against it.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Chunk name used in Lua error messages.
    pub fn chunk_name(&self) -> &str {
        &self.chunk_name
    }

    /// Executable source text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Turns a config script on disk into a [`TranspiledScript`].
pub struct ScriptLoader;

impl ScriptLoader {
    /// Locate, check and transpile the script at `path`.
    pub fn load(path: &Path) -> Result<TranspiledScript> {
        let path = Self::locate(path)?;
        let bytes = std::fs::read(&path).map_err(|source| {
            Box::new(Error::Io {
                path: path.clone(),
                source,
            })
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded config script");

        Self::check(&path, &bytes)?;
        Self::transpile(&path, &bytes)
    }

    /// Check that `path` names an existing file.
    pub fn locate(path: &Path) -> Result<PathBuf> {
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(Box::new(Error::ConfigNotFound {
                path: path.to_path_buf(),
            }))
        }
    }

    /// Compile the script without running it.
    ///
    /// Compilation happens in a scratch Lua state that is dropped afterwards,
    /// so nothing the script could define leaks anywhere.
    pub fn check(path: &Path, source: &[u8]) -> Result<()> {
        let body = strip_preamble(source);
        let lua = Lua::new();
        let compiled = lua
            .load(body)
            .set_name(chunk_name(path))
            .set_mode(ChunkMode::Text)
            .into_function();

        match compiled {
            Ok(_) => Ok(()),
            Err(err) => {
                let ctx = SourceContext::new(path, String::from_utf8_lossy(body));
                let message = match err {
                    mlua::Error::SyntaxError { message, .. } => message,
                    other => other.to_string(),
                };
                Err(ctx.type_error(message))
            }
        }
    }

    /// Produce the executable form of the script.
    ///
    /// The BOM is dropped and a `#!` line is blanked so that line numbers in
    /// later errors still match the file. Line endings become `\n`.
    pub fn transpile(path: &Path, source: &[u8]) -> Result<TranspiledScript> {
        let body = strip_preamble(source);
        let text = std::str::from_utf8(body).map_err(|e| {
            Box::new(Error::ConfigTranspile {
                path: path.to_path_buf(),
                offset: source.len() - body.len() + e.valid_up_to(),
            })
        })?;

        Ok(TranspiledScript {
            path: path.to_path_buf(),
            chunk_name: chunk_name(path),
            source: text.replace("\r\n", "\n"),
        })
    }
}

fn chunk_name(path: &Path) -> String {
    format!("@{}", path.display())
}

/// Skip a UTF-8 BOM and the text of a leading `#!` line, keeping its newline.
fn strip_preamble(source: &[u8]) -> &[u8] {
    let source = source.strip_prefix(BOM).unwrap_or(source);
    if source.starts_with(b"#!") {
        let end = source
            .iter()
            .position(|b| *b == b'\n')
            .unwrap_or(source.len());
        &source[end..]
    } else {
        source
    }
}
