//! Following `extends` chains.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use tsb_core::{Diagnostic, resolve_path};

use crate::error::{Error, Result, not_found, syntax_error};
use crate::node::{CompilerOptions, CompilerOptionsNode};
use crate::DEFAULT_FILE_NAME;

const STAGE: &str = "tsconfig";

/// Resolve a compiler options reference relative to `base`.
///
/// An existing file is used as is. Otherwise a reference not ending in
/// `.json` is tried with `.json` appended, and a directory means its
/// `tsconfig.json`, in that order.
pub fn resolve_options_path(base: &Path, reference: &str) -> Result<PathBuf> {
    resolve_reference(base, reference, None)
}

fn resolve_reference(base: &Path, reference: &str, referenced_by: Option<&Path>) -> Result<PathBuf> {
    let path = resolve_path(base, reference);
    if path.is_file() {
        return Ok(path);
    }

    let with_json = if path.extension().is_none_or(|ext| ext != "json") {
        let mut with_json = path.clone().into_os_string();
        with_json.push(".json");
        let with_json = PathBuf::from(with_json);
        if with_json.is_file() {
            return Ok(with_json);
        }
        Some(with_json)
    } else {
        None
    };

    if path.is_dir() {
        let in_dir = path.join(DEFAULT_FILE_NAME);
        return if in_dir.is_file() {
            Ok(in_dir)
        } else {
            Err(not_found(in_dir, referenced_by))
        };
    }

    Err(not_found(with_json.unwrap_or(path), referenced_by))
}

/// The fully merged view of a compiler options chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    pub compiler_options: CompilerOptions,
    /// Include globs, absolute, from the nearest file that declares any.
    pub include: Vec<PathBuf>,
    /// Other top-level keys, child over parent.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
    /// Files of the chain, leaf first.
    pub chain: Vec<PathBuf>,
}

impl ResolvedOptions {
    /// Overlay `node`, read from `path`, on top of this resolved parent.
    fn overlay(&self, path: &Path, node: &CompilerOptionsNode) -> ResolvedOptions {
        let dir = path.parent().unwrap_or(Path::new(""));
        let include = match &node.include {
            Some(globs) if !globs.is_empty() => {
                globs.iter().map(|glob| resolve_path(dir, glob)).collect()
            }
            _ => self.include.clone(),
        };

        let mut other = self.other.clone();
        other.extend(node.other.clone());

        let mut chain = vec![path.to_path_buf()];
        chain.extend(self.chain.iter().cloned());

        ResolvedOptions {
            compiler_options: node.compiler_options.clone().merged_over(&self.compiler_options),
            include,
            other,
            chain,
        }
    }
}

/// Result of resolving a compiler options file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChain {
    /// The leaf file as written.
    pub raw: CompilerOptionsNode,
    pub resolved: ResolvedOptions,
    /// Non-fatal advisories about the resolved options.
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads and merges compiler options chains.
pub struct OptionChainResolver;

impl OptionChainResolver {
    /// Resolve the chain starting at `path`.
    ///
    /// Nodes are read leaf first. Every file is tracked by its canonical
    /// path, so a file reached twice is a cycle no matter how many hops it
    /// took. Merging starts only once the whole chain has been read.
    pub fn resolve(path: &Path) -> Result<OptionChain> {
        if !path.is_file() {
            return Err(not_found(path.to_path_buf(), None));
        }

        let mut visited: Vec<PathBuf> = Vec::new();
        let mut nodes: Vec<(PathBuf, CompilerOptionsNode)> = Vec::new();
        let mut current = path.to_path_buf();
        loop {
            let canonical = std::fs::canonicalize(&current).unwrap_or_else(|_| current.clone());
            if visited.contains(&canonical) {
                let mut chain: Vec<PathBuf> = nodes.into_iter().map(|(p, _)| p).collect();
                chain.push(current);
                return Err(Box::new(Error::OptionsCycle { chain }));
            }
            visited.push(canonical);

            let node = read_node(&current)?;
            debug!(path = %current.display(), extends = ?node.extends, "read compiler options");

            let parent = match &node.extends {
                Some(reference) => {
                    let dir = current.parent().unwrap_or(Path::new(""));
                    Some(resolve_reference(dir, reference, Some(&current))?)
                }
                None => None,
            };
            nodes.push((current, node));

            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let resolved = nodes
            .iter()
            .rev()
            .fold(ResolvedOptions::default(), |parent, (path, node)| {
                parent.overlay(path, node)
            });

        if resolved.include.is_empty() {
            return Err(Box::new(Error::OptionsEmptyInclude {
                path: path.to_path_buf(),
            }));
        }

        let diagnostics = advisories(&resolved.compiler_options);
        let raw = nodes.swap_remove(0).1;
        Ok(OptionChain {
            raw,
            resolved,
            diagnostics,
        })
    }
}

fn read_node(path: &Path) -> Result<CompilerOptionsNode> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        Box::new(Error::OptionsRead {
            path: path.to_path_buf(),
            source,
        })
    })?;

    let value: Value = json5::from_str(&content).map_err(|e| syntax_error(path, &content, e))?;
    tsb_schema::validate(&CompilerOptionsNode::shape(), &value).map_err(|violations| {
        Box::new(Error::OptionsValidation {
            path: path.to_path_buf(),
            violations,
        })
    })?;

    serde_json::from_value(value).map_err(|e| {
        Box::new(Error::OptionsSyntax {
            path: path.to_path_buf(),
            message: e.to_string(),
            src: miette::NamedSource::new(path.display().to_string(), content.clone()),
            span: None,
        })
    })
}

/// Warnings about options that work but give a worse result.
fn advisories(options: &CompilerOptions) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if options.source_map != Some(true) {
        warn!("no sourceMap enabled in compiler options, source maps will not be generated");
        diagnostics.push(
            Diagnostic::warning(
                STAGE,
                "no sourceMap enabled - source maps will not be generated",
            )
            .at("compilerOptions.sourceMap"),
        );
    }

    if !options.is_es_module()
        && let Some(module) = &options.module
    {
        warn!(module = %module, "compiler options module is not an ES module kind");
        diagnostics.push(
            Diagnostic::warning(
                STAGE,
                format!(
                    "module is set to \"{module}\"; target an ES module kind such as \"ESNext\", \
                     the bundle is converted to CommonJS regardless"
                ),
            )
            .at("compilerOptions.module"),
        );
    }

    diagnostics
}
