//! Reconciling declared environment variables with the process environment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tsb_core::{ProcessEnv, value_to_string};

/// Declared environment variables: name to optional default.
///
/// Defaults may be strings, numbers or booleans and are stringified. `null`
/// declares a variable that must come from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvDeclaration(BTreeMap<String, Value>);

impl EnvDeclaration {
    /// The default for `name`, or `None` if it has none or is not declared.
    pub fn default_for(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(value_to_string)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for EnvDeclaration {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A declared variable with no default that the environment does not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVar {
    pub name: String,
    /// Config field that declared it (`env` or `index_html_env`).
    pub field: &'static str,
}

/// Substitute each declared variable with its live value, falling back to
/// its default.
///
/// Fails with every variable that has neither, in name order.
pub fn reconcile(
    field: &'static str,
    declared: &EnvDeclaration,
    live: &ProcessEnv,
) -> std::result::Result<BTreeMap<String, String>, Vec<MissingVar>> {
    let mut resolved = BTreeMap::new();
    let mut missing = Vec::new();

    for name in declared.names() {
        match live.get(name).map(str::to_string).or_else(|| declared.default_for(name)) {
            Some(value) => {
                resolved.insert(name.to_string(), value);
            }
            None => missing.push(MissingVar {
                name: name.to_string(),
                field,
            }),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(missing)
    }
}
