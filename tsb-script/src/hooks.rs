//! Extension hooks exported by a config script.

use std::collections::BTreeMap;
use std::fmt;

use mlua::{Function, Lua, LuaSerdeExt, Value};
use tracing::debug;
use tsb_core::{Command, Mode};

use crate::error::{Error, Result};

/// Functions a config script exported to extend the bundler defaults.
///
/// A hook is called as `hook(items, mode, command)` and returns the new list
/// of items. Hooks keep the Lua state of the run that produced them alive.
pub struct Hooks {
    lua: Option<Lua>,
    functions: BTreeMap<String, Function>,
}

impl Hooks {
    pub(crate) fn new(lua: Lua, functions: BTreeMap<String, Function>) -> Self {
        Self {
            lua: Some(lua),
            functions,
        }
    }

    /// No hooks at all.
    pub fn none() -> Self {
        Self {
            lua: None,
            functions: BTreeMap::new(),
        }
    }

    /// Names of the exported hooks, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Run the hook called `name` over `items`.
    ///
    /// Without such a hook the items are returned unchanged.
    pub fn apply(
        &self,
        name: &str,
        items: Vec<serde_json::Value>,
        mode: Mode,
        command: Command,
    ) -> Result<Vec<serde_json::Value>> {
        let (Some(lua), Some(function)) = (&self.lua, self.functions.get(name)) else {
            return Ok(items);
        };
        debug!(hook = name, items = items.len(), "applying extension hook");

        let hook_error = |source| {
            Box::new(Error::Hook {
                name: name.to_string(),
                source,
            })
        };
        let input = lua.to_value(&items).map_err(hook_error)?;
        let output: Value = function
            .call((input, mode.as_str(), command.as_str()))
            .map_err(hook_error)?;
        if output.is_nil() {
            return Err(hook_error(mlua::Error::RuntimeError(
                "hook returned nil".to_string(),
            )));
        }

        let items: serde_json::Value = lua.from_value(output).map_err(hook_error)?;
        match items {
            serde_json::Value::Array(items) => Ok(items),
            // An empty Lua table converts to an empty object
            serde_json::Value::Object(map) if map.is_empty() => Ok(Vec::new()),
            _ => Err(hook_error(mlua::Error::RuntimeError(
                "hook must return a list".to_string(),
            ))),
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Hooks compare by name; functions have no meaningful equality.
impl PartialEq for Hooks {
    fn eq(&self, other: &Self) -> bool {
        self.names().eq(other.names())
    }
}
