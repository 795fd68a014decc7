//! Sandboxed execution of config scripts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mlua::{ChunkMode, DeserializeOptions, Function, Lua, LuaSerdeExt, Table, Value, Variadic};
use tracing::{debug, info};
use tsb_core::{ProcessEnv, resolve_path};

use crate::error::{Error, Result, SourceContext};
use crate::hooks::Hooks;
use crate::loader::TranspiledScript;

/// Host builtins copied into the script environment.
const BUILTINS: &[&str] = &[
    "assert", "error", "ipairs", "next", "pairs", "pcall", "select", "tonumber", "tostring",
    "type", "xpcall", "string", "table", "math", "utf8",
];

/// Runs transpiled config scripts.
///
/// Every run gets a fresh Lua state. The script does not see the host
/// globals; its environment holds only the builtins above, `require`
/// (searching next to the script, then `LUA_PATH`; modules share the
/// environment), a `process` table with an environment snapshot and
/// `cwd()`, `print`, `exports` and the `null` sentinel.
#[derive(Debug, Clone)]
pub struct ScriptSandbox {
    env: ProcessEnv,
    cwd: PathBuf,
}

impl ScriptSandbox {
    pub fn new(env: ProcessEnv, cwd: impl Into<PathBuf>) -> Self {
        Self {
            env,
            cwd: cwd.into(),
        }
    }

    /// Execute `script` and capture its export.
    ///
    /// The export is the value the chunk returns, or `exports.default` when
    /// it returns nothing.
    pub fn run(&self, script: &TranspiledScript) -> Result<ScriptExport> {
        let ctx = SourceContext::new(script.path(), script.source());
        let lua = Lua::new();
        let env = self
            .environment(&lua, script.dir())
            .map_err(|e| ctx.execution_error(e))?;

        debug!(path = %script.path().display(), "executing config script");
        let returned: Value = lua
            .load(script.source())
            .set_name(script.chunk_name())
            .set_mode(ChunkMode::Text)
            .set_environment(env.clone())
            .call(())
            .map_err(|e| ctx.execution_error(e))?;

        let value = match returned {
            Value::Nil => env
                .get::<Table>("exports")
                .and_then(|exports| exports.get::<Value>("default"))
                .map_err(|e| ctx.execution_error(e))?,
            value => value,
        };
        if value.is_nil() {
            return Err(Box::new(Error::ConfigMissingExport {
                path: script.path().to_path_buf(),
            }));
        }

        Ok(ScriptExport {
            lua,
            value,
            ctx,
        })
    }

    fn environment(&self, lua: &Lua, dir: &Path) -> mlua::Result<Table> {
        let globals = lua.globals();
        let env = lua.create_table()?;
        for name in BUILTINS {
            env.set(*name, globals.get::<Value>(*name)?)?;
        }
        let table: Table = globals.get("table")?;
        env.set("unpack", table.get::<Value>("unpack")?)?;

        let templates = module_templates(dir, &self.env, &self.cwd);
        env.set("require", require_function(lua, &env, templates)?)?;

        env.set("process", self.process_table(lua)?)?;
        env.set(
            "print",
            lua.create_function(|_, args: Variadic<Value>| {
                let line: Vec<String> = args.iter().map(display_value).collect();
                info!(target: "tsb::script", "{}", line.join("\t"));
                Ok(())
            })?,
        )?;
        env.set("exports", lua.create_table()?)?;
        env.set("null", Value::NULL)?;
        Ok(env)
    }

    fn process_table(&self, lua: &Lua) -> mlua::Result<Table> {
        let process = lua.create_table()?;
        process.set("env", lua.create_table_from(self.env.iter())?)?;

        let cwd = self.cwd.display().to_string();
        process.set("cwd", lua.create_function(move |_, ()| Ok(cwd.clone()))?)?;
        Ok(process)
    }
}

/// Search path used when the environment sets neither `LUA_PATH_5_4` nor
/// `LUA_PATH`, the stock Lua 5.4 default.
const DEFAULT_LUA_PATH: &str = "/usr/local/share/lua/5.4/?.lua;/usr/local/share/lua/5.4/?/init.lua;\
/usr/local/lib/lua/5.4/?.lua;/usr/local/lib/lua/5.4/?/init.lua;./?.lua;./?/init.lua";

/// Module path templates in search order: the script directory first, then
/// the Lua search path from `env`.
///
/// As in Lua, `;;` in the variable stands for the default path. Relative
/// templates are taken from `cwd`.
fn module_templates(dir: &Path, env: &ProcessEnv, cwd: &Path) -> Vec<String> {
    let lua_path = env
        .get("LUA_PATH_5_4")
        .or_else(|| env.get("LUA_PATH"))
        .map(|path| path.replace(";;", &format!(";{DEFAULT_LUA_PATH};")))
        .unwrap_or_else(|| DEFAULT_LUA_PATH.to_string());

    let local = [
        dir.join("?.lua").display().to_string(),
        dir.join("?").join("init.lua").display().to_string(),
    ];
    let mut templates: Vec<String> = local.into_iter().collect();
    for template in lua_path.split(';').filter(|t| !t.is_empty()) {
        let template = resolve_path(cwd, template).display().to_string();
        if !templates.contains(&template) {
            templates.push(template);
        }
    }
    templates
}

/// A `require` that searches next to the script, then the Lua search path,
/// and runs modules in the sandbox environment. Modules are loaded once per
/// run.
fn require_function(lua: &Lua, env: &Table, templates: Vec<String>) -> mlua::Result<Function> {
    let loaded = lua.create_table()?;
    let env = env.clone();

    lua.create_function(move |lua, name: String| {
        let cached: Value = loaded.raw_get(name.as_str())?;
        if !cached.is_nil() {
            return Ok(cached);
        }

        let relative = name.replace('.', "/");
        let candidates: Vec<PathBuf> = templates
            .iter()
            .map(|template| PathBuf::from(template.replace('?', &relative)))
            .collect();
        let Some(path) = candidates.iter().find(|path| path.is_file()) else {
            let searched: Vec<String> = candidates
                .iter()
                .map(|path| format!("\n\tno file '{}'", path.display()))
                .collect();
            return Err(mlua::Error::RuntimeError(format!(
                "module '{name}' not found:{}",
                searched.concat()
            )));
        };
        debug!(module = %name, path = %path.display(), "loading config module");

        let module: Value = lua
            .load(path.as_path())
            .set_mode(ChunkMode::Text)
            .set_environment(env.clone())
            .call(name.as_str())?;
        // A module returning nothing still counts as loaded
        let module = if module.is_nil() {
            Value::Boolean(true)
        } else {
            module
        };
        loaded.raw_set(name.as_str(), module.clone())?;
        Ok(module)
    })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.to_string_lossy().to_string(),
        other => other.type_name().to_string(),
    }
}

/// The value a config script exported, still living in its Lua state.
pub struct ScriptExport {
    lua: Lua,
    value: Value,
    ctx: SourceContext,
}

impl std::fmt::Debug for ScriptExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptExport")
            .field("value", &self.value.type_name())
            .finish()
    }
}

impl ScriptExport {
    /// Split the export into plain data and extension hooks.
    ///
    /// Top-level fields named in `hook_fields` that hold functions are
    /// removed and returned as [`Hooks`]. A hook field holding anything else
    /// stays in the data so validation can report it. Any other function in
    /// the export is dropped by the conversion.
    pub fn into_parts(self, hook_fields: &[&str]) -> Result<(serde_json::Value, Hooks)> {
        let ctx = &self.ctx;
        let mut functions = BTreeMap::new();
        if let Value::Table(table) = &self.value {
            for field in hook_fields {
                let value = table
                    .raw_get::<Value>(*field)
                    .map_err(|e| ctx.conversion_error(e))?;
                if let Value::Function(function) = value {
                    table
                        .raw_set(*field, Value::Nil)
                        .map_err(|e| ctx.conversion_error(e))?;
                    functions.insert(field.to_string(), function);
                }
            }
        }

        let options = DeserializeOptions::new().deny_unsupported_types(false);
        let data: serde_json::Value = self
            .lua
            .from_value_with(self.value, options)
            .map_err(|e| self.ctx.conversion_error(e))?;
        Ok((data, Hooks::new(self.lua, functions)))
    }
}
