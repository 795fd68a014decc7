//! The validated, typed form of a config script export.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tsb_core::Command;

use crate::env::EnvDeclaration;
use crate::error::{Error, Result};
use crate::schema::config_shape;

/// Where the bundle script tag goes in the generated index HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertScriptTag {
    #[default]
    Body,
    Head,
    /// Do not insert a script tag.
    Disabled,
}

impl<'de> Deserialize<'de> for InsertScriptTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) if s == "body" => Ok(InsertScriptTag::Body),
            Value::String(s) if s == "head" => Ok(InsertScriptTag::Head),
            Value::Bool(false) => Ok(InsertScriptTag::Disabled),
            other => Err(serde::de::Error::custom(format!(
                "invalid insert_script_tag {other}"
            ))),
        }
    }
}

impl Serialize for InsertScriptTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            InsertScriptTag::Body => serializer.serialize_str("body"),
            InsertScriptTag::Head => serializer.serialize_str("head"),
            InsertScriptTag::Disabled => serializer.serialize_bool(false),
        }
    }
}

/// A list that Lua may have exported as an empty table.
#[derive(Deserialize)]
#[serde(untagged)]
enum LuaList<T> {
    List(Vec<T>),
    Empty(BTreeMap<String, Value>),
}

fn lua_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<LuaList<T>>::deserialize(deserializer)?.map(|list| match list {
        LuaList::List(items) => items,
        LuaList::Empty(_) => Vec::new(),
    }))
}

/// A config script export that passed validation.
///
/// Optional fields stay optional here; defaults are applied when the
/// configuration is resolved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValidatedConfig {
    pub main: String,
    pub out_dir: String,
    #[serde(default)]
    pub main_out_sub_dir: Option<String>,
    #[serde(default)]
    pub main_bundle_name: Option<String>,
    #[serde(default)]
    pub tsconfig_path: Option<String>,
    #[serde(default)]
    pub index_html_path: Option<String>,
    #[serde(default)]
    pub index_html_env: Option<EnvDeclaration>,
    #[serde(default, deserialize_with = "lua_list")]
    pub output_index_html_for: Option<Vec<Command>>,
    #[serde(default)]
    pub insert_script_tag: Option<InsertScriptTag>,
    #[serde(default)]
    pub react_hot_loading: Option<bool>,
    #[serde(default, deserialize_with = "lua_list")]
    pub hash_files_for: Option<Vec<Command>>,
    #[serde(default, deserialize_with = "lua_list")]
    pub clear_out_dir_before: Option<Vec<Command>>,
    #[serde(default, deserialize_with = "lua_list")]
    pub additional_files_to_parse: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<EnvDeclaration>,
    #[serde(default)]
    pub hot_loading: Option<bool>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub public_dir: Option<String>,
    #[serde(default)]
    pub public_path: Option<String>,
    #[serde(default)]
    pub single_page_app: Option<bool>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ValidatedConfig {
    /// Validate the raw export of the script at `path` and type it.
    ///
    /// Every violation is reported at once.
    pub fn from_value(path: &Path, value: Value) -> Result<Self> {
        tsb_schema::validate(&config_shape(), &value).map_err(|violations| {
            Box::new(Error::ConfigValidation {
                path: path.to_path_buf(),
                violations,
            })
        })?;

        Self::deserialize(value).map_err(|source| {
            Box::new(Error::ConfigDeserialize {
                path: path.to_path_buf(),
                source,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_value_types_every_field() {
        let config = ValidatedConfig::from_value(
            Path::new("tsb.config.lua"),
            json!({
                "main": "src/index.tsx",
                "out_dir": "build",
                "main_out_sub_dir": "js",
                "insert_script_tag": false,
                "hash_files_for": ["build", "watch"],
                "clear_out_dir_before": {},
                "env": { "API_URL": null, "DEBUG": "false" },
                "port": 3000,
                "headers": { "X-Frame-Options": "DENY" }
            }),
        )
        .unwrap();

        assert_eq!(config.main, "src/index.tsx");
        assert_eq!(config.main_out_sub_dir.as_deref(), Some("js"));
        assert_eq!(config.insert_script_tag, Some(InsertScriptTag::Disabled));
        assert_eq!(config.hash_files_for, Some(vec![Command::Build, Command::Watch]));
        assert_eq!(config.clear_out_dir_before, Some(vec![]));
        assert_eq!(config.output_index_html_for, None);
        assert_eq!(config.port, Some(3000));
        assert_eq!(
            config.headers.unwrap()["X-Frame-Options"],
            "DENY".to_string()
        );
        assert_eq!(config.env.unwrap().len(), 2);
    }

    #[test]
    fn test_from_value_reports_violations() {
        let err = ValidatedConfig::from_value(
            Path::new("/p/tsb.config.lua"),
            json!({ "out_dir": 1, "insert_script_tag": "footer" }),
        )
        .unwrap_err();

        insta::assert_snapshot!(err.to_string(), @r"
        invalid config script '/p/tsb.config.lua':
          - main is a required field
          - out_dir must be a string, but got number
          - insert_script_tag must be one of the following values: body, head, false
        ");
    }

    #[test]
    fn test_insert_script_tag_round_trip_values() {
        let tag: InsertScriptTag = serde_json::from_value(json!("head")).unwrap();
        assert_eq!(tag, InsertScriptTag::Head);
        assert_eq!(serde_json::to_value(InsertScriptTag::Disabled).unwrap(), json!(false));
        assert!(serde_json::from_value::<InsertScriptTag>(json!(true)).is_err());
    }
}
