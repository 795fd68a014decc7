//! Compiler options file contents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tsb_schema::{ObjectShape, Shape};

/// Accepted values of `compilerOptions.jsx`.
pub const JSX_OPTIONS: &[&str] = &["preserve", "react", "react-jsx", "react-jsxdev", "react-native"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Jsx {
    #[serde(rename = "preserve")]
    Preserve,
    #[serde(rename = "react")]
    React,
    #[serde(rename = "react-jsx")]
    ReactJsx,
    #[serde(rename = "react-jsxdev")]
    ReactJsxDev,
    #[serde(rename = "react-native")]
    ReactNative,
}

/// The `compilerOptions` object.
///
/// Only the options tsb looks at are typed; everything else is carried
/// through untouched in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx: Option<Jsx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl CompilerOptions {
    /// Overlay `self` on top of `parent`, option by option.
    pub fn merged_over(self, parent: &CompilerOptions) -> CompilerOptions {
        let mut other = parent.other.clone();
        other.extend(self.other);
        CompilerOptions {
            jsx: self.jsx.or(parent.jsx),
            source_map: self.source_map.or(parent.source_map),
            module: self.module.or_else(|| parent.module.clone()),
            other,
        }
    }

    /// Whether the module kind is an ES module kind (`ES2015`, `ESNext`...).
    ///
    /// An unset module counts as ES.
    pub fn is_es_module(&self) -> bool {
        self.module
            .as_deref()
            .is_none_or(|module| module.to_lowercase().starts_with("es"))
    }
}

/// One parsed compiler options file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptionsNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    /// Top-level keys other than the above (`exclude`, `files`, ...).
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl CompilerOptionsNode {
    /// The shape a compiler options file must have. Undeclared keys are
    /// allowed at every level.
    pub fn shape() -> Shape {
        ObjectShape::new()
            .optional("extends", Shape::String)
            .optional("include", Shape::array_of(Shape::String))
            .optional(
                "compilerOptions",
                ObjectShape::new()
                    .optional("jsx", Shape::one_of_str(JSX_OPTIONS))
                    .optional("sourceMap", Shape::Boolean)
                    .optional("module", Shape::String),
            )
            .into()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_keeps_unknown_options() {
        let node: CompilerOptionsNode = serde_json::from_value(json!({
            "extends": "./base.json",
            "exclude": ["node_modules"],
            "compilerOptions": { "jsx": "react-jsx", "sourceMap": true, "strict": true }
        }))
        .unwrap();

        assert_eq!(node.extends.as_deref(), Some("./base.json"));
        assert_eq!(node.include, None);
        assert_eq!(node.compiler_options.jsx, Some(Jsx::ReactJsx));
        assert_eq!(node.compiler_options.source_map, Some(true));
        assert_eq!(node.compiler_options.other["strict"], json!(true));
        assert_eq!(node.other["exclude"], json!(["node_modules"]));
    }

    #[test]
    fn test_merged_over_prefers_child() {
        let parent = CompilerOptions {
            jsx: Some(Jsx::React),
            source_map: Some(true),
            module: Some("commonjs".to_string()),
            other: BTreeMap::from([
                ("strict".to_string(), json!(true)),
                ("target".to_string(), json!("es5")),
            ]),
        };
        let child = CompilerOptions {
            module: Some("esnext".to_string()),
            other: BTreeMap::from([("target".to_string(), json!("es2020"))]),
            ..Default::default()
        };

        let merged = child.merged_over(&parent);
        assert_eq!(merged.jsx, Some(Jsx::React));
        assert_eq!(merged.source_map, Some(true));
        assert_eq!(merged.module.as_deref(), Some("esnext"));
        assert_eq!(merged.other["target"], json!("es2020"));
        assert_eq!(merged.other["strict"], json!(true));
    }

    #[test]
    fn test_is_es_module() {
        let mut options = CompilerOptions::default();
        assert!(options.is_es_module());
        options.module = Some("ESNext".to_string());
        assert!(options.is_es_module());
        options.module = Some("CommonJS".to_string());
        assert!(!options.is_es_module());
    }

    #[test]
    fn test_shape_rejects_unknown_jsx() {
        let err = tsb_schema::validate(
            &CompilerOptionsNode::shape(),
            &json!({ "compilerOptions": { "jsx": "vue", "sourceMap": "yes" } }),
        )
        .unwrap_err();
        assert_eq!(err.paths(), vec!["compilerOptions.jsx", "compilerOptions.sourceMap"]);
    }
}
