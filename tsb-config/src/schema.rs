//! The shape of a config script export.

use serde_json::json;
use tsb_core::Command;
use tsb_schema::{ObjectShape, Shape};

/// Top-level fields that hold extension hooks rather than data.
pub const HOOK_FIELDS: &[&str] = &["extend_loaders", "extend_plugins", "extend_rules"];

fn commands() -> Shape {
    Shape::lua_array_of(Shape::OneOf(
        Command::ALL.iter().map(|c| json!(c.as_str())).collect(),
    ))
}

/// The shape every config script export must have.
///
/// Environment maps accept strings, numbers, booleans and `null` (no
/// default). Unknown fields are rejected.
pub fn config_shape() -> Shape {
    ObjectShape::new()
        .required("main", Shape::String)
        .required("out_dir", Shape::String)
        .optional("main_out_sub_dir", Shape::String)
        .optional("main_bundle_name", Shape::String)
        .optional("tsconfig_path", Shape::String)
        .optional("index_html_path", Shape::String)
        .optional("index_html_env", Shape::map_of(Shape::Scalar))
        .optional("output_index_html_for", commands())
        .optional(
            "insert_script_tag",
            Shape::OneOf(vec![json!("body"), json!("head"), json!(false)]),
        )
        .optional("react_hot_loading", Shape::Boolean)
        .optional("hash_files_for", commands())
        .optional("clear_out_dir_before", commands())
        .optional("additional_files_to_parse", Shape::lua_array_of(Shape::String))
        .optional("env", Shape::map_of(Shape::Scalar))
        .optional("hot_loading", Shape::Boolean)
        .optional("host", Shape::String)
        .optional("port", Shape::port())
        .optional("public_dir", Shape::String)
        .optional("public_path", Shape::String)
        .optional("single_page_app", Shape::Boolean)
        .optional("headers", Shape::map_of(Shape::String))
        .optional("extend_loaders", Shape::Function)
        .optional("extend_plugins", Shape::Function)
        .optional("extend_rules", Shape::Function)
        .closed()
        .into()
}
