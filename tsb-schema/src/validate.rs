//! Shape validation.

use serde_json::{Map, Value};

use crate::{ObjectShape, Shape, Violation, ViolationKind, Violations};

/// Validate `value` against `shape`.
///
/// Returns `Ok(())` when the value conforms, leaving it untouched. Otherwise
/// returns every violation found across the whole value, not just the first.
///
/// An empty object is accepted as an empty list only at
/// [`Shape::LuaArray`] positions.
pub fn validate(shape: &Shape, value: &Value) -> Result<(), Violations> {
    let mut violations = Vec::new();
    check(shape, value, &Path::root(), &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Violations::new(violations))
    }
}

/// Location of the value currently being checked.
struct Path {
    rendered: String,
}

impl Path {
    fn root() -> Self {
        Self {
            rendered: String::new(),
        }
    }

    fn key(&self, key: &str) -> Self {
        let rendered = if self.rendered.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.rendered, key)
        };
        Self { rendered }
    }

    fn index(&self, index: usize) -> Self {
        Self {
            rendered: format!("{}[{}]", self.rendered, index),
        }
    }

    fn violation(&self, kind: ViolationKind) -> Violation {
        Violation::new(self.rendered.clone(), kind)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(shape: &Shape, value: &Value, path: &Path, out: &mut Vec<Violation>) {
    out.push(path.violation(ViolationKind::Type {
        expected: shape.expected(),
        found: type_name(value),
    }));
}

fn check(shape: &Shape, value: &Value, path: &Path, out: &mut Vec<Violation>) {
    match (shape, value) {
        (Shape::Any, _) => {}
        (Shape::String, Value::String(_)) => {}
        (Shape::Boolean, Value::Bool(_)) => {}
        (Shape::Number, Value::Number(_)) => {}
        (Shape::Scalar, Value::Null | Value::String(_) | Value::Number(_) | Value::Bool(_)) => {}
        (Shape::Integer { min, max }, Value::Number(n)) => match n.as_i64() {
            Some(i) if i < *min || i > *max => out.push(path.violation(ViolationKind::OutOfRange {
                min: *min,
                max: *max,
            })),
            Some(_) => {}
            // Fractional, or beyond i64
            None => mismatch(shape, value, path, out),
        },
        (Shape::OneOf(allowed), _) => {
            if !allowed.contains(value) {
                out.push(path.violation(ViolationKind::NotOneOf {
                    allowed: allowed.clone(),
                }));
            }
        }
        (Shape::Array(item) | Shape::LuaArray(item), Value::Array(items)) => {
            for (i, element) in items.iter().enumerate() {
                check(item, element, &path.index(i), out);
            }
        }
        (Shape::LuaArray(_), Value::Object(map)) if map.is_empty() => {}
        (Shape::Map(inner), Value::Object(map)) => {
            for (key, element) in map {
                check(inner, element, &path.key(key), out);
            }
        }
        (Shape::Object(object), Value::Object(map)) => check_object(object, map, path, out),
        _ => mismatch(shape, value, path, out),
    }
}

fn check_object(
    object: &ObjectShape,
    map: &Map<String, Value>,
    path: &Path,
    out: &mut Vec<Violation>,
) {
    for field in object.fields() {
        match map.get(&field.name) {
            Some(value) => check(&field.shape, value, &path.key(&field.name), out),
            None if field.required => {
                out.push(path.key(&field.name).violation(ViolationKind::Missing))
            }
            None => {}
        }
    }

    if object.is_closed() {
        for key in map.keys() {
            if object.field(key).is_none() {
                out.push(path.key(key).violation(ViolationKind::Unknown));
            }
        }
    }
}
