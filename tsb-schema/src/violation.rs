//! Violation reporting.

use std::fmt;

use serde_json::Value;

/// What went wrong at a single location.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// A required field is absent.
    Missing,
    /// The value has the wrong type.
    Type { expected: String, found: &'static str },
    /// The value is not one of the allowed literals.
    NotOneOf { allowed: Vec<Value> },
    /// The integer is outside the allowed range.
    OutOfRange { min: i64, max: i64 },
    /// The key is not declared on a closed object.
    Unknown,
}

/// A single violation, located by a dotted path such as `headers.X-Id` or
/// `hash_files_for[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    fn subject(&self) -> &str {
        if self.path.is_empty() {
            "value"
        } else {
            &self.path
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = self.subject();
        match &self.kind {
            ViolationKind::Missing => write!(f, "{} is a required field", subject),
            ViolationKind::Type { expected, found } => {
                let article = if expected.starts_with(['a', 'e', 'i', 'o', 'u']) {
                    "an"
                } else {
                    "a"
                };
                write!(f, "{} must be {} {}, but got {}", subject, article, expected, found)
            }
            ViolationKind::NotOneOf { allowed } => {
                let allowed: Vec<String> = allowed.iter().map(literal).collect();
                write!(
                    f,
                    "{} must be one of the following values: {}",
                    subject,
                    allowed.join(", ")
                )
            }
            ViolationKind::OutOfRange { min, max } => {
                write!(f, "{} must be between {} and {}", subject, min, max)
            }
            ViolationKind::Unknown => write!(f, "{} is not a known field", subject),
        }
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Every violation found in one validation pass, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// The paths of all violations, in order.
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }

    /// Render as an indented bullet list, one violation per line.
    pub fn bullet_list(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("  - {}", v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_display_messages() {
        let missing = Violation::new("main", ViolationKind::Missing);
        assert_eq!(missing.to_string(), "main is a required field");

        let ty = Violation::new(
            "port",
            ViolationKind::Type {
                expected: "integer".to_string(),
                found: "string",
            },
        );
        assert_eq!(ty.to_string(), "port must be an integer, but got string");

        let one_of = Violation::new(
            "insert_script_tag",
            ViolationKind::NotOneOf {
                allowed: vec![json!("body"), json!("head"), json!(false)],
            },
        );
        assert_eq!(
            one_of.to_string(),
            "insert_script_tag must be one of the following values: body, head, false"
        );
    }

    #[test]
    fn test_root_subject() {
        let v = Violation::new(
            "",
            ViolationKind::Type {
                expected: "object".to_string(),
                found: "string",
            },
        );
        assert_eq!(v.to_string(), "value must be an object, but got string");
    }

    #[test]
    fn test_bullet_list() {
        let violations = Violations::new(vec![
            Violation::new("main", ViolationKind::Missing),
            Violation::new("out_dir", ViolationKind::Missing),
        ]);
        assert_eq!(
            violations.bullet_list(),
            "  - main is a required field\n  - out_dir is a required field"
        );
    }
}
