//! Shape descriptions.

use serde_json::Value;

/// The declared shape of a value.
///
/// Shapes are plain immutable data. They are built once by the crate that
/// owns a schema and handed to [`validate`](crate::validate) by reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Anything, including `null`.
    Any,
    String,
    Boolean,
    Number,
    /// A whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    /// A string, number, boolean or `null`.
    Scalar,
    /// Exactly one of the listed literal values.
    OneOf(Vec<Value>),
    /// A list whose items all match the inner shape.
    Array(Box<Shape>),
    /// Like [`Shape::Array`], but an empty object also counts as an empty
    /// list. Lua tables carry no array/object distinction, so an empty
    /// table converts to `{}`.
    LuaArray(Box<Shape>),
    /// A map with arbitrary keys whose values all match the inner shape.
    Map(Box<Shape>),
    /// An object with declared fields.
    Object(ObjectShape),
    /// A host callback. Callbacks never survive conversion to data, so any
    /// value found at this position is a violation.
    Function,
}

impl Shape {
    /// A list of items of the given shape.
    pub fn array_of(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    /// A list of items of the given shape that may come from a Lua table.
    pub fn lua_array_of(item: Shape) -> Self {
        Shape::LuaArray(Box::new(item))
    }

    /// A map of arbitrary keys to values of the given shape.
    pub fn map_of(value: Shape) -> Self {
        Shape::Map(Box::new(value))
    }

    /// One of the given string literals.
    pub fn one_of_str(values: &[&str]) -> Self {
        Shape::OneOf(values.iter().map(|v| Value::from(*v)).collect())
    }

    /// A TCP port number.
    pub fn port() -> Self {
        Shape::Integer {
            min: 0,
            max: u16::MAX as i64,
        }
    }

    /// Human readable name of what this shape expects.
    pub fn expected(&self) -> String {
        match self {
            Shape::Any => "any value".to_string(),
            Shape::String => "string".to_string(),
            Shape::Boolean => "boolean".to_string(),
            Shape::Number => "number".to_string(),
            Shape::Integer { .. } => "integer".to_string(),
            Shape::Scalar => "string, number, boolean or null".to_string(),
            Shape::OneOf(_) => "literal".to_string(),
            Shape::Array(item) | Shape::LuaArray(item) => format!("list of {}", item.expected()),
            Shape::Map(value) => format!("map of {}", value.expected()),
            Shape::Object(_) => "object".to_string(),
            Shape::Function => "function".to_string(),
        }
    }
}

impl From<ObjectShape> for Shape {
    fn from(object: ObjectShape) -> Self {
        Shape::Object(object)
    }
}

/// A declared object field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
    pub required: bool,
}

/// The shape of an object with named fields.
///
/// Objects are open by default: keys that are not declared are ignored.
/// [`ObjectShape::closed`] turns undeclared keys into violations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    fields: Vec<Field>,
    closed: bool,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field that must be present.
    pub fn required(mut self, name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            shape: shape.into(),
            required: true,
        });
        self
    }

    /// Declare a field that is validated only when present.
    pub fn optional(mut self, name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            shape: shape.into(),
            required: false,
        });
        self
    }

    /// Reject keys that are not declared.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Look up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
