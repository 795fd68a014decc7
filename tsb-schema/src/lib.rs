//! Declarative shape validation for tsb configuration values.
//!
//! A [`Shape`] describes what a JSON-like value must look like. [`validate`]
//! walks the value once and reports *every* violation it finds, so a config
//! author can fix a whole file in one pass instead of one error at a time.
//!
//! ```
//! use serde_json::json;
//! use tsb_schema::{ObjectShape, Shape, validate};
//!
//! let shape: Shape = ObjectShape::new()
//!     .required("main", Shape::String)
//!     .optional("port", Shape::port())
//!     .into();
//!
//! let violations = validate(&shape, &json!({ "port": "80" })).unwrap_err();
//! assert_eq!(violations.len(), 2);
//! ```

mod shape;
mod validate;
mod violation;

pub use shape::{Field, ObjectShape, Shape};
pub use validate::validate;
pub use violation::{Violation, ViolationKind, Violations};
