//! Schema-driven form field trees with typed data extraction.
//!
//! A [`Form`] turns a [`Schema`] and a caller-owned backing [`Value`] into a
//! tree of [`Field`]s. Scalar fields read and write a single leaf, object
//! fields map keys to sub-fields, and array fields expose list mutations.
//! Every write flows back up the tree and ends in the `on_change` callback
//! with the updated backing value.
//!
//! [`extract_data`] walks a field tree and produces the validated plain
//! data, failing on the first required field that is missing or malformed.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use formprims_field::{extract_data, Form, Value};
//!
//! let form: Form = r#"{"name": "string", "tags": ["string"]}"#.parse().unwrap();
//! let latest = Rc::new(RefCell::new(Value::Null));
//! let sink = Rc::clone(&latest);
//!
//! let initial = Value::from(serde_json::json!({"name": "Ada", "tags": ["a", "b"]}));
//! let mut fields = form.fields_with(initial, move |value| *sink.borrow_mut() = value);
//!
//! let tags = fields.as_object_mut().unwrap()["tags"].as_array_mut().unwrap();
//! assert_eq!(tags.push("c"), 3);
//! assert_eq!(latest.borrow().get("tags").unwrap().as_array().unwrap().len(), 3);
//!
//! let data = extract_data(&fields).unwrap();
//! assert_eq!(data.get("name"), Some(&Value::from("Ada")));
//! ```

pub mod build;
pub mod error;
pub mod extract;
pub mod field;
pub mod form;
pub mod path;

pub use build::{build, noop_setter, Setter};
pub use error::{FieldError, Result};
pub use extract::{
    extract, extract_data, extract_data_with, extract_with, ExtractConfig, NumberPolicy,
};
pub use field::{ArrayField, Field, ObjectField, ScalarField};
pub use form::Form;
pub use path::{FieldPath, PathSegment};

pub use formprims_schema::{ScalarKind, ScalarSchema, Schema, SchemaError};
pub use formprims_value::{FileBlob, Map, Value};
