//! Typed form state: schema-driven field trees with validated data extraction.
//!
//! formprims turns a declarative form schema into a tree of accessor fields
//! over caller-owned state, and extracts validated plain data from it.
//!
//! # Crate Structure
//!
//! - [`value`] — Backing value model, dates, file blobs and scalar coercion
//! - [`schema`] — Schema vocabulary and the named schema registry
//! - [`field`] — Field trees, the form factory and data extraction
//!
//! The most used items are re-exported at the crate root.

/// Re-export value types.
pub mod value {
    pub use formprims_value::*;
}

/// Re-export schema types.
pub mod schema {
    pub use formprims_schema::*;
}

/// Re-export field types.
pub mod field {
    pub use formprims_field::*;
}

pub use formprims_field::{
    extract_data, extract_data_with, ExtractConfig, Field, FieldError, FieldPath, Form,
    NumberPolicy,
};
pub use formprims_schema::{Schema, SchemaRegistry};
pub use formprims_value::{FileBlob, Value};
