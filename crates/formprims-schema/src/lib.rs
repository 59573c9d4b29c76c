//! Form schema vocabulary and named schema registry.
//!
//! A schema describes the shape of a form's data with a small JSON
//! vocabulary:
//!
//! - scalar tags `"string"`, `"number"`, `"boolean"`, `"date"`, `"file"`,
//!   each optionally suffixed with `?` to make the value nullable,
//! - objects mapping keys to sub-schemas,
//! - single-element arrays `[element]` for lists.
//!
//! ```text
//! {
//!   "name": "string",
//!   "age": "number?",
//!   "tags": ["string"],
//!   "address": { "street": "string", "zip": "string?" }
//! }
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod schema;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::SchemaRegistry;
pub use schema::{ScalarKind, ScalarSchema, Schema};
