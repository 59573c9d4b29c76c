//! Backing value model for formprims field trees.
//!
//! A [`Value`] is the caller-owned, possibly partial data a form reads from
//! and writes into. On top of the JSON shapes it carries two scalar kinds
//! JSON lacks: dates and file blobs.
//!
//! The [`coerce`] module turns raw backing values into the edit-buffer
//! values scalar fields hold, and [`number`] decides what counts as a
//! well-formed numeric string.

pub mod coerce;
pub mod file;
pub mod number;
pub mod value;

pub use file::FileBlob;
pub use number::{format_number, loses_integer_precision, parse_numeric};
pub use value::{Map, Value};
