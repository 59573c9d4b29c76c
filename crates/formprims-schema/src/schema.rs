use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// The five scalar kinds a leaf can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
    Date,
    File,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 5] = [
        ScalarKind::String,
        ScalarKind::Number,
        ScalarKind::Boolean,
        ScalarKind::Date,
        ScalarKind::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Date => "date",
            ScalarKind::File => "file",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf: its kind and whether `null` is an acceptable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarSchema {
    pub kind: ScalarKind,
    pub nullable: bool,
}

impl ScalarSchema {
    pub fn required(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub fn nullable(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    pub fn is_required(&self) -> bool {
        !self.nullable
    }

    /// Parse a tag such as `"number"` or `"date?"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let (name, nullable) = match tag.strip_suffix('?') {
            Some(name) => (name, true),
            None => (tag, false),
        };
        ScalarKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .map(|kind| Self { kind, nullable })
    }

    /// The tag this leaf is written as.
    pub fn tag(&self) -> String {
        if self.nullable {
            format!("{}?", self.kind)
        } else {
            self.kind.to_string()
        }
    }
}

impl fmt::Display for ScalarSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// A parsed schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Scalar(ScalarSchema),
    Array(Box<Schema>),
    Object(IndexMap<String, Schema>),
}

impl Schema {
    pub fn required(kind: ScalarKind) -> Self {
        Schema::Scalar(ScalarSchema::required(kind))
    }

    pub fn nullable(kind: ScalarKind) -> Self {
        Schema::Scalar(ScalarSchema::nullable(kind))
    }

    pub fn array(element: Schema) -> Self {
        Schema::Array(Box::new(element))
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Schema::Object(
            fields
                .into_iter()
                .map(|(key, schema)| (key.into(), schema))
                .collect(),
        )
    }

    /// Parse a schema from its JSON form.
    pub fn from_json(value: &Value) -> Result<Self> {
        parse_node(value, "")
    }

    /// Render the schema back into its JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            Schema::Scalar(scalar) => Value::String(scalar.tag()),
            Schema::Array(element) => Value::Array(vec![element.to_json()]),
            Schema::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, schema)| (key.clone(), schema.to_json()))
                    .collect(),
            ),
        }
    }

    /// Number of fields a form shows before any array element exists: every
    /// scalar under nested objects, with each array counted as one field.
    pub fn leaf_count(&self) -> usize {
        match self {
            Schema::Scalar(_) | Schema::Array(_) => 1,
            Schema::Object(fields) => fields.values().map(Schema::leaf_count).sum(),
        }
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Schema::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn parse_node(value: &Value, path: &str) -> Result<Schema> {
    match value {
        Value::String(tag) => ScalarSchema::from_tag(tag)
            .map(Schema::Scalar)
            .ok_or_else(|| unexpected(path, value)),
        Value::Array(items) => match items.as_slice() {
            [element] => Ok(Schema::array(parse_node(element, &element_path(path))?)),
            _ => Err(unexpected(path, value)),
        },
        Value::Object(map) => {
            let mut fields = IndexMap::with_capacity(map.len());
            for (key, child) in map {
                fields.insert(key.clone(), parse_node(child, &key_path(path, key))?);
            }
            Ok(Schema::Object(fields))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Err(unexpected(path, value)),
    }
}

fn unexpected(path: &str, found: &Value) -> SchemaError {
    let path = if path.is_empty() { "(root)" } else { path };
    SchemaError::UnexpectedFieldType {
        path: path.to_string(),
        found: found.to_string(),
    }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn element_path(parent: &str) -> String {
    format!("{parent}[]")
}
