use std::cell::RefCell;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use formprims_schema::{ScalarKind, ScalarSchema, Schema};
use formprims_value::{Map, Value};
use indexmap::IndexMap;
use tracing::trace;

use crate::build::{build_elements, Setter};
use crate::path::FieldPath;

/// A node of a field tree.
#[derive(Debug)]
pub enum Field {
    Scalar(ScalarField),
    Array(ArrayField),
    Object(ObjectField),
}

impl Field {
    pub fn path(&self) -> &FieldPath {
        match self {
            Field::Scalar(field) => field.path(),
            Field::Array(field) => field.path(),
            Field::Object(field) => field.path(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Field::Scalar(_) => "scalar",
            Field::Array(_) => "array",
            Field::Object(_) => "object",
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarField> {
        match self {
            Field::Scalar(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayField> {
        match self {
            Field::Array(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayField> {
        match self {
            Field::Array(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectField> {
        match self {
            Field::Object(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectField> {
        match self {
            Field::Object(field) => Some(field),
            _ => None,
        }
    }

    /// Visit every scalar field depth-first, objects in key order and
    /// arrays in index order.
    pub fn for_each_scalar(&self, f: &mut impl FnMut(&ScalarField)) {
        match self {
            Field::Scalar(field) => f(field),
            Field::Array(field) => {
                for child in field {
                    child.for_each_scalar(&mut *f);
                }
            }
            Field::Object(field) => {
                for child in field.values() {
                    child.for_each_scalar(&mut *f);
                }
            }
        }
    }
}

/// A leaf accessor: holds the edit-buffer value of one scalar.
pub struct ScalarField {
    schema: ScalarSchema,
    path: FieldPath,
    value: RefCell<Value>,
    setter: Setter,
}

impl ScalarField {
    pub(crate) fn new(schema: ScalarSchema, path: FieldPath, value: Value, setter: Setter) -> Self {
        Self {
            schema,
            path,
            value: RefCell::new(value),
            setter,
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.schema.kind
    }

    pub fn required(&self) -> bool {
        self.schema.is_required()
    }

    pub fn schema(&self) -> ScalarSchema {
        self.schema
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Current value, `Value::Null` when empty. Has no side effects.
    pub fn get(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Store `value`, notify the owner once, and hand the value back.
    pub fn set(&self, value: impl Into<Value>) -> Value {
        let value = value.into();
        *self.value.borrow_mut() = value.clone();
        trace!(path = %self.path, "scalar field set");
        (self.setter)(value.clone());
        value
    }
}

impl fmt::Debug for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarField")
            .field("schema", &self.schema)
            .field("path", &self.path)
            .field("value", &self.value.borrow())
            .finish_non_exhaustive()
    }
}

/// A list accessor over a shared backing array.
///
/// Element sub-fields are rebuilt from the backing array after every
/// structural mutation, so their paths always match their indices.
pub struct ArrayField {
    element: Rc<Schema>,
    path: FieldPath,
    items: Rc<RefCell<Vec<Value>>>,
    setter: Setter,
    fields: Vec<Field>,
}

impl ArrayField {
    pub(crate) fn new(element: Rc<Schema>, path: FieldPath, items: Vec<Value>, setter: Setter) -> Self {
        let mut field = Self {
            element,
            path,
            items: Rc::new(RefCell::new(items)),
            setter,
            fields: Vec::new(),
        };
        field.rebuild();
        field
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn element_schema(&self) -> &Schema {
        &self.element
    }

    /// Current backing array. Has no side effects.
    pub fn get(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Replace the whole array, notify the owner once, and hand it back.
    pub fn set(&mut self, items: Vec<Value>) -> Vec<Value> {
        *self.items.borrow_mut() = items.clone();
        self.commit();
        items
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut Field> {
        self.fields.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Field> {
        self.fields.iter_mut()
    }

    /// Map over the element sub-fields with their indices.
    pub fn map<T>(&self, mut f: impl FnMut(&Field, usize) -> T) -> Vec<T> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| f(field, index))
            .collect()
    }

    pub fn for_each(&self, mut f: impl FnMut(&Field, usize)) {
        for (index, field) in self.fields.iter().enumerate() {
            f(field, index);
        }
    }

    /// Append `value`; returns the new length.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        let len = {
            let mut items = self.items.borrow_mut();
            items.push(value.into());
            items.len()
        };
        self.commit();
        len
    }

    /// Remove the last element. An empty array still notifies the owner.
    pub fn pop(&mut self) -> Option<Value> {
        let removed = self.items.borrow_mut().pop();
        self.commit();
        removed
    }

    /// Remove the first element. An empty array still notifies the owner.
    pub fn shift(&mut self) -> Option<Value> {
        let removed = {
            let mut items = self.items.borrow_mut();
            (!items.is_empty()).then(|| items.remove(0))
        };
        self.commit();
        removed
    }

    /// Prepend `value`; returns the new length.
    pub fn unshift(&mut self, value: impl Into<Value>) -> usize {
        let len = {
            let mut items = self.items.borrow_mut();
            items.insert(0, value.into());
            items.len()
        };
        self.commit();
        len
    }

    /// Remove `delete_count` elements at `start` and insert `insert` in their
    /// place; returns the removed elements. Both bounds are clamped.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        insert: impl IntoIterator<Item = Value>,
    ) -> Vec<Value> {
        let removed = {
            let mut items = self.items.borrow_mut();
            let start = start.min(items.len());
            let end = start.saturating_add(delete_count).min(items.len());
            items.splice(start..end, insert).collect()
        };
        self.commit();
        removed
    }

    fn commit(&mut self) {
        let snapshot = Value::Array(self.items.borrow().clone());
        (self.setter)(snapshot);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.fields = build_elements(&self.element, &self.path, &self.items, &self.setter);
        trace!(path = %self.path, len = self.fields.len(), "array sub-fields rebuilt");
    }
}

impl fmt::Debug for ArrayField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayField")
            .field("path", &self.path)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl Index<usize> for ArrayField {
    type Output = Field;

    fn index(&self, index: usize) -> &Field {
        &self.fields[index]
    }
}

impl IndexMut<usize> for ArrayField {
    fn index_mut(&mut self, index: usize) -> &mut Field {
        &mut self.fields[index]
    }
}

impl<'a> IntoIterator for &'a ArrayField {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// A key to sub-field mapping over a shared backing object.
pub struct ObjectField {
    path: FieldPath,
    backing: Rc<RefCell<Map>>,
    fields: IndexMap<String, Field>,
}

impl ObjectField {
    pub(crate) fn new(path: FieldPath, backing: Rc<RefCell<Map>>, fields: IndexMap<String, Field>) -> Self {
        Self {
            path,
            backing,
            fields,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// The backing object as last written through this field.
    pub fn snapshot(&self) -> Value {
        Value::Object(self.backing.borrow().clone())
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for ObjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectField")
            .field("path", &self.path)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// # Panics
///
/// Panics when the schema has no field named `key`; use
/// [`ObjectField::field`] for a fallible lookup.
impl Index<&str> for ObjectField {
    type Output = Field;

    fn index(&self, key: &str) -> &Field {
        match self.fields.get(key) {
            Some(field) => field,
            None => panic!("no field {key:?} at {}", self.path),
        }
    }
}

/// # Panics
///
/// Panics when the schema has no field named `key`; use
/// [`ObjectField::field_mut`] for a fallible lookup.
impl IndexMut<&str> for ObjectField {
    fn index_mut(&mut self, key: &str) -> &mut Field {
        if !self.fields.contains_key(key) {
            panic!("no field {key:?} at {}", self.path);
        }
        &mut self.fields[key]
    }
}
