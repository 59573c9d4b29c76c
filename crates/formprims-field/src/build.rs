use std::cell::RefCell;
use std::rc::Rc;

use formprims_schema::{ScalarKind, ScalarSchema, Schema};
use formprims_value::coerce::{
    coerce_boolean, coerce_date, coerce_file, coerce_number, coerce_string,
};
use formprims_value::{Map, Value};
use indexmap::IndexMap;
use tracing::warn;

use crate::field::{ArrayField, Field, ObjectField, ScalarField};
use crate::path::FieldPath;

/// Callback a field invokes with its new value after every write.
pub type Setter = Rc<dyn Fn(Value)>;

/// A setter that discards every write.
pub fn noop_setter() -> Setter {
    Rc::new(|_| {})
}

/// Build the field tree for `schema` over the raw backing `value`.
///
/// Building never fails: raw values that do not fit the schema degrade to
/// empty scalars, empty arrays and empty objects.
pub fn build(schema: &Schema, path: FieldPath, value: &Value, set_value: Setter) -> Field {
    match schema {
        Schema::Scalar(scalar) => Field::Scalar(build_scalar(*scalar, path, value, set_value)),
        Schema::Array(element) => {
            let items = value.as_array().cloned().unwrap_or_default();
            Field::Array(ArrayField::new(
                Rc::new(element.as_ref().clone()),
                path,
                items,
                set_value,
            ))
        }
        Schema::Object(fields) => Field::Object(build_object(fields, path, value, set_value)),
    }
}

fn build_scalar(schema: ScalarSchema, path: FieldPath, raw: &Value, setter: Setter) -> ScalarField {
    let value = match schema.kind {
        ScalarKind::String => coerce_string(raw).map(Value::String),
        ScalarKind::Number => coerce_number(raw).map(Value::String),
        ScalarKind::Boolean => coerce_boolean(raw).map(Value::Bool),
        ScalarKind::Date => coerce_date(raw).map(Value::Date),
        ScalarKind::File => coerce_file(raw).map(Value::File),
    };
    ScalarField::new(schema, path, value.unwrap_or(Value::Null), setter)
}

fn build_object(
    fields: &IndexMap<String, Schema>,
    path: FieldPath,
    raw: &Value,
    setter: Setter,
) -> ObjectField {
    let backing = Rc::new(RefCell::new(raw.as_object().cloned().unwrap_or_default()));
    let children = fields
        .iter()
        .map(|(key, schema)| {
            let current = backing.borrow().get(key).cloned().unwrap_or(Value::Null);
            let child_setter = object_key_setter(&backing, key, &setter);
            let child = build(schema, path.key(key.as_str()), &current, child_setter);
            (key.clone(), child)
        })
        .collect();
    ObjectField::new(path, backing, children)
}

fn object_key_setter(backing: &Rc<RefCell<Map>>, key: &str, parent: &Setter) -> Setter {
    let backing = Rc::clone(backing);
    let parent = Rc::clone(parent);
    let key = key.to_string();
    Rc::new(move |value| {
        let snapshot = {
            let mut object = backing.borrow_mut();
            object.insert(key.clone(), value);
            Value::Object(object.clone())
        };
        parent(snapshot);
    })
}

/// Build one sub-field per element of `items`, each writing back into its
/// own slot and re-publishing the whole array through `setter`.
pub(crate) fn build_elements(
    element: &Schema,
    path: &FieldPath,
    items: &Rc<RefCell<Vec<Value>>>,
    setter: &Setter,
) -> Vec<Field> {
    let current = items.borrow().clone();
    current
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let child_setter = array_slot_setter(items, index, path, setter);
            build(element, path.index(index), value, child_setter)
        })
        .collect()
}

fn array_slot_setter(
    items: &Rc<RefCell<Vec<Value>>>,
    index: usize,
    path: &FieldPath,
    parent: &Setter,
) -> Setter {
    let items = Rc::clone(items);
    let parent = Rc::clone(parent);
    let path = path.clone();
    Rc::new(move |value| {
        let snapshot = {
            let mut items = items.borrow_mut();
            match items.get_mut(index) {
                Some(slot) => *slot = value,
                None => {
                    warn!(path = %path, index, "dropping write to removed array element");
                    return;
                }
            }
            Value::Array(items.clone())
        };
        parent(snapshot);
    })
}
