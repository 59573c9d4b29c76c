use std::rc::Rc;
use std::str::FromStr;

use formprims_schema::{Schema, SchemaRegistry};
use formprims_value::Value;
use tracing::debug;

use crate::build::{build, noop_setter};
use crate::error::{FieldError, Result};
use crate::field::Field;
use crate::path::FieldPath;

/// A form factory: a schema that builds fresh field trees on demand.
///
/// Each call to [`Form::fields`] or [`Form::fields_with`] builds a new tree
/// from the backing value supplied; trees share no state with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    schema: Schema,
}

impl Form {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Parse the schema from its JSON form.
    pub fn from_json(schema: &serde_json::Value) -> Result<Self> {
        Ok(Self::new(Schema::from_json(schema)?))
    }

    /// Resolve a named schema from a registry.
    pub fn from_registry(registry: &SchemaRegistry, name: &str) -> Result<Self> {
        Ok(Self::new(registry.require(name)?.clone()))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Build a field tree whose writes are discarded.
    pub fn fields(&self, initial: impl Into<Value>) -> Field {
        self.build_tree(initial.into(), noop_setter())
    }

    /// Build a field tree that reports every write to `on_change` with the
    /// updated backing value.
    pub fn fields_with(&self, initial: impl Into<Value>, on_change: impl Fn(Value) + 'static) -> Field {
        self.build_tree(initial.into(), Rc::new(on_change))
    }

    fn build_tree(&self, initial: Value, setter: crate::build::Setter) -> Field {
        debug!(root = initial.kind_name(), "building form field tree");
        build(&self.schema, FieldPath::root(), &initial, setter)
    }
}

impl From<Schema> for Form {
    fn from(schema: Schema) -> Self {
        Self::new(schema)
    }
}

impl FromStr for Form {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::new(s.parse::<Schema>()?))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use formprims_schema::{ScalarKind, SchemaError};
    use serde_json::json;

    use super::*;
    use crate::extract::extract_data;

    #[test]
    fn tags_push_extends_the_backing_array() {
        let form: Form = r#"{"tags": ["string"]}"#.parse().unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let mut fields = form.fields_with(json!({"tags": ["a", "b"]}), move |value| {
            sink.borrow_mut().push(value)
        });

        let tags = fields.as_object_mut().unwrap()["tags"].as_array_mut().unwrap();
        assert_eq!(tags.push("c"), 3);
        assert_eq!(
            tags.get(),
            vec![Value::from("a"), Value::from("b"), Value::from("c")]
        );
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[2].path().to_string(), "tags.2");
        assert_eq!(
            *changes.borrow(),
            vec![Value::from(json!({"tags": ["a", "b", "c"]}))]
        );
    }

    #[test]
    fn array_mutations_follow_sequence_semantics() {
        let form = Form::new(Schema::object([(
            "xs",
            Schema::array(Schema::required(ScalarKind::Number)),
        )]));
        let calls = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&calls);
        let mut fields = form.fields_with(json!({"xs": [1, 2, 3]}), move |_| {
            *counter.borrow_mut() += 1
        });
        let xs = fields.as_object_mut().unwrap()["xs"].as_array_mut().unwrap();

        assert_eq!(xs.pop(), Some(Value::Number(3.0)));
        assert_eq!(xs.shift(), Some(Value::Number(1.0)));
        assert_eq!(xs.unshift(0), 2);
        assert_eq!(
            xs.splice(1, 5, [Value::Number(8.0), Value::Number(9.0)]),
            vec![Value::Number(2.0)]
        );
        assert_eq!(
            xs.get(),
            vec![Value::Number(0.0), Value::Number(8.0), Value::Number(9.0)]
        );
        assert_eq!(xs.splice(10, 1, []), Vec::<Value>::new());
        assert_eq!(*calls.borrow(), 5);

        let paths = xs.map(|field, index| (field.path().to_string(), index));
        assert_eq!(
            paths,
            vec![
                ("xs.0".to_string(), 0),
                ("xs.1".to_string(), 1),
                ("xs.2".to_string(), 2)
            ]
        );

        xs.set(vec![]);
        assert!(xs.is_empty());
        assert_eq!(xs.pop(), None);
        assert_eq!(xs.shift(), None);
        assert_eq!(*calls.borrow(), 8);
    }

    #[test]
    fn rebuilt_elements_write_to_their_new_slots() {
        let form: Form = r#"{"names": ["string"]}"#.parse().unwrap();
        let latest = Rc::new(RefCell::new(Value::Null));
        let sink = Rc::clone(&latest);
        let mut fields = form.fields_with(json!({"names": ["b", "c"]}), move |value| {
            *sink.borrow_mut() = value
        });
        let names = fields.as_object_mut().unwrap()["names"].as_array_mut().unwrap();

        names.unshift("a");
        names[2].as_scalar().unwrap().set("z");

        assert_eq!(*latest.borrow(), Value::from(json!({"names": ["a", "b", "z"]})));
        let collected: Vec<Value> = names
            .iter()
            .map(|field| field.as_scalar().unwrap().get())
            .collect();
        assert_eq!(collected, names.get());
    }

    #[test]
    fn for_each_visits_elements_in_order() {
        let form: Form = r#"["string?"]"#.parse().unwrap();
        let fields = form.fields(json!(["x", 1, true]));
        let mut seen = Vec::new();
        fields
            .as_array()
            .unwrap()
            .for_each(|field, index| seen.push((index, field.as_scalar().unwrap().get())));
        assert_eq!(
            seen,
            vec![
                (0, Value::from("x")),
                (1, Value::from("1")),
                (2, Value::Null)
            ]
        );
    }

    #[test]
    fn each_call_builds_an_independent_tree() {
        let form: Form = r#"{"name": "string"}"#.parse().unwrap();
        let first = form.fields(json!({"name": "a"}));
        let second = form.fields(json!({"name": "a"}));

        first.as_object().unwrap()["name"].as_scalar().unwrap().set("changed");
        assert_eq!(
            second.as_object().unwrap()["name"].as_scalar().unwrap().get(),
            Value::from("a")
        );
        assert_eq!(
            extract_data(&first).unwrap(),
            Value::from(json!({"name": "changed"}))
        );
    }

    #[test]
    fn schema_errors_surface_from_the_factory() {
        assert!(matches!(
            r#"{"x": "decimal"}"#.parse::<Form>(),
            Err(FieldError::Schema(SchemaError::UnexpectedFieldType { .. }))
        ));
        assert!(matches!(
            Form::from_json(&json!({"x": ["a", "b"]})),
            Err(FieldError::Schema(_))
        ));
    }

    #[test]
    fn resolves_forms_from_a_registry() {
        let registry =
            SchemaRegistry::from_embedded(&[("login", r#"{"user":"string","remember":"boolean?"}"#)])
                .unwrap();
        let form = Form::from_registry(&registry, "login").unwrap();
        let fields = form.fields(json!({"user": "ada"}));
        assert_eq!(
            extract_data(&fields).unwrap(),
            Value::from(json!({"user": "ada", "remember": null}))
        );

        assert!(matches!(
            Form::from_registry(&registry, "signup"),
            Err(FieldError::Schema(SchemaError::NoSchema(_)))
        ));
    }
}
