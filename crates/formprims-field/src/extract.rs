use formprims_schema::ScalarKind;
use formprims_value::{loses_integer_precision, parse_numeric, Map, Value};
use tracing::debug;

use crate::error::{FieldError, Result};
use crate::field::{Field, ScalarField};

/// How number fields treat integers an `f64` cannot hold exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberPolicy {
    /// Return the nearest `f64`, silently dropping low digits.
    #[default]
    BestEffort,
    /// Fail with [`FieldError::PrecisionLoss`].
    RejectLossy,
}

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractConfig {
    pub number_policy: NumberPolicy,
}

/// Extract the validated data of an object-shaped field tree.
pub fn extract_data(field: &Field) -> Result<Value> {
    extract_data_with(field, &ExtractConfig::default())
}

/// Extract the validated data of an object-shaped field tree with explicit
/// settings.
pub fn extract_data_with(field: &Field, config: &ExtractConfig) -> Result<Value> {
    if !matches!(field, Field::Object(_)) {
        return Err(FieldError::UnexpectedField {
            path: field.path().clone(),
            found: field.kind_name(),
        });
    }
    let data = extract_with(field, config)?;
    debug!("form data extracted");
    Ok(data)
}

/// Extract any field: objects, arrays and scalars alike.
pub fn extract(field: &Field) -> Result<Value> {
    extract_with(field, &ExtractConfig::default())
}

pub fn extract_with(field: &Field, config: &ExtractConfig) -> Result<Value> {
    match field {
        Field::Object(object) => {
            let mut out = Map::with_capacity(object.len());
            for (key, child) in object.iter() {
                out.insert(key.to_string(), extract_with(child, config)?);
            }
            Ok(Value::Object(out))
        }
        Field::Array(array) => array
            .iter()
            .map(|child| extract_with(child, config))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Field::Scalar(scalar) => extract_scalar(scalar, config),
    }
}

fn extract_scalar(field: &ScalarField, config: &ExtractConfig) -> Result<Value> {
    let raw = field.get();
    let extracted = match (field.kind(), &raw) {
        (ScalarKind::Number, Value::String(buffer)) => match parse_numeric(buffer) {
            Some(parsed)
                if config.number_policy == NumberPolicy::RejectLossy
                    && loses_integer_precision(buffer, parsed) =>
            {
                return Err(FieldError::PrecisionLoss {
                    path: field.path().clone(),
                    raw: buffer.clone(),
                });
            }
            parsed => parsed.map(Value::Number),
        },
        (ScalarKind::Number, Value::Number(n)) if n.is_finite() => Some(Value::Number(*n)),
        (ScalarKind::String, Value::Null) => None,
        (ScalarKind::String, _) => Some(raw.clone()),
        (ScalarKind::Boolean, Value::Bool(_))
        | (ScalarKind::Date, Value::Date(_))
        | (ScalarKind::File, Value::File(_)) => Some(raw.clone()),
        _ => None,
    };

    match extracted {
        Some(value) => Ok(value),
        None if field.required() => Err(FieldError::Invalid {
            path: field.path().clone(),
            kind: field.kind(),
            raw,
        }),
        None => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use formprims_schema::Schema;
    use formprims_value::FileBlob;
    use serde_json::json;

    use super::*;
    use crate::build::{build, noop_setter};
    use crate::path::FieldPath;

    fn tree(schema: serde_json::Value, value: Value) -> Field {
        build(
            &Schema::from_json(&schema).unwrap(),
            FieldPath::root(),
            &value,
            noop_setter(),
        )
    }

    #[test]
    fn round_trips_well_typed_data() {
        let born = Utc.with_ymd_and_hms(1815, 12, 10, 0, 0, 0).unwrap();
        let photo = FileBlob::new("ada.png", vec![1u8, 2, 3]).with_mime_type("image/png");
        let mut person = Map::new();
        person.insert("name".into(), Value::from("Ada"));
        person.insert("age".into(), Value::Number(36.0));
        person.insert("active".into(), Value::Bool(false));
        person.insert("born".into(), Value::Date(born));
        person.insert("photo".into(), Value::File(photo));
        person.insert(
            "tags".into(),
            Value::Array(vec![Value::from("math"), Value::from("poetry")]),
        );
        let value = Value::Object(person);

        let fields = tree(
            json!({
                "name": "string",
                "age": "number",
                "active": "boolean",
                "born": "date",
                "photo": "file",
                "tags": ["string"]
            }),
            value.clone(),
        );

        assert_eq!(extract_data(&fields).unwrap(), value);
    }

    #[test]
    fn numbers_come_out_as_numbers() {
        let fields = tree(
            json!({"a": "number", "b": "number?", "c": "number?"}),
            Value::from(json!({"a": "  42.5 ", "b": "12abc", "c": null})),
        );
        assert_eq!(
            extract_data(&fields).unwrap(),
            Value::from(json!({"a": 42.5, "b": null, "c": null}))
        );
    }

    #[test]
    fn required_missing_scalar_reports_full_path() {
        let fields = tree(
            json!({"people": [{"name": "string", "email": "string"}]}),
            Value::from(json!({"people": [{"name": "a", "email": "a@x"}, {"name": "b"}]})),
        );
        let err = extract_data(&fields).unwrap_err();
        match &err {
            FieldError::Invalid { path, kind, raw } => {
                assert_eq!(path.to_string(), "people.1.email");
                assert_eq!(*kind, ScalarKind::String);
                assert_eq!(*raw, Value::Null);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.to_string(), "invalid string value at people.1.email: null");
    }

    #[test]
    fn malformed_required_number_includes_raw_value() {
        let fields = tree(json!({"n": "number"}), Value::from(json!({"n": "12abc"})));
        let err = extract_data(&fields).unwrap_err();
        assert!(matches!(
            &err,
            FieldError::Invalid { raw, .. } if *raw == Value::from("12abc")
        ));
        assert_eq!(err.path().unwrap().to_string(), "n");
    }

    #[test]
    fn first_failure_wins_in_key_order() {
        let fields = tree(json!({"b": "boolean", "a": "date"}), Value::Null);
        let err = extract_data(&fields).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "b");
    }

    #[test]
    fn optional_missing_scalars_extract_as_null() {
        let fields = tree(
            json!({"s": "string?", "b": "boolean?", "d": "date?", "f": "file?"}),
            Value::from(json!({"d": "not a date", "f": "not a file"})),
        );
        assert_eq!(
            extract_data(&fields).unwrap(),
            Value::from(json!({"s": null, "b": null, "d": null, "f": null}))
        );
    }

    #[test]
    fn nullable_parent_object_only_fails_on_required_leaves() {
        let fields = tree(
            json!({"addr": {"street": "string"}}),
            Value::from(json!({"addr": null})),
        );
        let street = fields.as_object().unwrap()["addr"].as_object().unwrap()["street"]
            .as_scalar()
            .unwrap();
        assert_eq!(street.get(), Value::Null);
        assert_eq!(
            extract_data(&fields).unwrap_err().path().unwrap().to_string(),
            "addr.street"
        );

        let optional = tree(
            json!({"addr": {"street": "string?"}}),
            Value::from(json!({"addr": null})),
        );
        assert_eq!(
            extract_data(&optional).unwrap(),
            Value::from(json!({"addr": {"street": null}}))
        );
    }

    #[test]
    fn big_integers_are_best_effort_by_default() {
        let digits = "1230000000000000000000000";
        let fields = tree(json!({"n": "number"}), Value::from(json!({"n": digits})));
        let n = fields.as_object().unwrap()["n"].as_scalar().unwrap();
        assert_eq!(n.get(), Value::from(digits));

        let data = extract_data(&fields).unwrap();
        assert_eq!(data.get("n"), Some(&Value::Number(1.23e24)));

        let strict = ExtractConfig {
            number_policy: NumberPolicy::RejectLossy,
        };
        assert!(matches!(
            extract_data_with(&fields, &strict),
            Err(FieldError::PrecisionLoss { raw, .. }) if raw == digits
        ));
    }

    #[test]
    fn strict_numbers_accept_exact_big_values() {
        let strict = ExtractConfig {
            number_policy: NumberPolicy::RejectLossy,
        };
        for n in [1e20, 9007199254740994.0, 2f64.powi(60), 1e300] {
            let built = tree(json!({"n": "number"}), Value::from(json!({"n": n})));
            assert_eq!(
                extract_data_with(&built, &strict).unwrap(),
                Value::from(json!({"n": n})),
                "built from {n}"
            );

            let typed = tree(json!({"n": "number"}), Value::Null);
            typed.as_object().unwrap()["n"].as_scalar().unwrap().set(n);
            assert_eq!(
                extract_data_with(&typed, &strict).unwrap(),
                Value::from(json!({"n": n})),
                "set to {n}"
            );
        }

        let typed = tree(json!({"n": "number"}), Value::from(json!({"n": "9007199254740993"})));
        assert!(matches!(
            extract_data_with(&typed, &strict),
            Err(FieldError::PrecisionLoss { .. })
        ));
    }

    #[test]
    fn required_date_and_file_reject_other_values() {
        let fields = tree(json!({"born": "date", "cv": "file"}), Value::Null);
        let object = fields.as_object().unwrap();

        object["born"].as_scalar().unwrap().set("yesterday");
        match extract_data(&fields).unwrap_err() {
            FieldError::Invalid { path, kind, raw } => {
                assert_eq!(path.to_string(), "born");
                assert_eq!(kind, ScalarKind::Date);
                assert_eq!(raw, Value::from("yesterday"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let born = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        object["born"].as_scalar().unwrap().set(born);
        match extract_data(&fields).unwrap_err() {
            FieldError::Invalid { path, kind, raw } => {
                assert_eq!(path.to_string(), "cv");
                assert_eq!(kind, ScalarKind::File);
                assert_eq!(raw, Value::Null);
            }
            other => panic!("unexpected error: {other}"),
        }

        object["cv"].as_scalar().unwrap().set("cv.pdf");
        assert!(matches!(
            extract_data(&fields),
            Err(FieldError::Invalid { kind: ScalarKind::File, raw, .. }) if raw == Value::from("cv.pdf")
        ));

        let blob = FileBlob::new("cv.pdf", b"%PDF".to_vec());
        object["cv"].as_scalar().unwrap().set(blob.clone());
        assert_eq!(
            extract_data(&fields).unwrap().get("cv"),
            Some(&Value::File(blob))
        );
    }

    #[test]
    fn values_set_directly_are_validated_too() {
        let fields = tree(json!({"n": "number", "b": "boolean"}), Value::Null);
        let object = fields.as_object().unwrap();
        object["n"].as_scalar().unwrap().set(7);
        object["b"].as_scalar().unwrap().set("true");

        let err = extract_data(&fields).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "b");

        object["b"].as_scalar().unwrap().set(true);
        assert_eq!(
            extract_data(&fields).unwrap(),
            Value::from(json!({"n": 7.0, "b": true}))
        );
    }

    #[test]
    fn extract_data_requires_an_object_root() {
        let array_root = tree(json!(["string"]), Value::from(json!(["x"])));
        assert!(matches!(
            extract_data(&array_root),
            Err(FieldError::UnexpectedField { found: "array", .. })
        ));
        assert_eq!(
            extract(&array_root).unwrap(),
            Value::Array(vec![Value::from("x")])
        );
    }
}
