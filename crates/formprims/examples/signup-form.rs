//! Signup form example.
//!
//! Builds a field tree over in-memory state, edits it the way a UI would,
//! and extracts the validated data.
//!
//! Run: cargo run --example signup-form

use std::cell::RefCell;
use std::rc::Rc;

use formprims::{extract_data, FileBlob, Form, Value};

const SIGNUP_SCHEMA: &str = r#"{
    "email": "string",
    "age": "number?",
    "newsletter": "boolean",
    "avatar": "file?",
    "addresses": [{ "street": "string", "city": "string" }]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let form: Form = SIGNUP_SCHEMA.parse()?;

    // UI state the form reads from and writes into.
    let state = Rc::new(RefCell::new(Value::Null));
    let sink = Rc::clone(&state);
    let mut fields = form.fields_with(Value::Null, move |value| *sink.borrow_mut() = value);

    let root = fields.as_object_mut().ok_or("signup schema is an object")?;
    root["email"].as_scalar().ok_or("email is a scalar")?.set("ada@example.com");
    root["age"].as_scalar().ok_or("age is a scalar")?.set("36");
    root["newsletter"].as_scalar().ok_or("newsletter is a scalar")?.set(true);
    root["avatar"]
        .as_scalar()
        .ok_or("avatar is a scalar")?
        .set(FileBlob::new("ada.png", vec![0x89, b'P', b'N', b'G']).with_mime_type("image/png"));

    let addresses = root["addresses"].as_array_mut().ok_or("addresses is a list")?;
    addresses.push(serde_json::json!({"street": "12 St James's Square"}));

    // The city is still missing, so extraction points at it.
    match extract_data(&fields) {
        Ok(_) => println!("unexpectedly valid"),
        Err(err) => println!("not yet valid: {err}"),
    }

    let root = fields.as_object_mut().ok_or("signup schema is an object")?;
    let address = root["addresses"]
        .as_array_mut()
        .and_then(|list| list.field_mut(0))
        .and_then(|field| field.as_object_mut())
        .ok_or("first address is an object")?;
    address["city"].as_scalar().ok_or("city is a scalar")?.set("London");

    let data = extract_data(&fields)?;
    println!("state: {}", state.borrow());
    println!("data:  {}", serde_json::to_string_pretty(&data.to_json())?);

    Ok(())
}
