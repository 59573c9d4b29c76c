use formprims_field::ScalarField;
use serde::Serialize;

use crate::cmd::{load_form, load_value, FieldsArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{preview, print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct FieldRow {
    path: String,
    kind: &'static str,
    required: bool,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct FieldsOutput {
    schema_id: &'static str,
    fields: Vec<FieldRow>,
}

pub fn run(args: FieldsArgs, format: OutputFormat) -> CliResult<i32> {
    let form = load_form(&args.schema)?;
    let value = load_value(args.value.as_deref())?;
    let tree = form.fields(value);

    let mut rows = Vec::new();
    tree.for_each_scalar(&mut |field: &ScalarField| rows.push(row_for(field)));
    tracing::debug!(count = rows.len(), "collected scalar fields");

    let out = FieldsOutput {
        schema_id: "https://schemas.3leaps.dev/formprims/cli/v1/field-list.schema.json",
        fields: rows,
    };
    print_fields(&out, format);
    Ok(SUCCESS)
}

fn row_for(field: &ScalarField) -> FieldRow {
    FieldRow {
        path: field.path().to_string(),
        kind: field.kind().as_str(),
        required: field.required(),
        value: field.get().to_json(),
    }
}

fn print_fields(out: &FieldsOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let rows = out
                .fields
                .iter()
                .map(|row| {
                    vec![
                        row.path.clone(),
                        row.kind.to_string(),
                        if row.required { "yes" } else { "no" }.to_string(),
                        preview(&row.value.to_string(), 48),
                    ]
                })
                .collect();
            print_table(&["PATH", "TYPE", "REQUIRED", "VALUE"], rows);
        }
        OutputFormat::Pretty => {
            for row in &out.fields {
                let marker = if row.required { "" } else { "?" };
                println!("{}: {}{} = {}", row.path, row.kind, marker, row.value);
            }
        }
    }
}
