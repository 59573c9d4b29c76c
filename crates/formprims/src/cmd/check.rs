use formprims_schema::{RegistryConfig, SchemaRegistry};
use serde::Serialize;

use crate::cmd::CheckArgs;
use crate::exit::{schema_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct FormInfo {
    name: String,
    leaf_fields: usize,
    schema: serde_json::Value,
}

#[derive(Serialize)]
struct CheckOutput {
    schema_id: &'static str,
    dir: String,
    forms: Vec<FormInfo>,
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = SchemaRegistry::from_directory_with_config(&args.dir, RegistryConfig::default())
        .map_err(|err| schema_error("schema load failed", err))?;

    let forms: Vec<FormInfo> = registry
        .names()
        .into_iter()
        .filter_map(|name| {
            registry.get(name).map(|schema| FormInfo {
                name: name.to_string(),
                leaf_fields: schema.leaf_count(),
                schema: schema.to_json(),
            })
        })
        .collect();

    tracing::info!(dir = %args.dir.display(), count = forms.len(), "schema directory checked");

    let empty = forms.is_empty();
    let out = CheckOutput {
        schema_id: "https://schemas.3leaps.dev/formprims/cli/v1/schema-check.schema.json",
        dir: args.dir.display().to_string(),
        forms,
    };
    print_check(&out, format);

    if empty {
        eprintln!("no *.form.json schemas found in {}", out.dir);
        Ok(FAILURE)
    } else {
        Ok(SUCCESS)
    }
}

fn print_check(out: &CheckOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let rows = out
                .forms
                .iter()
                .map(|form| vec![form.name.clone(), form.leaf_fields.to_string()])
                .collect();
            print_table(&["FORM", "FIELDS"], rows);
        }
        OutputFormat::Pretty => {
            for form in &out.forms {
                println!("{} ({} fields): {}", form.name, form.leaf_fields, form.schema);
            }
        }
    }
}
