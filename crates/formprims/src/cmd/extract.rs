use formprims_field::{extract_data_with, ExtractConfig, NumberPolicy, Value};
use serde::Serialize;

use crate::cmd::{load_form, load_value, ExtractArgs};
use crate::exit::{field_error, CliResult, SUCCESS};
use crate::output::{preview, print_json, print_json_pretty, print_table, OutputFormat};

#[derive(Serialize)]
struct ExtractOutput<'a> {
    schema_id: &'static str,
    valid: bool,
    data: &'a Value,
}

pub fn run(args: ExtractArgs, format: OutputFormat) -> CliResult<i32> {
    let form = load_form(&args.schema)?;
    let value = load_value(Some(args.value.as_path()))?;
    let fields = form.fields(value);

    let config = ExtractConfig {
        number_policy: if args.reject_lossy_numbers {
            NumberPolicy::RejectLossy
        } else {
            NumberPolicy::BestEffort
        },
    };
    let data = extract_data_with(&fields, &config)
        .map_err(|err| field_error("extraction failed", err))?;

    tracing::info!(schema = %args.schema.display(), "form data is valid");

    let out = ExtractOutput {
        schema_id: "https://schemas.3leaps.dev/formprims/cli/v1/extract-result.schema.json",
        valid: true,
        data: &data,
    };
    print_extract(&out, format);
    Ok(SUCCESS)
}

fn print_extract(out: &ExtractOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Pretty => print_json_pretty(out.data),
        OutputFormat::Table => {
            let rows = match out.data {
                Value::Object(map) => map
                    .iter()
                    .map(|(key, value)| vec![key.clone(), preview(&value.to_string(), 60)])
                    .collect(),
                other => vec![vec!["(root)".to_string(), preview(&other.to_string(), 60)]],
            };
            print_table(&["KEY", "VALUE"], rows);
        }
    }
}
