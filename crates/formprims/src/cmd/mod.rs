use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use formprims_field::{Form, Value};

use crate::exit::{field_error, io_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod check;
pub mod extract;
pub mod fields;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a form over a value file and print the validated data.
    Extract(ExtractArgs),
    /// List every scalar field of a form with its current value.
    Fields(FieldsArgs),
    /// Load a schema directory and list the forms it defines.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Extract(args) => extract::run(args, format),
        Command::Fields(args) => fields::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Form schema file (JSON).
    pub schema: PathBuf,
    /// Backing value file (JSON).
    pub value: PathBuf,
    /// Fail on integers too large to represent exactly instead of rounding.
    #[arg(long)]
    pub reject_lossy_numbers: bool,
}

#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Form schema file (JSON).
    pub schema: PathBuf,
    /// Backing value file (JSON). Defaults to an empty form.
    pub value: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory containing `<name>.form.json` schemas.
    #[arg(env = "FORMPRIMS_SCHEMA_DIR")]
    pub dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read and parse a JSON document from disk.
pub(crate) fn read_json(path: &Path) -> CliResult<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|err| io_error(path, err))?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{}: invalid JSON: {err}", path.display()),
        )
    })
}

pub(crate) fn load_form(path: &Path) -> CliResult<Form> {
    let schema = read_json(path)?;
    Form::from_json(&schema).map_err(|err| field_error("schema rejected", err))
}

pub(crate) fn load_value(path: Option<&Path>) -> CliResult<Value> {
    match path {
        Some(path) => read_json(path).map(Value::from),
        None => Ok(Value::Null),
    }
}
