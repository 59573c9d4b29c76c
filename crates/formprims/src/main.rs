mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "formprims", version, about = "Typed form state CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extract_subcommand() {
        let cli = Cli::try_parse_from([
            "formprims",
            "extract",
            "signup.form.json",
            "state.json",
            "--reject-lossy-numbers",
        ])
        .expect("extract args should parse");

        assert!(matches!(
            cli.command,
            Command::Extract(ref args) if args.reject_lossy_numbers
        ));
    }

    #[test]
    fn extract_requires_a_value_file() {
        let err = Cli::try_parse_from(["formprims", "extract", "signup.form.json"])
            .expect_err("missing value path should fail");

        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "formprims",
            "fields",
            "a.json",
            "b.json",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("fields args should parse");
        assert!(matches!(cli.command, Command::Fields(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::try_parse_from(["formprims", "check", "./schemas"])
            .expect("check args should parse");
        assert!(matches!(cli.command, Command::Check(_)));
    }
}
