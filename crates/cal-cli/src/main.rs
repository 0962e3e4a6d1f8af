use anyhow::{Context, Result};
use cal_parse::{parse_str, ParseError};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Maximum source size in bytes (1MB)
const MAX_SOURCE_SIZE: usize = 1_000_000;

#[derive(Parser, Debug)]
#[command(name = "cal")]
#[command(about = "Check CAL programs for syntax errors")]
struct Cli {
    /// Path to a .cal source file; standard input is read when omitted
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Pretty)]
    format: Format,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Pretty,
    Json,
}

/// Machine-readable outcome for `--format json`.
#[derive(Serialize, Debug)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report<'a> {
    Ok,
    Error { error: &'a ParseError },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (name, src) = match &cli.file {
        Some(path) => (path.display().to_string(), read_file(path)?),
        None => {
            if cli.format == Format::Pretty {
                println!("Reading from standard input...");
            }
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read standard input")?;
            ("<stdin>".to_string(), buf)
        }
    };

    if src.len() > MAX_SOURCE_SIZE {
        eprintln!(
            "Error: source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
        std::process::exit(1);
    }

    let result = parse_str(&name, &src);
    tracing::info!(file = %name, ok = result.is_ok(), "parse finished");

    match cli.format {
        Format::Pretty => print_pretty(&result),
        Format::Json => print_json(&result)?,
    }
    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(src) => Ok(src),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("File {} not found.", path.display());
            std::process::exit(1);
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn print_pretty(result: &Result<(), ParseError>) {
    match result {
        Ok(()) => println!("Parsed successfully."),
        Err(e) => {
            println!("{e}");
            println!("Encountered errors during parse.");
        }
    }
}

fn print_json(result: &Result<(), ParseError>) -> Result<()> {
    println!("{}", serde_json::to_string(&report(result))?);
    Ok(())
}

fn report(result: &Result<(), ParseError>) -> Report<'_> {
    match result {
        Ok(()) => Report::Ok,
        Err(error) => Report::Error { error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_report_is_a_bare_status() {
        let v = serde_json::to_value(report(&Ok(()))).unwrap();
        assert_eq!(v, json!({ "status": "ok" }));
    }

    #[test]
    fn syntax_report_carries_token_and_expected_kinds() {
        let result = parse_str("<mem>", "main begin end skip");
        let v = serde_json::to_value(report(&result)).unwrap();
        assert_eq!(
            v,
            json!({
                "status": "error",
                "error": {
                    "type": "syntax",
                    "unexpected": {
                        "kind": "skip",
                        "lexeme": "skip",
                        "position": { "line": 1, "column": 16 }
                    },
                    "expected": ["eof"]
                }
            })
        );
    }

    #[test]
    fn lexical_report_names_the_character() {
        let result = parse_str("<mem>", "main begin ? end");
        let v = serde_json::to_value(report(&result)).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["error"]["type"], "lex");
        assert_eq!(v["error"]["kind"], "unexpected_char");
        assert_eq!(v["error"]["ch"], "?");
        assert_eq!(v["error"]["position"]["column"], 12);
    }

    #[test]
    fn cli_accepts_one_optional_file() {
        let cli = Cli::try_parse_from(["cal"]).unwrap();
        assert!(cli.file.is_none());
        assert_eq!(cli.format, Format::Pretty);

        let cli = Cli::try_parse_from(["cal", "prog.cal", "--format", "json"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("prog.cal")));
        assert_eq!(cli.format, Format::Json);

        assert!(Cli::try_parse_from(["cal", "a.cal", "b.cal"]).is_err());
    }
}
