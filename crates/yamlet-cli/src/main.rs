//! `yamlet` CLI: convert, format and check yamlet files from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # yamlet → pretty JSON (stdin → stdout)
//! cat config.yml | yamlet to-json
//!
//! # Every document of a multi-document file, as one compact JSON array
//! yamlet to-json -i stream.yml --all --compact
//!
//! # JSON → yamlet
//! yamlet from-json -i data.json -o data.yml
//!
//! # Re-emit in normalized layout (anchors resolved, comments dropped)
//! yamlet fmt -i messy.yml
//!
//! # Parse files and report the first error in each
//! yamlet check a.yml b.yml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::process;
use yamlet_core::{Document, Value};

#[derive(Parser)]
#[command(
    name = "yamlet",
    version,
    about = "yamlet markup CLI: convert, format and check files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert yamlet to JSON
    ToJson {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Emit every document as a JSON array instead of only the first
        #[arg(long)]
        all: bool,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Convert JSON to yamlet
    FromJson {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Parse yamlet and write it back in normalized form
    Fmt {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Parse each file and report whether it is valid
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ToJson {
            input,
            output,
            all,
            compact,
        } => {
            let text = read_input(input.as_deref())?;
            let doc = parse_source(&text, input.as_deref())?;
            let json = if all {
                serde_json::Value::Array(doc.to_values().iter().map(Value::to_json).collect())
            } else {
                doc.to_values()
                    .first()
                    .map_or(serde_json::Value::Null, Value::to_json)
            };
            let mut rendered = if compact {
                serde_json::to_string(&json)?
            } else {
                serde_json::to_string_pretty(&json)?
            };
            rendered.push('\n');
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::FromJson { input, output } => {
            let json = read_input(input.as_deref())?;
            let value = Value::from_json_str(&json).context("Failed to parse JSON input")?;
            let text = yamlet_core::to_string(&value)
                .context("Failed to write JSON as yamlet")?;
            write_output(output.as_deref(), &text)?;
        }
        Commands::Fmt { input, output } => {
            let text = read_input(input.as_deref())?;
            let doc = parse_source(&text, input.as_deref())?;
            let mut buf = Vec::new();
            doc.write_to(&mut buf).context("Failed to write normalized output")?;
            let formatted = String::from_utf8(buf).context("Writer produced invalid UTF-8")?;
            write_output(output.as_deref(), &formatted)?;
        }
        Commands::Check { files } => {
            let mut failures = 0;
            for path in &files {
                match yamlet_core::read_file(path) {
                    Ok(doc) => {
                        let n = doc.len();
                        let noun = if n == 1 { "document" } else { "documents" };
                        println!("{path}: ok ({n} {noun})");
                    }
                    Err(e) => {
                        eprintln!("{path}: {e}");
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                eprintln!("{failures} of {} file(s) failed", files.len());
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn parse_source(text: &str, path: Option<&str>) -> Result<Document> {
    yamlet_core::parse(text)
        .with_context(|| format!("Failed to parse {}", path.unwrap_or("<stdin>")))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
