//! `toon` CLI: encode, decode, and analyze TOON files from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to TOON (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | toon encode
//!
//! # Encode from file to file, pipe-delimited with 4-space indentation
//! toon encode -i data.json -o data.toon --delimiter pipe --indent 4
//!
//! # Decode TOON back to pretty-printed JSON
//! toon decode -i data.toon
//!
//! # Decode to single-line JSON, tolerating length/indent mismatches
//! toon decode --compact --lax -i hand-edited.toon
//!
//! # Show size statistics
//! toon stats -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use toon_core::{DecodeOptions, Delimiter, EncodeOptions};

#[derive(Parser)]
#[command(
    name = "toon",
    version,
    about = "TOON (Token-Oriented Object Notation) CLI",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON to TOON format
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Spaces per indentation level
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..=16))]
        indent: u16,
        /// Delimiter for inline arrays and table rows: comma, tab or pipe
        #[arg(long, default_value_t = Delimiter::Comma)]
        delimiter: Delimiter,
    },
    /// Decode TOON back to JSON format
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Spaces per indentation level expected in the input
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..=16))]
        indent: u16,
        /// Emit single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
        /// Accept array length and indentation mismatches
        #[arg(long)]
        lax: bool,
    },
    /// Show encoding statistics (sizes, reduction)
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            indent,
            delimiter,
        } => {
            let json = read_input(input.as_deref())?;
            let options = EncodeOptions {
                indent: usize::from(indent),
                delimiter,
            };
            let toon = toon_core::encode_json_with(&json, &options)
                .context("Failed to encode JSON to TOON")?;
            write_output(output.as_deref(), &toon)?;
        }
        Commands::Decode {
            input,
            output,
            indent,
            compact,
            lax,
        } => {
            let toon = read_input(input.as_deref())?;
            let options = DecodeOptions {
                indent: usize::from(indent),
                strict: !lax,
            };
            let value =
                toon_core::decode_with(&toon, &options).context("Failed to decode TOON to JSON")?;
            let json = if compact {
                serde_json::to_string(&value)?
            } else {
                serde_json::to_string_pretty(&value)?
            };
            write_output(output.as_deref(), &json)?;
        }
        Commands::Stats { input } => {
            let json = read_input(input.as_deref())?;
            let toon = toon_core::encode_json(&json).context("Failed to encode JSON to TOON")?;
            let json_bytes = json.trim_end().len();
            let toon_bytes = toon.len();
            let ratio = if json_bytes > 0 {
                (1.0 - (toon_bytes as f64 / json_bytes as f64)) * 100.0
            } else {
                0.0
            };
            println!("JSON size:  {} bytes", json_bytes);
            println!("TOON size:  {} bytes", toon_bytes);
            println!("Reduction:  {:.1}%", ratio);
        }
    }

    Ok(())
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
