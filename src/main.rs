//! csvpeek CLI - peek at a CSV file's encoding, dialect and schema

use clap::Parser;
use csvpeek::{Column, DecodedReader, Dialect, Peeked, Peeker, Quote, RowReader, TypedValue};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Peek at CSV files: detect encoding, sniff dialect, infer column types.
///
/// Runs the same pipeline an upload goes through: charset detection,
/// dialect sniffing, then a sampling pass that assigns each column the
/// most specific type its values fit.
#[derive(Parser, Debug)]
#[command(name = "csvpeek")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file(s) to peek at
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of data rows to sample for typing (default: 1000)
    #[arg(short = 'n', long, default_value = "1000")]
    sample_rows: usize,

    /// Also convert and print the first N data rows
    #[arg(short = 'p', long, default_value = "0")]
    preview: usize,

    /// Output format: text (default) or json
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Show SQL and API type names for each column
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();

    let mut exit_code = ExitCode::SUCCESS;

    for file in &args.files {
        if let Err(e) = peek_file(file, &args) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn peek_file(path: &Path, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut peeker = Peeker::new();
    peeker.sample_rows(args.sample_rows);

    let file = BufReader::new(File::open(path)?);
    let Peeked {
        dialect,
        columns,
        mut text,
    } = peeker.peek(file, None)?;

    let preview = if args.preview > 0 {
        read_preview(&mut text, &dialect, &columns, args.preview)?
    } else {
        Vec::new()
    };

    let encoding = text.encoding().name();
    match args.format {
        OutputFormat::Text => {
            print_text_output(path, encoding, &dialect, &columns, &preview, args.verbose)
        }
        OutputFormat::Json => {
            print_json_output(path, encoding, &dialect, &columns, &preview, args.verbose)
        }
    }

    Ok(())
}

/// Convert the first `limit` data rows, in file column order.
fn read_preview<R: Read + Seek>(
    text: &mut DecodedReader<R>,
    dialect: &Dialect,
    columns: &[Column],
    limit: usize,
) -> csvpeek::Result<Vec<Vec<TypedValue>>> {
    let mut rows = Vec::with_capacity(limit);
    for row in RowReader::new(text, dialect, columns)?.take(limit) {
        let row = row?;
        let values = columns
            .iter()
            .map(|column| row.get(column).cloned().unwrap_or(TypedValue::Blank))
            .collect();
        rows.push(values);
    }
    Ok(rows)
}

fn print_text_output(
    path: &Path,
    encoding: &str,
    dialect: &Dialect,
    columns: &[Column],
    preview: &[Vec<TypedValue>],
    verbose: bool,
) {
    println!("File: {}", path.display());
    println!("  Encoding: {encoding}");
    println!("  Delimiter: {:?}", dialect.delimiter as char);
    println!("  Quote: {}", dialect.quote);
    println!("  Line terminator: {:?}", dialect.line_terminator);
    println!("  Columns: {}", columns.len());
    for (i, column) in columns.iter().enumerate() {
        if verbose {
            println!(
                "    {}: {} ({}, sql: {}, api: {})",
                i + 1,
                column.name,
                column.column_type,
                column.column_type.sql_type(),
                column.column_type.api_name()
            );
        } else {
            println!("    {}: {}", i + 1, column);
        }
    }

    if !preview.is_empty() {
        println!("  First {} rows:", preview.len());
        for values in preview {
            let cells: Vec<String> = values.iter().map(ToString::to_string).collect();
            println!("    {}", cells.join(","));
        }
    }

    println!();
}

fn print_json_output(
    path: &Path,
    encoding: &str,
    dialect: &Dialect,
    columns: &[Column],
    preview: &[Vec<TypedValue>],
    verbose: bool,
) {
    let quote_str = match dialect.quote {
        Quote::None => "null".to_string(),
        Quote::Some(q) => format!("\"{}\"", json_escape(&(q as char).to_string())),
    };

    print!(
        r#"{{"file":"{}","encoding":"{}","dialect":{{"delimiter":"{}","quote":{},"line_terminator":"{:?}"}}"#,
        json_escape(&path.display().to_string()),
        encoding,
        json_escape(&(dialect.delimiter as char).to_string()),
        quote_str,
        dialect.line_terminator
    );

    print!(r#","columns":["#);
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        if verbose {
            print!(
                r#"{{"name":"{}","type":"{}","sql_type":"{}"}}"#,
                json_escape(&column.name),
                column.column_type.api_name(),
                column.column_type.sql_type()
            );
        } else {
            print!(
                r#"{{"name":"{}","type":"{}"}}"#,
                json_escape(&column.name),
                column.column_type.api_name()
            );
        }
    }
    print!("]");

    if !preview.is_empty() {
        print!(r#","rows":["#);
        for (i, values) in preview.iter().enumerate() {
            if i > 0 {
                print!(",");
            }
            let cells: Vec<String> = values.iter().map(value_json).collect();
            print!("[{}]", cells.join(","));
        }
        print!("]");
    }

    println!("}}");
}

fn value_json(value: &TypedValue) -> String {
    match value {
        TypedValue::Blank => "null".to_string(),
        TypedValue::Integer(n) => n.to_string(),
        TypedValue::Float(x) => x.to_string(),
        TypedValue::Boolean(b) => b.to_string(),
        TypedValue::Date(d) => format!("\"{d}\""),
        TypedValue::Text(s) => format!("\"{}\"", json_escape(s)),
    }
}

fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
