use anyhow::{bail, Context, Result};
use fieldtable::{DiskLines, QuoteMode, Table, TableOptions, TracingObserver};
use glob::glob;
use std::{env, path::Path, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: table_inspect <GLOB> [--config FILE] [--delimiter C] [--header] [--strip] [--strict] [--column NAME|INDEX]";

/// Parsed command line.
struct Args {
    pattern: String,
    options: TableOptions,
    column: Option<String>,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut pattern = None;
    let mut options = TableOptions::default();
    let mut column = None;

    let mut it = raw.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            // replaces any flags seen before it
            "--config" => {
                let file = it.next().context("--config needs a file")?;
                options = TableOptions::from_path(file)?;
            }
            "--delimiter" => {
                let value = it.next().context("--delimiter needs a character")?;
                options.delimiter = match value.as_str() {
                    "\\t" | "tab" => '\t',
                    v => {
                        let mut chars = v.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => c,
                            _ => bail!("delimiter must be a single character, got {:?}", v),
                        }
                    }
                };
            }
            "--header" => options.has_header_row = true,
            "--strip" => options.quotes = QuoteMode::Strip,
            "--strict" => options.strict = true,
            "--column" => {
                column = Some(it.next().context("--column needs a name or index")?.clone());
            }
            other if other.starts_with("--") => bail!("unknown flag {}", other),
            other => {
                if pattern.replace(other.to_string()).is_some() {
                    bail!("only one GLOB may be given");
                }
            }
        }
    }

    options.validate()?;
    Ok(Args {
        pattern: pattern.context("missing GLOB")?,
        options,
        column,
    })
}

fn inspect(path: &Path, args: &Args) -> Result<()> {
    let table = Table::load(path, args.options, &DiskLines, &TracingObserver)?;

    println!("=== {} ===", path.display());
    println!("Rows:    {}", table.row_count());
    match table.headers() {
        Some(h) => println!("Headers: {}", h.join(", ")),
        None => println!("Headers: <none>"),
    }

    if let Some(col) = &args.column {
        // numeric means positional unless it is also a header name
        let values = match col.parse::<usize>() {
            Ok(idx) if table.column_index(col).is_err() => table.column(idx)?,
            _ => table.column_by_name(col)?,
        };
        println!("--- column {} ---", col);
        for (row, value) in values.iter().enumerate() {
            println!("{:>6}  {}", row, value);
        }
    }
    println!();
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {:#}\n{}", e, USAGE);
            exit(2);
        }
    };

    let entries = match glob(&args.pattern) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: invalid pattern {:?}: {}", args.pattern, e);
            exit(2);
        }
    };

    let mut seen = 0usize;
    let mut failed = 0usize;
    for entry in entries {
        let path = match entry {
            Ok(p) if p.is_file() => p,
            Ok(_) => continue,
            Err(e) => {
                error!("cannot read glob entry: {}", e);
                failed += 1;
                continue;
            }
        };
        seen += 1;
        if let Err(e) = inspect(&path, &args) {
            error!(path = %path.display(), "{:#}", e);
            failed += 1;
        }
    }

    info!(seen, failed, "done");
    if seen == 0 {
        eprintln!("no files match {:?}", args.pattern);
        exit(1);
    }
    if failed > 0 {
        exit(1);
    }
}
