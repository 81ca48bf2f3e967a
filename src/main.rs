//! Tabula - spreadsheet cell engine, command-line front end

mod config;

use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;
use tabula_core::Document;
use tabula_core::storage::write_markdown;
use tabula_engine::engine::format_number;

fn print_usage() {
    eprintln!("Usage: tabula [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Sheet file to open (row,col,content lines)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <REF=TEXT>      Set a cell, e.g. -s A3==SUM(A1:A2) (can be repeated)");
    eprintln!("  -c, --command <EXPR>      Evaluate an expression against the sheet and print it");
    eprintln!("  -w, --write               Save the sheet back to FILE");
    eprintln!("  -o, --output <FILE>       Export to markdown file");
    eprintln!("  --config <FILE>           Load settings from a TOML file");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default, PartialEq)]
struct Options {
    file_path: Option<PathBuf>,
    edits: Vec<(String, String)>,
    command: Option<String>,
    write: bool,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    no_config: bool,
}

/// Parse command-line arguments. Returns None when help was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "-s" | "--set" => {
                i += 1;
                let Some(edit) = args.get(i) else {
                    bail!("--set requires REF=TEXT");
                };
                let Some((name, text)) = edit.split_once('=') else {
                    bail!("--set expects REF=TEXT, got: {}", edit);
                };
                opts.edits.push((name.to_string(), text.to_string()));
            }
            "-c" | "--command" => {
                i += 1;
                let Some(expr) = args.get(i) else {
                    bail!("--command requires an expression");
                };
                opts.command = Some(expr.to_string());
            }
            "-w" | "--write" => opts.write = true,
            "-o" | "--output" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--output requires a file path");
                };
                opts.output_file = Some(PathBuf::from(path));
            }
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--config requires a file path");
                };
                opts.config_file = Some(PathBuf::from(path));
            }
            "--no-config" => opts.no_config = true,
            arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
            arg => {
                if opts.file_path.is_some() {
                    bail!("Unexpected argument: {}", arg);
                }
                opts.file_path = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    if opts.write && opts.file_path.is_none() {
        bail!("--write requires a FILE");
    }
    Ok(Some(opts))
}

fn run(opts: Options) -> Result<()> {
    let (config, warnings) = if opts.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(opts.config_file.as_ref())
    };
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut doc = Document::with_file(opts.file_path.clone(), config.size)?;
    doc.column_width = config.column_width;

    for (name, text) in &opts.edits {
        let cell_ref = doc
            .set_cell_by_name(name, text)
            .with_context(|| format!("cannot set {}", name))?;
        if let Some(status) = doc.take_status() {
            eprintln!("Warning: {}: {}", cell_ref, status);
        }
    }

    if opts.write {
        let path = doc.save_file()?;
        eprintln!("Saved {}", path.display());
    }

    if let Some(expr) = &opts.command {
        println!("{}", format_number(doc.evaluate_expression(expr)));
    }

    if let Some(output_path) = &opts.output_file {
        write_markdown(output_path, &doc)
            .with_context(|| format!("cannot write {}", output_path.display()))?;
        eprintln!("Exported to {}", output_path.display());
    }

    if opts.command.is_none() && opts.output_file.is_none() {
        for (cell_ref, _) in doc.sheet.non_empty() {
            println!("{}\t{}", cell_ref, doc.cell_display(cell_ref));
        }
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let opts = match parse_args(&args) {
        Ok(Some(opts)) => opts,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(opts) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("tabula")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let opts = parse_args(&args(&["-s", "A3==SUM(A1:A2)", "-w", "sheet.tab"]))
            .unwrap()
            .unwrap();
        assert_eq!(opts.file_path, Some(PathBuf::from("sheet.tab")));
        assert_eq!(opts.edits, vec![("A3".to_string(), "=SUM(A1:A2)".to_string())]);
        assert!(opts.write);
    }

    #[test]
    fn test_parse_args_help() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--set"])).is_err());
        assert!(parse_args(&args(&["--set", "A1"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["a.tab", "b.tab"])).is_err());
        assert!(parse_args(&args(&["-w"])).is_err());
    }
}
