use crate::cli::{Cli, Commands, FormatArg};
use crate::erd::{self, ErdFormat, ErdReport, ErrorReport};
use crate::schema::{ERD_SAMPLE_LIMIT, SCHEMA_SAMPLE_LIMIT};
use crate::source::JsonDirSource;
use crate::utils::config::{self, Config};
use clap::CommandFactory;
use clap_complete::generate;
use std::fs;
use std::io;
use std::path::Path;

/// Run the CLI logic in-process.
///
/// Returns an exit code (0 = success).
///
/// # Panics
/// May panic if report serialization to JSON fails, which only happens on a
/// bug in the report types.
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            let mut out = io::stdout();
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::Erd { path, config, collections, format, limit, out, quiet } => {
            let cfg = resolve_config(config.as_deref(), &path);
            let limit = limit
                .or_else(|| cfg.as_ref().and_then(|c| c.sample.as_ref()?.erd_limit))
                .unwrap_or(ERD_SAMPLE_LIMIT);
            // Explicit flags win; config fills in the rest.
            let format = format
                .or_else(|| {
                    let name = cfg.as_ref()?.output.as_ref()?.default_format.as_deref()?;
                    match name {
                        "json" => Some(FormatArg::Json),
                        "mermaid" => Some(FormatArg::Mermaid),
                        _ => None,
                    }
                })
                .unwrap_or(FormatArg::Mermaid);
            let erd_format = match format {
                FormatArg::Mermaid => ErdFormat::Mermaid,
                FormatArg::Json => ErdFormat::Json,
            };

            let source = JsonDirSource::new(&path);
            let selection = selection(&collections);
            match erd::generate(&source, selection, erd_format, limit) {
                Ok(report) => {
                    print_warnings(&report, quiet);
                    let text = match erd_format {
                        ErdFormat::Mermaid => report.diagram.clone().unwrap_or_default(),
                        ErdFormat::Json => serialize_report(&report),
                    };
                    write_output(out.as_deref(), &text)
                }
                Err(e) => fail(erd_format, &format!("Failed to generate ERD: {e}")),
            }
        }
        Commands::Schema { path, config, collections, limit, out, quiet } => {
            let cfg = resolve_config(config.as_deref(), &path);
            let limit = limit
                .or_else(|| cfg.as_ref().and_then(|c| c.sample.as_ref()?.schema_limit))
                .unwrap_or(SCHEMA_SAMPLE_LIMIT);

            let source = JsonDirSource::new(&path);
            let selection = selection(&collections);
            match erd::extract_schemas(&source, selection, limit) {
                Ok(report) => {
                    print_warnings(&report, quiet);
                    write_output(out.as_deref(), &serialize_report(&report))
                }
                Err(e) => fail(ErdFormat::Json, &format!("Failed to extract schemas: {e}")),
            }
        }
    }
}

fn selection(collections: &[String]) -> Option<&[String]> {
    if collections.is_empty() {
        None
    } else {
        Some(collections)
    }
}

fn resolve_config(explicit: Option<&str>, source_path: &str) -> Option<Config> {
    match explicit {
        Some(path) => config::load_config_at(Path::new(path)),
        None => config::load_config_near(Path::new(source_path)),
    }
}

fn serialize_report(report: &ErdReport) -> String {
    serde_json::to_string_pretty(report).expect("serialize report to JSON")
}

fn print_warnings(report: &ErdReport, quiet: bool) {
    if quiet {
        return;
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}

fn write_output(out: Option<&str>, text: &str) -> i32 {
    match out {
        Some(path) => {
            if let Err(e) = fs::write(path, text) {
                eprintln!("Failed to write output {path}: {e}");
                return 1;
            }
            0
        }
        None => {
            println!("{text}");
            0
        }
    }
}

fn fail(format: ErdFormat, message: &str) -> i32 {
    // Errors never raise past the engine boundary; in JSON mode the failure
    // envelope goes to stdout so consumers always get structured output.
    match format {
        ErdFormat::Json => {
            let report = ErrorReport::new(message);
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("serialize error report to JSON")
            );
        }
        ErdFormat::Mermaid => eprintln!("{message}"),
    }
    1
}
