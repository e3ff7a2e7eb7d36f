//! Apiary CLI: admin tooling for the apiary data file.
//!
//! Commands:
//! - `apiary show [--json]`: load and summarise the data file
//! - `apiary verify`: report skipped lines, exit 1 if there are any
//! - `apiary init [--force]`: write the bootstrap dataset
//! - `apiary config`: write a default `apiary.toml` if missing and print it
//!
//! Logs go to stderr; set `RUST_LOG` to adjust (default `info`).

mod commands;
mod format;
mod parse;

use std::process;

use apiary_core::SequenceAllocator;
use apiary_durability::{bootstrap_snapshot, LoadSource};
use apiary_engine::{Apiary, ApiaryConfig};
use clap::ArgMatches;

use commands::build_cli;
use format::{format_error, format_show, format_verify, OutputMode};
use parse::{config_path, json_output, matches_to_action, resolve_config, CliAction};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let mode = if json_output(&matches) {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let exit_code = match run(&matches, mode) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    };
    process::exit(exit_code);
}

fn run(matches: &ArgMatches, mode: OutputMode) -> Result<i32, String> {
    match matches_to_action(matches)? {
        CliAction::Show => {
            let apiary = open(matches)?;
            let (snapshot, report) = apiary.load_report().map_err(|e| e.to_string())?;
            println!("{}", format_show(apiary.path(), &snapshot, &report, mode));
            apiary.close();
            Ok(0)
        }
        CliAction::Verify => {
            let apiary = open(matches)?;
            let (_, report) = apiary.load_report().map_err(|e| e.to_string())?;
            println!("{}", format_verify(apiary.path(), &report, mode));
            apiary.close();
            let ok = report.source == LoadSource::Disk && report.is_clean();
            Ok(if ok { 0 } else { 1 })
        }
        CliAction::Init { force } => {
            let apiary = open(matches)?;
            if apiary.path().exists() && !force {
                return Err(format!(
                    "{} already exists; use --force to overwrite",
                    apiary.path().display()
                ));
            }
            let snapshot = bootstrap_snapshot(&SequenceAllocator::new(), &SequenceAllocator::new())
                .map_err(|e| e.to_string())?;
            apiary.save_now(&snapshot).map_err(|e| e.to_string())?;
            println!("Wrote bootstrap data to {}", apiary.path().display());
            apiary.close();
            Ok(0)
        }
        CliAction::Config => {
            let path = config_path(matches);
            let created = ApiaryConfig::write_default_if_missing(&path).map_err(|e| e.to_string())?;
            if created {
                eprintln!("Created {}", path.display());
            }
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
            print!("{}", content);
            Ok(0)
        }
    }
}

fn open(matches: &ArgMatches) -> Result<Apiary, String> {
    let config = resolve_config(matches)?;
    Apiary::open(config).map_err(|e| format!("Failed to open data file: {}", e))
}
