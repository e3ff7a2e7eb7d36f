//! ArgMatches → CliAction conversion.
//!
//! Also resolves which config and data file the command runs against:
//! - `--config <path>` must exist and parse
//! - otherwise `./apiary.toml` is used when present
//! - otherwise the defaults apply
//! - `--data <path>` overrides the data file in every case

use std::path::PathBuf;

use apiary_engine::{ApiaryConfig, CONFIG_FILE_NAME};
use clap::ArgMatches;

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Print a summary of the loaded snapshot.
    Show,
    /// Report skipped lines.
    Verify,
    /// Write the bootstrap dataset.
    Init {
        /// Overwrite an existing file.
        force: bool,
    },
    /// Write and print the default config.
    Config,
}

/// Convert parsed arguments into the action to run.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("show", _)) => Ok(CliAction::Show),
        Some(("verify", _)) => Ok(CliAction::Verify),
        Some(("init", sub)) => Ok(CliAction::Init {
            force: sub.get_flag("force"),
        }),
        Some(("config", _)) => Ok(CliAction::Config),
        Some((other, _)) => Err(format!("unknown command '{}'", other)),
        None => Err("no command given".to_string()),
    }
}

/// Matches of the invoked subcommand, where global args end up.
pub fn leaf(matches: &ArgMatches) -> &ArgMatches {
    match matches.subcommand() {
        Some((_, sub)) => sub,
        None => matches,
    }
}

/// Whether `--json` was given.
pub fn json_output(matches: &ArgMatches) -> bool {
    leaf(matches).get_flag("json")
}

/// Path of the config file the command refers to.
pub fn config_path(matches: &ArgMatches) -> PathBuf {
    leaf(matches)
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Build the effective config from `--config`, `./apiary.toml` and `--data`.
pub fn resolve_config(matches: &ArgMatches) -> Result<ApiaryConfig, String> {
    let explicit = leaf(matches).contains_id("config");
    let path = config_path(matches);

    let config = if explicit || path.exists() {
        ApiaryConfig::from_file(&path).map_err(|e| e.to_string())?
    } else {
        ApiaryConfig::default()
    };

    Ok(match leaf(matches).get_one::<String>("data") {
        Some(data) => config.with_data_file(data),
        None => config,
    })
}
