//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("apiary")
        .about("Inspect and initialise the apiary data file")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: ./apiary.toml if present)")
                .global(true),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .help("Data file, overriding the config")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("show").about("Load the data file and print a summary"))
        .subcommand(
            Command::new("verify")
                .about("Decode the data file and report every skipped line (exit 1 on issues)"),
        )
        .subcommand(
            Command::new("init")
                .about("Write the bootstrap dataset to the data file")
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help("Overwrite an existing data file")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("config").about("Write a default config if missing and print it"))
}
