//! Validate command implementation

use crate::cli::utils;
use anyhow::Result;
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("validate")
        .about("Validate configuration file")
        .arg(utils::config_arg())
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    info!("Validating configuration file");

    let config = utils::load_config(matches)?;

    println!("Configuration file is valid!");
    println!("Global replacements: {}", config.reps.len());
    println!("Output files: {}", config.create_word_files.len());

    for file in &config.create_word_files {
        println!("  - {}", file.file_name.display());
        for source in file.all_sources() {
            println!(
                "      {} ({}, {} actions{})",
                source.file_name().display(),
                source.kind_name(),
                source.actions().len(),
                if source.skip() { ", skipped" } else { "" }
            );
        }
    }

    Ok(())
}
