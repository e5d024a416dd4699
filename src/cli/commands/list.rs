//! List command implementation

use crate::openapi::{lister, OpenApiDocument};
use anyhow::Result;
use clap::{ArgMatches, Command};
use std::path::PathBuf;

pub fn command() -> Command {
    Command::new("list")
        .about("List paths and operation ids of an OpenAPI file")
        .arg(
            clap::Arg::new("file")
                .help("OpenAPI YAML file")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            clap::Arg::new("paths")
                .long("paths")
                .help("List paths with their HTTP verbs")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("operations")
                .long("operations")
                .help("List operation ids")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .map(String::as_str)
            .unwrap_or_default(),
    );
    let doc = OpenApiDocument::from_file(&path)?;

    // neither flag given: list both
    let paths = matches.get_flag("paths");
    let operations = matches.get_flag("operations");
    let both = !paths && !operations;

    if paths || both {
        println!("Listing paths:");
        for line in lister::list_paths(&doc, "  ") {
            println!("{line}");
        }
    }
    if operations || both {
        println!("Listing operation ids:");
        for line in lister::list_operation_ids(&doc, "  ") {
            println!("{line}");
        }
    }

    Ok(())
}
