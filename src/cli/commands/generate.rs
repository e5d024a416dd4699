//! Generate command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use tracing::info;
use yaml2docx_docx::MemorySink;

pub fn command() -> Command {
    Command::new("generate")
        .about("Export the configured Word documents")
        .arg(utils::config_arg())
        .arg(
            clap::Arg::new("only")
                .long("only")
                .help("Only create the output file with this name")
                .value_name("FILE"),
        )
        .arg(
            clap::Arg::new("dry-run")
                .long("dry-run")
                .help("Render into memory and print statistics instead of writing files")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    info!("Starting document export");

    let config = utils::load_config(matches)?;
    let only = matches.get_one::<String>("only").map(String::as_str);
    let app = utils::create_app(config);

    if matches.get_flag("dry-run") {
        info!("Dry run mode - no files will be written");
        println!("Dry run mode - no files will be written");

        let results = app.generate_with(only, |_| MemorySink::new())?;
        for (result, sink) in &results {
            println!(
                "  {}: {} headings, {} paragraphs, {} tables, {} captions",
                result.output.display(),
                sink.headings().len(),
                sink.paragraphs().len(),
                sink.tables().len(),
                sink.captions().len()
            );
            if let Some(error) = &result.error {
                eprintln!("    Error: {error}");
            }
            for warning in &result.warnings {
                println!("    Warning: {warning}");
            }
        }
        return Ok(());
    }

    let result = app.generate(only)?;

    println!(
        "Export completed: {}/{} documents written, {} tables, {} warnings",
        result.succeeded(),
        result.files.len(),
        result.tables_written(),
        result.warning_count()
    );
    for file in &result.files {
        match &file.error {
            None => println!("  {} ({} tables)", file.output.display(), file.tables_written),
            Some(error) => eprintln!("  {} failed: {error}", file.output.display()),
        }
        for warning in &file.warnings {
            println!("    Warning: {warning}");
        }
    }

    if result.failed() > 0 {
        return Err(anyhow!("{} documents could not be created", result.failed()));
    }
    Ok(())
}
