//! `taxo import` command - Import categories from a CSV file

use console::style;
use miette::Result;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::helpers::{open_project, open_store, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::access;
use crate::core::{process_csv, Config, ImportError, ImportOptions, ImportResult, Layout};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    pub file: PathBuf,

    /// Column layout (default: from config, else names)
    #[arg(long, value_enum)]
    pub layout: Option<Layout>,

    /// Treat the first row as data rather than a header
    #[arg(long, conflicts_with = "header")]
    pub no_header: bool,

    /// Discard the first row as a header (the default unless configured otherwise)
    #[arg(long)]
    pub header: bool,

    /// Taxonomy to import into (default: from config, else product_cat)
    #[arg(long)]
    pub taxonomy: Option<String>,

    /// Run the import and report counts without saving any terms
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    if let Some(user) = access::authorize_term_writes(&project)? {
        debug!(%user, "authorized for term writes");
    }

    let has_header = if args.header {
        true
    } else if args.no_header {
        false
    } else {
        config.has_header()
    };
    let options = ImportOptions {
        has_header,
        layout: args.layout.unwrap_or_else(|| config.layout()),
    };
    let taxonomy = args
        .taxonomy
        .clone()
        .unwrap_or_else(|| config.taxonomy().to_string());

    if !global.quiet && global.format == OutputFormat::Auto {
        println!(
            "{} Importing {} categories from {} into {}{}",
            style("→").blue(),
            style(options.layout).cyan(),
            style(args.file.display()).yellow(),
            style(&taxonomy).cyan(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    let mut store = open_store(&project, &config, &taxonomy)?;
    let mut session = store.session().map_err(ImportError::from)?;
    let result = process_csv(&mut session, &args.file, &options)?;

    if args.dry_run {
        session.rollback().map_err(ImportError::from)?;
    } else {
        session.commit().map_err(ImportError::from)?;
    }

    if print_structured(global.format, &result)? {
        return Ok(());
    }
    print_summary(&result, args.dry_run, global.quiet);
    Ok(())
}

fn print_summary(result: &ImportResult, dry_run: bool, quiet: bool) {
    println!(
        "{} Import complete: Rows: {} | Created: {} | Existing: {}",
        style("✓").green(),
        result.rows_processed,
        result.terms_created,
        result.terms_existing
    );
    if quiet {
        return;
    }

    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed:   {}", style(result.rows_processed).cyan());
    println!("  Terms created:    {}", style(result.terms_created).green());
    println!("  Terms existing:   {}", style(result.terms_existing).yellow());
    if result.rows_aborted > 0 {
        println!("  Rows abandoned:   {}", style(result.rows_aborted).red());
    }
    if result.rows_malformed > 0 {
        println!("  Rows unreadable:  {}", style(result.rows_malformed).red());
    }

    if result.rows_aborted > 0 || result.rows_malformed > 0 {
        println!();
        println!("{}", style("Affected lines are listed in the warnings above.").dim());
    }

    if dry_run {
        println!();
        println!("{}", style("Dry run complete. No terms were saved.").yellow());
    }
}
