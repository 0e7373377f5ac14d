//! `taxo init` command - Initialize a new taxonomy project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, store_path};
use crate::core::project::{Project, ProjectError};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite .taxo/config.yaml even if the project already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = match Project::init(&path, args.force) {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Taxonomy project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("taxo init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let config = Config::load(Some(&project));
    open_store(&project, &config, config.taxonomy())?;

    println!(
        "{} Initialized taxonomy project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!("  Term store: {}", style(store_path(&project, &config).display()).dim());
    println!();
    println!("Next steps:");
    println!("  {} Write a CSV template", style("taxo template > categories.csv").yellow());
    println!("  {} Import categories", style("taxo import categories.csv").yellow());
    println!("  {} Show the hierarchy", style("taxo tree").yellow());
    Ok(())
}
