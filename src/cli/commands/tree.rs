//! `taxo tree` command - Show the imported category hierarchy

use console::style;
use miette::Result;
use std::collections::HashMap;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{open_project, open_store, print_structured, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::{Config, Term, TermId};

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Taxonomy to show (default: from config, else product_cat)
    #[arg(long)]
    pub taxonomy: Option<String>,

    /// Print a flat table instead of an indented tree
    #[arg(long)]
    pub flat: bool,
}

pub fn run(args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let taxonomy = args
        .taxonomy
        .clone()
        .unwrap_or_else(|| config.taxonomy().to_string());

    let store = open_store(&project, &config, &taxonomy)?;
    let terms = store
        .list_terms()
        .map_err(|e| miette::miette!("{}", e))?;

    if print_structured(global.format, &terms)? {
        return Ok(());
    }

    if terms.is_empty() {
        println!("No terms in taxonomy {}", style(&taxonomy).cyan());
        return Ok(());
    }

    if args.flat {
        println!("{}", render_table(&terms));
    } else {
        print!("{}", render_tree(&terms));
    }

    if !global.quiet {
        println!();
        println!(
            "{} term(s) in {}",
            style(terms.len()).cyan(),
            style(&taxonomy).cyan()
        );
    }
    Ok(())
}

/// Indented hierarchy, children in creation order
pub fn render_tree(terms: &[Term]) -> String {
    let mut children: HashMap<TermId, Vec<&Term>> = HashMap::new();
    for term in terms {
        children.entry(term.parent).or_default().push(term);
    }

    let mut output = String::new();
    let mut stack: Vec<(&Term, usize)> = children
        .get(&TermId::ROOT)
        .map(|roots| roots.iter().rev().map(|t| (*t, 0)).collect())
        .unwrap_or_default();

    while let Some((term, depth)) = stack.pop() {
        output.push_str(&"  ".repeat(depth));
        output.push_str(&format!("{} ({})", term.name, term.slug));
        if let Some(description) = term.description.as_deref().filter(|d| !d.is_empty()) {
            output.push_str(&format!(" - {}", truncate_str(description, 60)));
        }
        output.push('\n');

        if let Some(kids) = children.get(&term.id) {
            stack.extend(kids.iter().rev().map(|t| (*t, depth + 1)));
        }
    }
    output
}

fn render_table(terms: &[Term]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Slug", "Parent", "Description"]);
    for term in terms {
        builder.push_record([
            term.id.to_string(),
            term.name.clone(),
            term.slug.clone(),
            if term.parent.is_root() {
                "-".to_string()
            } else {
                term.parent.to_string()
            },
            truncate_str(term.description.as_deref().unwrap_or(""), 40),
        ]);
    }
    builder.build().with(Style::markdown()).to_string()
}
