//! `taxo template` command - Print a CSV template for import files

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io;

use crate::core::Layout;

/// Example hierarchy shown under the header
const EXAMPLE: [(&str, &str); 6] = [
    ("Kadın", "Women's fashion"),
    ("Giyim", "Clothing"),
    ("Elbise", "Dresses"),
    ("Mini Elbise", "Short dresses"),
    ("Uzun Elbise", "Long dresses"),
    ("2025 Koleksiyonu", "2025 collection"),
];

#[derive(clap::Args, Debug)]
pub struct TemplateArgs {
    /// Column layout of the template
    #[arg(long, value_enum, default_value_t = Layout::Names)]
    pub layout: Layout,
}

pub fn run(args: TemplateArgs) -> Result<()> {
    // Output to stdout (can be redirected to file)
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(args.layout.headers()).into_diagnostic()?;
    writer.write_record(example_row(args.layout)).into_diagnostic()?;
    writer.flush().into_diagnostic()?;

    // Usage hint goes to stderr so it doesn't interfere with redirected output
    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: taxo template --layout {} > categories.csv",
        style("→").blue(),
        args.layout
    );
    Ok(())
}

fn example_row(layout: Layout) -> Vec<&'static str> {
    EXAMPLE
        .iter()
        .flat_map(|&(name, description)| match layout {
            Layout::Names => vec![name],
            Layout::Described => vec![name, description],
        })
        .collect()
}
