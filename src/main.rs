use clap::Parser;
use miette::Result;
use taxo::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => taxo::cli::commands::init::run(args),
        Commands::Import(args) => taxo::cli::commands::import::run(args, &global),
        Commands::Template(args) => taxo::cli::commands::template::run(args),
        Commands::Tree(args) => taxo::cli::commands::tree::run(args, &global),
        Commands::Completions(args) => taxo::cli::commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG overrides the default filter
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,taxo=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
