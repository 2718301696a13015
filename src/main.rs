//! pagewhy CLI - explain why a page loads slowly

use clap::Parser;

use pagewhy::cli::{self, Cli, Commands, GlobalOptions};
use pagewhy::error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Default to warnings, `debug` with --debug; RUST_LOG wins over both.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Audit(args) => cli::audit::run(&opts, &args).await,
        Commands::Batch(args) => cli::batch::run(&opts, &args).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("pagewhy version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
