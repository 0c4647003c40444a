use clap::Parser;
use tankplay_cli::{play, Cli};
use tankplay_core::TankplayError;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = play::run(cli) {
        if let Some(TankplayError::EnvNotSourced) = e.downcast_ref::<TankplayError>() {
            eprintln!("You must source an EW env before running this!");
            std::process::exit(2);
        }
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
