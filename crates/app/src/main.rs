mod args;
mod commands;
mod console;
mod quiz;

use services::{AppServices, Clock, ServicesConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use args::{Args, Command};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let parsed = Args::parse(std::env::args().skip(1), std::env::var("STUDY_USER").ok())
        .map_err(|e| {
            eprintln!("{e}");
            args::print_usage();
            e
        })?;
    if parsed.command == Command::Help {
        args::print_usage();
        return Ok(());
    }

    let config = ServicesConfig::from_env(parsed.data_dir);
    let app = AppServices::open(&config, Clock::default_clock()).await?;
    commands::dispatch(&app, parsed.user.as_ref(), parsed.command).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
