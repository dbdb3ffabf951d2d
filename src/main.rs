use clap::Parser;
use digital_identity::cli::{self, CliArgs, CLI};
use digital_identity::config::AppConfig;
use digital_identity::errors::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let args = CliArgs::parse();
    if let Err(e) = run(args).await {
        CLI::print_error(&format!("Application error: {}", e));
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let config = AppConfig::from_env()?.with_database_path(args.db);
    cli::run_command(args.command, &config).await
}
