use clap::Parser;
use institute_console::cli::{utils::output_error, Cli, OutputFormat};
use institute_console::config::config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so CONSOLE_API_BASE_URL and friends are picked up
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config().logging.default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Console CLI starting in {:?} mode", config().environment);

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = institute_console::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ if !institute_console::is_production!() => {
                output_error(&output_format, &format!("{e:#}"), None)?
            }
            _ => output_error(&output_format, &e.to_string(), None)?,
        }
        std::process::exit(1);
    }

    Ok(())
}
