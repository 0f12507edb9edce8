use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show effective configuration (secrets omitted)")]
    Show,
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = config();
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(config)?);
                }
                OutputFormat::Text => {
                    println!("Environment: {:?}", config.environment);
                    println!("API: {}", config.api.base_url);
                    println!("Request timeout: {}s", config.api.request_timeout_secs);
                    println!("API token: {}", if config.api.bearer_token.is_some() { "set" } else { "not set" });
                    println!("Sign-in path: {}", config.routes.sign_in_path);
                    println!("Dashboard path: {}", config.routes.tenant_dashboard_path);
                    println!("Awaiting organization path: {}", config.routes.awaiting_organization_path);
                    println!("Log filter: {}", config.logging.default_filter);
                }
            }
            Ok(())
        }
    }
}
