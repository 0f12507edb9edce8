use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;

use crate::cli::commands::{load_identity, IdentityArgs};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::identity::IdentitySignal;
use crate::resolver::TenancyProvider;
use crate::services::HttpTenantApi;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Resolve organization and subscription for an identity")]
    Resolve {
        #[command(flatten)]
        identity: IdentityArgs,

        #[arg(long, help = "Run a second resolution cycle after the first settles")]
        refresh: bool,

        #[arg(long, default_value_t = 30, help = "Seconds to wait for resolution")]
        wait_secs: u64,
    },
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Resolve { identity, refresh, wait_secs } => {
            if identity.uid.is_none() {
                return Err(anyhow::anyhow!("--uid is required to resolve a tenant"));
            }

            let api = HttpTenantApi::from_config(&config().api)?;
            let signal = IdentitySignal::new();
            let provider = TenancyProvider::new();
            let handle = provider.start(Arc::new(api.clone()), signal.subscribe());

            load_identity(&api, &signal, &identity).await?;

            let wait = Duration::from_secs(wait_secs);
            let mut state = tokio::time::timeout(wait, handle.settled())
                .await
                .map_err(|_| anyhow::anyhow!("Tenant did not resolve within {}s", wait_secs))?;

            if refresh && state.organization_id.is_some() {
                tokio::time::timeout(wait, handle.refresh())
                    .await
                    .map_err(|_| anyhow::anyhow!("Refresh did not complete within {}s", wait_secs))?;
                state = handle.state();
            }

            provider.shutdown();
            output_state(&output_format, &state)?;

            if let Some(err) = &state.error {
                if err.is_awaiting_organization() {
                    output_success(
                        &output_format,
                        "Identity is waiting for an organization to be assigned",
                        None,
                    )?;
                }
            }

            Ok(())
        }
    }
}
