use clap::Subcommand;
use serde_json::json;

use crate::cli::commands::{load_identity, IdentityArgs};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::guard::RouteGuard;
use crate::identity::IdentitySignal;
use crate::services::HttpTenantApi;

#[derive(Subcommand)]
pub enum GuardCommands {
    #[command(about = "Decide whether a console path may render")]
    Check {
        #[arg(help = "Console path, e.g. /students")]
        path: String,

        #[command(flatten)]
        identity: IdentityArgs,
    },

    #[command(about = "List route requirements")]
    Routes,
}

pub async fn handle(cmd: GuardCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let guard = RouteGuard::new(config().routes.clone());

    match cmd {
        GuardCommands::Check { path, identity } => {
            let signal = IdentitySignal::new();
            if identity.uid.is_some() {
                let api = HttpTenantApi::from_config(&config().api)?;
                load_identity(&api, &signal, &identity).await?;
            } else {
                signal.sign_out();
            }

            let decision = guard.check_path(&signal.current(), &path);
            output_decision(&output_format, &path, &decision)
        }
        GuardCommands::Routes => {
            match output_format {
                OutputFormat::Json => {
                    let routes: Vec<_> = guard
                        .table()
                        .routes()
                        .map(|(prefix, requirements)| json!({ "prefix": prefix, "requirements": requirements }))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "routes": routes }))?);
                }
                OutputFormat::Text => {
                    println!("{:<20} {:<12} {}", "PREFIX", "SUPER ADMIN", "ORGANIZATION");
                    println!("{}", "-".repeat(46));
                    for (prefix, requirements) in guard.table().routes() {
                        println!(
                            "{:<20} {:<12} {}",
                            prefix, requirements.requires_super_admin, requirements.requires_organization
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
