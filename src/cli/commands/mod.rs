pub mod config;
pub mod guard;
pub mod tenant;

use clap::Args;

use crate::identity::{Identity, IdentitySignal};
use crate::services::HttpTenantApi;

/// Identity to act as; omit `--uid` to act signed out
#[derive(Args, Debug, Clone)]
pub struct IdentityArgs {
    #[arg(long, help = "User id of the signed-in identity")]
    pub uid: Option<String>,

    #[arg(long, help = "Email of the signed-in identity (defaults to <uid>@local)")]
    pub email: Option<String>,
}

/// Drive the identity signal the way the identity provider would: sign in,
/// then publish the user record loaded from the backend.
pub async fn load_identity(api: &HttpTenantApi, signal: &IdentitySignal, args: &IdentityArgs) -> anyhow::Result<()> {
    let Some(uid) = &args.uid else {
        signal.sign_out();
        return Ok(());
    };

    let email = args.email.clone().unwrap_or_else(|| format!("{}@local", uid));
    signal.sign_in(Identity::new(uid.clone(), email));

    match api.fetch_user_record(uid).await {
        Ok(record) => signal.user_record_loaded(record),
        Err(err) if err.is_not_found() => {
            tracing::warn!(uid = %uid, "No user record on the backend");
            signal.user_record_missing();
        }
        Err(err) => return Err(anyhow::anyhow!("Failed to load user record for '{}': {}", uid, err)),
    }

    Ok(())
}
