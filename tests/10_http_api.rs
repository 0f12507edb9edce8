mod common;

use std::time::Duration;

use anyhow::Result;
use institute_console::models::{SubscriptionStatus, UserRole};
use institute_console::{ApiError, HttpTenantApi, TenantApi};

fn api(base_url: &str) -> HttpTenantApi {
    HttpTenantApi::new(base_url, Duration::from_secs(5)).expect("valid base URL")
}

#[tokio::test]
async fn fetches_bare_organization_with_metadata() -> Result<()> {
    let backend = common::FakeBackend::spawn().await?;

    let org = api(&backend.base_url).fetch_organization("org1").await?;
    assert_eq!(org.id, "org1");
    assert_eq!(org.name, "Acme");
    assert_eq!(org.metadata.get("city"), Some(&serde_json::json!("Pune")));
    Ok(())
}

#[tokio::test]
async fn fetches_enveloped_records() -> Result<()> {
    let backend = common::FakeBackend::spawn().await?;
    let api = api(&backend.base_url);

    let org = api.fetch_organization("org2").await?;
    assert_eq!(org.name, "Beacon");

    let sub = api.fetch_subscription("org1").await?;
    assert_eq!(sub.status, SubscriptionStatus::Active);
    assert!(sub.is_active());

    let user = api.fetch_user_record("root").await?;
    assert_eq!(user.role, UserRole::SuperAdmin);
    assert_eq!(user.organization_id, None);
    Ok(())
}

#[tokio::test]
async fn maps_error_statuses() -> Result<()> {
    let backend = common::FakeBackend::spawn().await?;
    let api = api(&backend.base_url);

    let missing = api.fetch_organization("nope").await.unwrap_err();
    assert!(missing.is_not_found());

    let broken = api.fetch_organization("broken").await.unwrap_err();
    assert_eq!(broken, ApiError::InternalServerError("database unavailable".into()));

    let billing = api.fetch_subscription("org2").await.unwrap_err();
    assert_eq!(billing.status_code(), Some(503));

    let garbled = api.fetch_organization("garbled").await.unwrap_err();
    assert!(matches!(garbled, ApiError::Decode(_)), "unexpected error: {garbled:?}");
    Ok(())
}

#[tokio::test]
async fn sends_bearer_token() -> Result<()> {
    let backend = common::FakeBackend::spawn().await?;

    let good = api(&backend.base_url).with_bearer_token(common::TOKEN);
    assert_eq!(good.fetch_organization("org1").await?.id, "org1");

    let bad = api(&backend.base_url).with_bearer_token("wrong");
    let err = bad.fetch_organization("org1").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)), "unexpected error: {err:?}");
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() -> Result<()> {
    let port = portpicker::pick_unused_port().expect("free port");
    let api = HttpTenantApi::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2))?;

    let err = api.fetch_organization("org1").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "unexpected error: {err:?}");
    assert_eq!(err.status_code(), None);
    Ok(())
}
