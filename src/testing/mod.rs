use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::ApiError;
use crate::models::{Organization, Subscription};
use crate::services::TenantApi;

/// In-memory `TenantApi` with scripted responses.
///
/// Unknown ids answer `NotFound`. [`ScriptedTenantApi::hold`] makes the
/// organization lookup for an id wait until the returned gate is notified.
#[derive(Default)]
pub struct ScriptedTenantApi {
    organizations: Mutex<HashMap<String, Result<Organization, ApiError>>>,
    subscriptions: Mutex<HashMap<String, Result<Subscription, ApiError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    organization_calls: AtomicUsize,
    subscription_calls: AtomicUsize,
}

impl ScriptedTenantApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(self, organization: Organization) -> Self {
        self.set_organization(organization);
        self
    }

    pub fn with_organization_error(self, organization_id: &str, error: ApiError) -> Self {
        self.organizations
            .lock()
            .unwrap()
            .insert(organization_id.to_string(), Err(error));
        self
    }

    pub fn with_subscription(self, subscription: Subscription) -> Self {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.organization_id.clone(), Ok(subscription));
        self
    }

    pub fn with_subscription_error(self, organization_id: &str, error: ApiError) -> Self {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(organization_id.to_string(), Err(error));
        self
    }

    pub fn set_organization(&self, organization: Organization) {
        self.organizations
            .lock()
            .unwrap()
            .insert(organization.id.clone(), Ok(organization));
    }

    /// Block organization lookups for `organization_id` until the gate is notified
    pub fn hold(&self, organization_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(organization_id.to_string(), gate.clone());
        gate
    }

    pub fn organization_calls(&self) -> usize {
        self.organization_calls.load(Ordering::SeqCst)
    }

    pub fn subscription_calls(&self) -> usize {
        self.subscription_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TenantApi for ScriptedTenantApi {
    async fn fetch_organization(&self, organization_id: &str) -> Result<Organization, ApiError> {
        self.organization_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gates.lock().unwrap().get(organization_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.organizations
            .lock()
            .unwrap()
            .get(organization_id)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::NotFound(format!("organization {}", organization_id))))
    }

    async fn fetch_subscription(&self, organization_id: &str) -> Result<Subscription, ApiError> {
        self.subscription_calls.fetch_add(1, Ordering::SeqCst);

        self.subscriptions
            .lock()
            .unwrap()
            .get(organization_id)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::NotFound(format!("subscription for {}", organization_id))))
    }
}
