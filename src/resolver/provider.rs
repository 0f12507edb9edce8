use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::TenancyError;
use crate::identity::IdentitySnapshot;
use crate::models::{Organization, Subscription};
use crate::resolver::state::ResolutionState;
use crate::resolver::tenancy_resolver::TenancyResolver;
use crate::services::TenantApi;

/// Consumer-facing access to the resolved tenant.
///
/// Obtained from [`TenancyProvider::handle`]; cheap to clone.
#[derive(Clone)]
pub struct TenancyHandle {
    resolver: TenancyResolver,
}

impl TenancyHandle {
    pub fn state(&self) -> ResolutionState {
        self.resolver.state()
    }

    pub fn organization(&self) -> Option<Organization> {
        self.state().organization
    }

    pub fn subscription(&self) -> Option<Subscription> {
        self.state().subscription
    }

    pub fn loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<TenancyError> {
        self.state().error
    }

    pub fn organization_id(&self) -> Option<String> {
        self.state().organization_id
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.resolver.subscribe()
    }

    pub async fn refresh(&self) {
        self.resolver.refresh().await
    }

    /// Wait until no cycle for the current identity is outstanding
    pub async fn settled(&self) -> ResolutionState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

struct ActiveProvider {
    handle: TenancyHandle,
    driver: JoinHandle<()>,
}

/// Owns the resolver driver task and hands out [`TenancyHandle`]s.
///
/// Asking for a handle before [`TenancyProvider::start`] or after
/// [`TenancyProvider::shutdown`] fails with [`TenancyError::NotInitialized`].
#[derive(Default)]
pub struct TenancyProvider {
    active: RwLock<Option<ActiveProvider>>,
}

impl TenancyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start resolving from `identity`. Replaces a previously started resolver.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, api: Arc<dyn TenantApi>, identity: watch::Receiver<IdentitySnapshot>) -> TenancyHandle {
        let resolver = TenancyResolver::new(api);
        let handle = TenancyHandle {
            resolver: resolver.clone(),
        };
        let driver = tokio::spawn(drive(resolver, identity));

        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(ActiveProvider {
                handle: handle.clone(),
                driver,
            });
        if let Some(previous) = previous {
            tracing::debug!("Replacing running tenancy resolver");
            previous.driver.abort();
            previous.handle.resolver.stop();
        }

        handle
    }

    pub fn handle(&self) -> Result<TenancyHandle, TenancyError> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| active.handle.clone())
            .ok_or(TenancyError::NotInitialized)
    }

    pub fn is_active(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop following the identity signal; existing handles keep their last state
    pub fn shutdown(&self) {
        if let Some(active) = self.active.write().unwrap_or_else(PoisonError::into_inner).take() {
            active.driver.abort();
            active.handle.resolver.stop();
            tracing::debug!("Tenancy resolver stopped");
        }
    }
}

impl Drop for TenancyProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn drive(resolver: TenancyResolver, mut identity: watch::Receiver<IdentitySnapshot>) {
    loop {
        let snapshot = identity.borrow_and_update().clone();
        let _ = resolver.handle_identity(&snapshot);

        if identity.changed().await.is_err() {
            tracing::debug!("Identity signal closed; resolver driver exiting");
            break;
        }
    }
}
