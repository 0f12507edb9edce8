use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::TenancyError;
use crate::identity::IdentitySnapshot;
use crate::resolver::state::ResolutionState;
use crate::services::TenantApi;

/// Identifies one fetch cycle. Only the cycle matching the resolver's current
/// stamp, started for the identity still signed in, may commit its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStamp {
    seq: u64,
    uid: String,
    organization_id: String,
}

impl CycleStamp {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

/// The snapshot fields that decide what the resolver does
#[derive(Debug, Clone, PartialEq, Eq)]
struct SnapshotKey {
    resolved: bool,
    uid: Option<String>,
    super_admin: bool,
    loading: bool,
    has_record: bool,
    organization_id: Option<String>,
}

impl From<&IdentitySnapshot> for SnapshotKey {
    fn from(snapshot: &IdentitySnapshot) -> Self {
        Self {
            resolved: snapshot.is_resolved(),
            uid: snapshot.identity().map(|identity| identity.uid.clone()),
            super_admin: snapshot.is_super_admin,
            loading: snapshot.user_record_loading,
            has_record: snapshot.user_record.is_some(),
            organization_id: snapshot.home_organization_id.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct ResolverInner {
    /// Cycle allowed to commit; `None` when nothing is outstanding
    current: Option<CycleStamp>,
    next_seq: u64,
    snapshot: Option<IdentitySnapshot>,
    last_key: Option<SnapshotKey>,
    stopped: bool,
}

impl ResolverInner {
    fn current_uid(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.identity())
            .map(|identity| identity.uid.as_str())
    }
}

/// Keeps a [`ResolutionState`] in step with the identity signal.
///
/// Identity handling is synchronous; only the organization and subscription
/// lookups suspend. The inner lock is never held across an await point, and
/// state is only written while it is held.
#[derive(Clone)]
pub struct TenancyResolver {
    api: Arc<dyn TenantApi>,
    state: Arc<watch::Sender<ResolutionState>>,
    inner: Arc<Mutex<ResolverInner>>,
}

impl TenancyResolver {
    pub fn new(api: Arc<dyn TenantApi>) -> Self {
        let (state, _rx) = watch::channel(ResolutionState::initial());
        Self {
            api,
            state: Arc::new(state),
            inner: Arc::new(Mutex::new(ResolverInner::default())),
        }
    }

    pub fn state(&self) -> ResolutionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.state.subscribe()
    }

    /// Apply an identity update and spawn the fetch cycle it calls for, if any
    pub fn handle_identity(&self, snapshot: &IdentitySnapshot) -> Option<JoinHandle<()>> {
        let stamp = self.apply_identity(snapshot)?;
        let resolver = self.clone();
        Some(tokio::spawn(async move { resolver.run_cycle(stamp).await }))
    }

    /// Update state for a new identity snapshot.
    ///
    /// Returns the stamp of a fetch cycle the caller must run, when the
    /// snapshot names an organization to resolve.
    pub fn apply_identity(&self, snapshot: &IdentitySnapshot) -> Option<CycleStamp> {
        let key = SnapshotKey::from(snapshot);
        let mut inner = self.lock();

        if inner.stopped {
            tracing::trace!("Resolver stopped; identity update ignored");
            return None;
        }
        if inner.last_key.as_ref() == Some(&key) {
            tracing::trace!("Identity update carries no relevant change");
            return None;
        }
        inner.last_key = Some(key);
        inner.snapshot = Some(snapshot.clone());

        let superseded = match (&inner.current, inner.current_uid()) {
            (Some(stamp), Some(uid)) => stamp.uid != uid,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if superseded {
            tracing::debug!("Identity changed; outstanding resolution cycle superseded");
            inner.current = None;
        }

        if snapshot.is_super_admin {
            tracing::info!("Super-admin identity; tenant state cleared");
            inner.current = None;
            self.state.send_replace(ResolutionState::cleared());
            return None;
        }

        if !snapshot.is_resolved() || snapshot.user_record_loading {
            tracing::debug!("Identity not settled yet; holding tenant state");
            return None;
        }

        let Some(identity) = snapshot.identity() else {
            tracing::info!("Signed out; tenant state cleared");
            inner.current = None;
            self.state.send_replace(ResolutionState::cleared());
            return None;
        };

        let organization_id = snapshot
            .user_record
            .as_ref()
            .and(snapshot.home_organization_id.as_deref());

        match organization_id {
            Some(organization_id) => Some(self.begin_cycle(&mut inner, &identity.uid, organization_id)),
            None => {
                tracing::warn!(uid = %identity.uid, "Identity has no organization");
                inner.current = None;
                self.state.send_replace(ResolutionState::failed(TenancyError::NoTenant, None));
                None
            }
        }
    }

    /// Re-run the fetch cycle for the current organization.
    ///
    /// No-op when signed out, for a super-admin, or when the identity has no
    /// organization id. Resolves once the cycle has committed or been
    /// discarded as stale.
    pub async fn refresh(&self) {
        let stamp = {
            let mut inner = self.lock();
            let target = inner
                .snapshot
                .as_ref()
                .filter(|_| !inner.stopped)
                .filter(|snapshot| !snapshot.is_super_admin && !snapshot.user_record_loading)
                .and_then(|snapshot| {
                    let identity = snapshot.identity()?;
                    let organization_id = snapshot.home_organization_id.clone()?;
                    Some((identity.uid.clone(), organization_id))
                });

            match target {
                Some((uid, organization_id)) => self.begin_cycle(&mut inner, &uid, &organization_id),
                None => {
                    tracing::debug!("Refresh skipped: no organization to resolve");
                    return;
                }
            }
        };

        self.run_cycle(stamp).await;
    }

    /// Stop following identity updates. An outstanding cycle is discarded and
    /// the state keeps its last value.
    pub fn stop(&self) {
        let mut inner = self.lock();
        inner.stopped = true;
        inner.current = None;
    }

    fn begin_cycle(&self, inner: &mut ResolverInner, uid: &str, organization_id: &str) -> CycleStamp {
        inner.next_seq += 1;
        let stamp = CycleStamp {
            seq: inner.next_seq,
            uid: uid.to_string(),
            organization_id: organization_id.to_string(),
        };
        inner.current = Some(stamp.clone());

        self.state.send_modify(|state| {
            let same_tenant = state.organization.as_ref().map(|org| org.id.as_str()) == Some(organization_id);
            if !same_tenant {
                state.organization = None;
                state.subscription = None;
            }
            state.organization_id = Some(organization_id.to_string());
            state.loading = true;
            state.error = None;
        });

        tracing::debug!(seq = stamp.seq, uid, organization_id, "Resolution cycle started");
        stamp
    }

    /// Fetch organization and subscription concurrently, then commit if the
    /// cycle is still current
    pub async fn run_cycle(&self, stamp: CycleStamp) {
        let organization_id = stamp.organization_id.as_str();
        let (organization, subscription) = tokio::join!(
            self.api.fetch_organization(organization_id),
            self.api.fetch_subscription(organization_id),
        );

        let mut inner = self.lock();
        if inner.current.as_ref() != Some(&stamp) || inner.current_uid() != Some(stamp.uid.as_str()) {
            tracing::debug!(seq = stamp.seq, organization_id, "Discarding stale resolution result");
            return;
        }
        inner.current = None;

        let next = match organization {
            Ok(organization) => {
                let subscription = match subscription {
                    Ok(subscription) => Some(subscription),
                    Err(err) if err.is_not_found() => {
                        tracing::debug!(organization_id, "Organization has no subscription");
                        None
                    }
                    Err(err) => {
                        // Treated like not-found so the organization view stays usable,
                        // which also hides a subscription backend outage.
                        tracing::warn!(organization_id, error = %err, "Subscription lookup failed; continuing without it");
                        None
                    }
                };
                ResolutionState {
                    organization: Some(organization),
                    subscription,
                    loading: false,
                    error: None,
                    organization_id: Some(organization_id.to_string()),
                }
            }
            Err(err) => {
                tracing::warn!(organization_id, error = %err, "Organization lookup failed");
                ResolutionState::failed(
                    TenancyError::fetch_failed(organization_id, &err),
                    Some(organization_id.to_string()),
                )
            }
        };

        tracing::info!(
            seq = stamp.seq,
            organization_id,
            resolved = next.organization.is_some(),
            "Resolution cycle committed"
        );
        self.state.send_replace(next);
    }

    fn lock(&self) -> MutexGuard<'_, ResolverInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
