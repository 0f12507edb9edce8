//! Identity provider adapter.
//!
//! The identity provider itself (sign-in, token issuance) lives outside this
//! crate. This module is the seam it drives: every change is published as an
//! [`IdentitySnapshot`] on a `watch` channel, and the super-admin flag and
//! home organization id are derived from the loaded user record.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::UserRecord;

/// Who is signed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    /// The provider has not reported yet (initial load)
    Unresolved,
    SignedOut,
    SignedIn(Identity),
}

/// One emission of the identity signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub identity: IdentityState,
    pub user_record: Option<UserRecord>,
    pub is_super_admin: bool,
    pub home_organization_id: Option<String>,
    pub user_record_loading: bool,
}

impl Default for IdentitySnapshot {
    fn default() -> Self {
        Self::unresolved()
    }
}

impl IdentitySnapshot {
    pub fn unresolved() -> Self {
        Self {
            identity: IdentityState::Unresolved,
            user_record: None,
            is_super_admin: false,
            home_organization_id: None,
            user_record_loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            identity: IdentityState::SignedOut,
            ..Self::unresolved()
        }
    }

    /// Signed in, user record still being fetched
    pub fn loading(identity: Identity) -> Self {
        Self {
            identity: IdentityState::SignedIn(identity),
            user_record_loading: true,
            ..Self::unresolved()
        }
    }

    /// Signed in with a loaded user record; derives the role flags from it
    pub fn loaded(identity: Identity, record: UserRecord) -> Self {
        Self {
            identity: IdentityState::SignedIn(identity),
            is_super_admin: record.is_super_admin(),
            home_organization_id: record.home_organization_id().map(str::to_string),
            user_record: Some(record),
            user_record_loading: false,
        }
    }

    /// Signed in, but the backend has no user record for the identity
    pub fn missing_record(identity: Identity) -> Self {
        Self {
            identity: IdentityState::SignedIn(identity),
            ..Self::unresolved()
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.identity {
            IdentityState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.identity, IdentityState::Unresolved)
    }

    pub fn is_signed_out(&self) -> bool {
        matches!(self.identity, IdentityState::SignedOut)
    }
}

/// Publisher side of the identity signal
#[derive(Debug)]
pub struct IdentitySignal {
    tx: watch::Sender<IdentitySnapshot>,
}

impl Default for IdentitySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(IdentitySnapshot::unresolved());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<IdentitySnapshot> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> IdentitySnapshot {
        self.tx.borrow().clone()
    }

    pub fn publish(&self, snapshot: IdentitySnapshot) {
        tracing::debug!(
            signed_in = snapshot.identity().is_some(),
            super_admin = snapshot.is_super_admin,
            loading = snapshot.user_record_loading,
            "Identity signal updated"
        );
        self.tx.send_replace(snapshot);
    }

    /// Provider reported a sign-in; the user record load starts now
    pub fn sign_in(&self, identity: Identity) {
        self.publish(IdentitySnapshot::loading(identity));
    }

    pub fn user_record_loaded(&self, record: UserRecord) {
        let Some(identity) = self.current().identity().cloned() else {
            tracing::warn!(user = %record.id, "Ignoring user record for a signed-out identity");
            return;
        };
        self.publish(IdentitySnapshot::loaded(identity, record));
    }

    pub fn user_record_missing(&self) {
        let Some(identity) = self.current().identity().cloned() else {
            return;
        };
        self.publish(IdentitySnapshot::missing_record(identity));
    }

    pub fn sign_out(&self) {
        self.publish(IdentitySnapshot::signed_out());
    }
}
