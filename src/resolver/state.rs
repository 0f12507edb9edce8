use serde::Serialize;

use crate::error::TenancyError;
use crate::models::{Organization, Subscription};

/// What the console knows about the current tenant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionState {
    pub organization: Option<Organization>,
    pub subscription: Option<Subscription>,
    pub loading: bool,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<TenancyError>,
    /// Organization id the resolver is currently targeting
    pub organization_id: Option<String>,
}

impl Default for ResolutionState {
    fn default() -> Self {
        Self::initial()
    }
}

impl ResolutionState {
    /// Nothing known yet; the identity signal has not settled
    pub fn initial() -> Self {
        Self {
            organization: None,
            subscription: None,
            loading: true,
            error: None,
            organization_id: None,
        }
    }

    /// Settled with no tenant and no error (signed out or super-admin)
    pub fn cleared() -> Self {
        Self {
            loading: false,
            ..Self::initial()
        }
    }

    pub fn failed(error: TenancyError, organization_id: Option<String>) -> Self {
        Self {
            error: Some(error),
            organization_id,
            ..Self::cleared()
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Settled state with exactly one of: organization, error, or neither
    pub fn is_settled(&self) -> bool {
        !self.loading && !(self.organization.is_some() && self.error.is_some())
    }
}

fn serialize_error<S: serde::Serializer>(error: &Option<TenancyError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
