//! Route gating for protected console views.
//!
//! Decisions are made from the identity signal alone. A failed tenant fetch is
//! shown in place by the view and never causes a redirect here.

use serde::Serialize;

use crate::config::RouteConfig;
use crate::identity::{IdentitySnapshot, IdentityState};

/// What a protected route needs before it may render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteRequirements {
    pub requires_super_admin: bool,
    pub requires_organization: bool,
}

impl RouteRequirements {
    pub fn signed_in() -> Self {
        Self::default()
    }

    pub fn super_admin() -> Self {
        Self {
            requires_super_admin: true,
            requires_organization: false,
        }
    }

    pub fn organization() -> Self {
        Self {
            requires_super_admin: false,
            requires_organization: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "path", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Identity still loading: show a placeholder, do not redirect
    Loading,
    Render,
    Redirect(String),
    /// Signed in without an organization: hand off to the waiting view
    AwaitingOrganization(String),
}

impl GuardDecision {
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardDecision::Redirect(path) | GuardDecision::AwaitingOrganization(path) => Some(path),
            GuardDecision::Loading | GuardDecision::Render => None,
        }
    }
}

/// Console sections and what each requires; matched by longest path prefix
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<(String, RouteRequirements)>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
            .route("/admin", RouteRequirements::super_admin())
            .route("/dashboard", RouteRequirements::organization())
            .route("/students", RouteRequirements::organization())
            .route("/admissions", RouteRequirements::organization())
            .route("/attendance", RouteRequirements::organization())
            .route("/finance", RouteRequirements::organization())
            .route("/organization", RouteRequirements::organization())
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn route(mut self, prefix: impl Into<String>, requirements: RouteRequirements) -> Self {
        self.routes.push((prefix.into(), requirements));
        self
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, RouteRequirements)> {
        self.routes.iter().map(|(prefix, requirements)| (prefix.as_str(), *requirements))
    }

    /// Requirements for `path`; unknown paths only need a signed-in identity
    pub fn requirements_for(&self, path: &str) -> RouteRequirements {
        self.routes
            .iter()
            .filter(|(prefix, _)| path_has_prefix(path, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, requirements)| *requirements)
            .unwrap_or_default()
    }
}

/// Segment-aware prefix match: `/admin` covers `/admin/orgs` but not `/administer`
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    routes: RouteConfig,
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(routes: RouteConfig) -> Self {
        Self {
            routes,
            table: RouteTable::default(),
        }
    }

    pub fn with_table(mut self, table: RouteTable) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide for a console path using the route table
    pub fn check_path(&self, snapshot: &IdentitySnapshot, path: &str) -> GuardDecision {
        self.check(snapshot, self.table.requirements_for(path))
    }

    pub fn check(&self, snapshot: &IdentitySnapshot, requirements: RouteRequirements) -> GuardDecision {
        let identity = match &snapshot.identity {
            IdentityState::Unresolved => return GuardDecision::Loading,
            IdentityState::SignedOut => {
                tracing::debug!("Guard: signed out, redirecting to sign-in");
                return GuardDecision::Redirect(self.routes.sign_in_path.clone());
            }
            IdentityState::SignedIn(identity) => identity,
        };

        if snapshot.user_record_loading {
            return GuardDecision::Loading;
        }

        if requirements.requires_super_admin && !snapshot.is_super_admin {
            tracing::warn!(uid = %identity.uid, "Guard: super-admin route denied");
            return GuardDecision::Redirect(self.routes.tenant_dashboard_path.clone());
        }

        if requirements.requires_organization && !snapshot.is_super_admin && snapshot.home_organization_id.is_none() {
            tracing::debug!(uid = %identity.uid, "Guard: no organization yet");
            return GuardDecision::AwaitingOrganization(self.routes.awaiting_organization_path.clone());
        }

        GuardDecision::Render
    }
}
