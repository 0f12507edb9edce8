pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod models;
pub mod resolver;
pub mod services;

pub use error::{ApiError, TenancyError};
pub use guard::{GuardDecision, RouteGuard, RouteRequirements, RouteTable};
pub use identity::{Identity, IdentitySignal, IdentitySnapshot, IdentityState};
pub use resolver::{ResolutionState, TenancyHandle, TenancyProvider, TenancyResolver};
pub use services::{HttpTenantApi, TenantApi};

#[cfg(test)]
pub mod testing;
