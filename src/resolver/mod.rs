//! Tenancy resolution: which organization the signed-in identity belongs to,
//! and that organization's subscription.

pub mod provider;
pub mod state;
pub mod tenancy_resolver;

pub use provider::{TenancyHandle, TenancyProvider};
pub use state::ResolutionState;
pub use tenancy_resolver::{CycleStamp, TenancyResolver};
