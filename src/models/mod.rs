pub mod organization;
pub mod subscription;
pub mod user;

pub use organization::Organization;
pub use subscription::{Subscription, SubscriptionStatus};
pub use user::{UserRecord, UserRole};
