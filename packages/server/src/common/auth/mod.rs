/// Authorization checks for workflow actions.
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, AdminCapability};
///
/// Actor::new(caller_id, claims.admin)
///     .can(AdminCapability::ApproveRequests)
///     .check()?;
/// ```
///
/// The check runs inside the action, before any store access.
mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::AdminCapability;
pub use errors::AuthError;
