use super::{AdminCapability, AuthError};
use crate::common::entity_ids::UserId;

/// The caller of a workflow action, as established by the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    actor_id: UserId,
    is_admin: bool,
}

impl Actor {
    /// `is_admin` comes from verified token claims, not from the store.
    pub fn new(actor_id: UserId, is_admin: bool) -> Self {
        Self { actor_id, is_admin }
    }

    pub fn id(&self) -> UserId {
        self.actor_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: AdminCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: AdminCapability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub fn check(self) -> Result<Actor, AuthError> {
        if self.capability.requires_admin() && !self.actor.is_admin {
            tracing::debug!(
                actor_id = %self.actor.actor_id,
                capability = ?self.capability,
                "Capability denied"
            );
            return Err(AuthError::AdminRequired);
        }
        Ok(self.actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_may_review() {
        let actor = Actor::new(UserId::new(), true);
        let checked = actor.can(AdminCapability::ApproveRequests).check();
        assert_eq!(checked, Ok(actor));
    }

    #[test]
    fn non_admin_is_rejected_for_every_capability() {
        let actor = Actor::new(UserId::new(), false);
        for capability in [
            AdminCapability::ApproveRequests,
            AdminCapability::RejectRequests,
        ] {
            assert_eq!(
                actor.can(capability).check(),
                Err(AuthError::AdminRequired)
            );
        }
    }
}
