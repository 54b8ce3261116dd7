/// Privileged operations on the competition request workflow.
///
/// Submitting a request is open to any authenticated user and has no
/// capability; everything listed here is reviewer-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCapability {
    /// Approve a pending competition request
    ApproveRequests,

    /// Reject a pending competition request
    RejectRequests,
}

impl AdminCapability {
    /// Check if this capability requires admin access
    pub fn requires_admin(&self) -> bool {
        match self {
            AdminCapability::ApproveRequests | AdminCapability::RejectRequests => true,
        }
    }
}
