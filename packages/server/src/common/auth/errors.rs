use thiserror::Error;

/// Authorization errors raised before a workflow touches the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required.")]
    AuthenticationRequired,

    #[error("Admin access required")]
    AdminRequired,
}
