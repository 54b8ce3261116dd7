//! Auth domain - bearer token verification
//!
//! Tokens are issued elsewhere; this service only needs to verify them and
//! expose the caller's id and admin flag.

pub mod jwt;

pub use jwt::{Claims, JwtService};
