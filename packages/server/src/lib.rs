// Competition Request Workflow - API Core
//
// This crate mediates requests to create competitions: users submit them,
// every admin gets the request in their inbox, and any admin approves or
// rejects it.
//
// The workflow lives in domains/competitions/actions.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
