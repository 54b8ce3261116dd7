pub mod competition;
pub mod request;
pub mod user;

pub use competition::*;
pub use request::*;
pub use user::*;
