// HTTP routes
pub mod competitions;
pub mod health;
pub mod socket;

pub use competitions::*;
pub use health::*;
pub use socket::*;
