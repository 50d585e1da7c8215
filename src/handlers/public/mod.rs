pub mod auth;
pub mod status;

pub use auth::{signin, signup};
pub use status::{health, root};
