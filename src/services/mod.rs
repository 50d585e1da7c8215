pub mod bookmark_service;
pub mod error;
pub mod ownership;
pub mod user_service;

pub use bookmark_service::{BookmarkService, CreateBookmark};
pub use error::ServiceError;
pub use ownership::{authorize, Access, Owned};
pub use user_service::{AccessToken, Credentials, UserService};
