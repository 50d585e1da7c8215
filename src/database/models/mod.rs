pub mod bookmark;
pub mod user;

pub use bookmark::{Bookmark, BookmarkFilter, BookmarkPatch, NewBookmark};
pub use user::{NewUser, User, UserFilter, UserPatch};
