use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{
    Bookmark, BookmarkFilter, BookmarkPatch, NewBookmark, NewUser, User, UserFilter, UserPatch,
};
use crate::database::store::{EntityStore, Store, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    bookmarks: BTreeMap<i64, Bookmark>,
    user_seq: i64,
    bookmark_seq: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// In-process store. Every operation holds the table lock for its whole
/// duration, so each call is isolated and concurrent updates are last-writer-wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore<User> for MemoryStore {
    async fn get(&self, id: i64) -> Result<User, StoreError> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<User>(id))
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&draft.email, None) {
            return Err(StoreError::ConstraintViolation(format!(
                "email '{}' is already registered",
                draft.email
            )));
        }

        tables.user_seq += 1;
        let now = Utc::now();
        let user = User {
            id: tables.user_seq,
            email: draft.email,
            password_hash: draft.password_hash,
            first_name: draft.first_name,
            last_name: draft.last_name,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let mut user = tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<User>(id))?;

        if let Some(email) = patch.email.as_deref() {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::ConstraintViolation(format!(
                    "email '{}' is already registered",
                    email
                )));
            }
        }

        patch.apply_to(&mut user);
        user.updated_at = Utc::now();
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .users
            .remove(&id)
            .ok_or_else(|| StoreError::not_found::<User>(id))?;
        // owner reference cascades
        tables.bookmarks.retain(|_, b| b.owner_id != id);
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Bookmark> for MemoryStore {
    async fn get(&self, id: i64) -> Result<Bookmark, StoreError> {
        let tables = self.tables.read().await;
        tables
            .bookmarks
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<Bookmark>(id))
    }

    async fn list(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookmarks
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: NewBookmark) -> Result<Bookmark, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&draft.owner_id) {
            return Err(StoreError::ConstraintViolation(format!(
                "owner {} does not exist",
                draft.owner_id
            )));
        }

        tables.bookmark_seq += 1;
        let now = Utc::now();
        let bookmark = Bookmark {
            id: tables.bookmark_seq,
            owner_id: draft.owner_id,
            title: draft.title,
            link: draft.link,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };
        tables.bookmarks.insert(bookmark.id, bookmark.clone());
        Ok(bookmark)
    }

    async fn update(&self, id: i64, patch: BookmarkPatch) -> Result<Bookmark, StoreError> {
        let mut tables = self.tables.write().await;
        let bookmark = tables
            .bookmarks
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found::<Bookmark>(id))?;

        patch.apply_to(bookmark);
        bookmark.updated_at = Utc::now();
        Ok(bookmark.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .bookmarks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found::<Bookmark>(id))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
