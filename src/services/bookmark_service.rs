use std::sync::Arc;

use tracing::debug;

use crate::database::models::{Bookmark, BookmarkFilter, BookmarkPatch, NewBookmark};
use crate::database::store::{EntityStore, StoreError};
use crate::services::error::ServiceError;
use crate::services::ownership::authorize;

/// Validated input for a new bookmark
#[derive(Debug, Clone)]
pub struct CreateBookmark {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
}

/// Owner-scoped bookmark operations. Every call names the caller explicitly,
/// and a bookmark owned by someone else is reported exactly like a missing one.
#[derive(Clone)]
pub struct BookmarkService {
    store: Arc<dyn EntityStore<Bookmark>>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn EntityStore<Bookmark>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, caller_id: i64, input: CreateBookmark) -> Result<Bookmark, ServiceError> {
        let draft = NewBookmark {
            owner_id: caller_id,
            title: input.title,
            link: input.link,
            description: input.description,
        };
        let bookmark = self.store.create(draft).await?;
        debug!("User {} created bookmark {}", caller_id, bookmark.id);
        Ok(bookmark)
    }

    pub async fn list_owned(&self, caller_id: i64) -> Result<Vec<Bookmark>, ServiceError> {
        let mut bookmarks = self.store.list(&BookmarkFilter::owned_by(caller_id)).await?;
        // guard every disclosed row, not just single fetches
        bookmarks.retain(|b| authorize(b, caller_id).is_allowed());
        Ok(bookmarks)
    }

    pub async fn get_owned(&self, caller_id: i64, id: i64) -> Result<Bookmark, ServiceError> {
        self.fetch_owned(caller_id, id).await
    }

    pub async fn update_owned(
        &self,
        caller_id: i64,
        id: i64,
        patch: BookmarkPatch,
    ) -> Result<Bookmark, ServiceError> {
        self.fetch_owned(caller_id, id).await?;
        let bookmark = self.store.update(id, patch).await?;
        debug!("User {} updated bookmark {}", caller_id, id);
        Ok(bookmark)
    }

    pub async fn delete_owned(&self, caller_id: i64, id: i64) -> Result<(), ServiceError> {
        self.fetch_owned(caller_id, id).await?;
        self.store.delete(id).await?;
        debug!("User {} deleted bookmark {}", caller_id, id);
        Ok(())
    }

    async fn fetch_owned(&self, caller_id: i64, id: i64) -> Result<Bookmark, ServiceError> {
        let bookmark = match self.store.get(id).await {
            Ok(bookmark) => bookmark,
            Err(StoreError::NotFound { .. }) => return Err(not_found(id)),
            Err(other) => return Err(other.into()),
        };

        if !authorize(&bookmark, caller_id).is_allowed() {
            debug!(
                "Ownership check denied user {} access to bookmark {} (owner {})",
                caller_id, id, bookmark.owner_id
            );
            return Err(not_found(id));
        }
        Ok(bookmark)
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("bookmark {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{NewUser, User};

    async fn setup() -> (Arc<MemoryStore>, BookmarkService) {
        let store = Arc::new(MemoryStore::new());
        let service = BookmarkService::new(store.clone());
        (store, service)
    }

    async fn add_user(store: &MemoryStore, email: &str) -> i64 {
        let draft = NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
        };
        EntityStore::<User>::create(store, draft).await.unwrap().id
    }

    fn input(title: &str) -> CreateBookmark {
        CreateBookmark {
            title: title.to_string(),
            link: "http://x".to_string(),
            description: Some("about x".to_string()),
        }
    }

    #[tokio::test]
    async fn create_sets_owner_to_caller() {
        let (store, service) = setup().await;
        let uid = add_user(&store, "a@x.com").await;

        let bookmark = service.create(uid, input("First")).await.unwrap();
        assert_eq!(bookmark.owner_id, uid);
        assert_eq!(bookmark.title, "First");
    }

    #[tokio::test]
    async fn other_users_cannot_see_bookmark() {
        let (store, service) = setup().await;
        let owner = add_user(&store, "a@x.com").await;
        let other = add_user(&store, "b@x.com").await;
        let bookmark = service.create(owner, input("First")).await.unwrap();

        let err = service.get_owned(other, bookmark.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn denied_and_absent_look_the_same() {
        let (store, service) = setup().await;
        let owner = add_user(&store, "a@x.com").await;
        let other = add_user(&store, "b@x.com").await;
        let bookmark = service.create(owner, input("First")).await.unwrap();

        let denied = service.get_owned(other, bookmark.id).await.unwrap_err();
        service.delete_owned(owner, bookmark.id).await.unwrap();
        let absent = service.get_owned(other, bookmark.id).await.unwrap_err();

        assert_eq!(denied.to_string(), absent.to_string());
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let (store, service) = setup().await;
        let owner = add_user(&store, "a@x.com").await;
        let before = service.create(owner, input("First")).await.unwrap();

        let patch = BookmarkPatch {
            title: Some("X".to_string()),
            ..Default::default()
        };
        let updated = service.update_owned(owner, before.id, patch).await.unwrap();

        assert_eq!(updated.title, "X");
        assert_eq!(updated.link, before.link);
        assert_eq!(updated.description, before.description);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn foreign_update_and_delete_leave_bookmark_intact() {
        let (store, service) = setup().await;
        let owner = add_user(&store, "a@x.com").await;
        let other = add_user(&store, "b@x.com").await;
        let bookmark = service.create(owner, input("First")).await.unwrap();

        let patch = BookmarkPatch {
            title: Some("hijacked".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_owned(other, bookmark.id, patch).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_owned(other, bookmark.id).await,
            Err(ServiceError::NotFound(_))
        ));

        let stored = service.get_owned(owner, bookmark.id).await.unwrap();
        assert_eq!(stored, bookmark);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let (store, service) = setup().await;
        let owner = add_user(&store, "a@x.com").await;
        let bookmark = service.create(owner, input("First")).await.unwrap();

        service.delete_owned(owner, bookmark.id).await.unwrap();
        assert!(matches!(
            service.get_owned(owner, bookmark.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_owned(owner, bookmark.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_owned_excludes_other_users() {
        let (store, service) = setup().await;
        let a = add_user(&store, "a@x.com").await;
        let b = add_user(&store, "b@x.com").await;
        service.create(a, input("a1")).await.unwrap();
        service.create(b, input("b1")).await.unwrap();
        service.create(a, input("a2")).await.unwrap();

        let owned = service.list_owned(a).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|bm| bm.owner_id == a));

        assert!(service.list_owned(999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scenario_create_list_deny_delete() {
        let (store, service) = setup().await;
        let uid = add_user(&store, "a@x.com").await;
        assert_eq!(uid, 1);

        let bookmark = service
            .create(
                uid,
                CreateBookmark {
                    title: "First".to_string(),
                    link: "http://x".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let listed = service.list_owned(uid).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, bookmark.id);
        assert_eq!(listed[0].title, "First");

        assert!(matches!(
            service.get_owned(2, bookmark.id).await,
            Err(ServiceError::NotFound(_))
        ));

        service.delete_owned(uid, bookmark.id).await.unwrap();
        assert!(service.list_owned(uid).await.unwrap().is_empty());
    }
}
