use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Bookmark, User};

/// Errors surfaced by every store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Bookmark,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Bookmark => write!(f, "bookmark"),
        }
    }
}

/// A persisted record kind. The associated types are the shapes the store
/// accepts for construction, partial update and listing.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Fields required to construct a new record
    type Draft: Send + Sync;
    /// Partial update; `None` fields keep their stored value
    type Patch: Send + Sync;
    /// Listing filter; `Default` matches everything
    type Filter: Default + Send + Sync;

    const KIND: EntityKind;
}

/// Persistence contract for one entity kind. Backends hold no business rules
/// beyond the constraints declared on the schema (unique email, owner reference).
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn get(&self, id: i64) -> Result<E, StoreError>;

    async fn list(&self, filter: &E::Filter) -> Result<Vec<E>, StoreError>;

    async fn create(&self, draft: E::Draft) -> Result<E, StoreError>;

    /// Applies every supplied field of `patch` or none of them
    async fn update(&self, id: i64, patch: E::Patch) -> Result<E, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// A backend that stores both entity kinds
#[async_trait]
pub trait Store: EntityStore<User> + EntityStore<Bookmark> {
    fn backend_name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;
}

impl StoreError {
    pub fn not_found<E: Entity>(id: i64) -> Self {
        StoreError::NotFound { kind: E::KIND, id }
    }
}
