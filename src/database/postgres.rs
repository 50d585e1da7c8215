use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::database::models::{
    Bookmark, BookmarkFilter, BookmarkPatch, NewBookmark, NewUser, User, UserFilter, UserPatch,
};
use crate::database::store::{EntityStore, Store, StoreError};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, created_at, updated_at";
const BOOKMARK_COLUMNS: &str = "id, owner_id, title, link, description, created_at, updated_at";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT,
        last_name TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookmarks (
        id BIGSERIAL PRIMARY KEY,
        owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        link TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS bookmarks_owner_id_idx ON bookmarks (owner_id)",
];

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the users and bookmarks tables if they are missing
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map unique (23505) and foreign key (23503) violations onto the store taxonomy
fn write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.code().as_deref(), Some("23505") | Some("23503")) {
            return StoreError::ConstraintViolation(db.message().to_string());
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl EntityStore<User> for PgStore {
    async fn get(&self, id: i64) -> Result<User, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found::<User>(id))
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            "SELECT {} FROM users WHERE ($1::TEXT IS NULL OR email = $1) ORDER BY id",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(filter.email.as_deref())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn create(&self, draft: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&draft.email)
            .bind(&draft.password_hash)
            .bind(&draft.first_name)
            .bind(&draft.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET \
               email = COALESCE($2, email), \
               first_name = COALESCE($3, first_name), \
               last_name = COALESCE($4, last_name), \
               updated_at = now() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&patch.email)
            .bind(&patch.first_name)
            .bind(&patch.last_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)?
            .ok_or_else(|| StoreError::not_found::<User>(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found::<User>(id));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Bookmark> for PgStore {
    async fn get(&self, id: i64) -> Result<Bookmark, StoreError> {
        let sql = format!("SELECT {} FROM bookmarks WHERE id = $1", BOOKMARK_COLUMNS);
        sqlx::query_as::<_, Bookmark>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found::<Bookmark>(id))
    }

    async fn list(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, StoreError> {
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE ($1::BIGINT IS NULL OR owner_id = $1) ORDER BY id",
            BOOKMARK_COLUMNS
        );
        let bookmarks = sqlx::query_as::<_, Bookmark>(&sql)
            .bind(filter.owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(bookmarks)
    }

    async fn create(&self, draft: NewBookmark) -> Result<Bookmark, StoreError> {
        let sql = format!(
            "INSERT INTO bookmarks (owner_id, title, link, description) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            BOOKMARK_COLUMNS
        );
        sqlx::query_as::<_, Bookmark>(&sql)
            .bind(draft.owner_id)
            .bind(&draft.title)
            .bind(&draft.link)
            .bind(&draft.description)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)
    }

    async fn update(&self, id: i64, patch: BookmarkPatch) -> Result<Bookmark, StoreError> {
        let sql = format!(
            "UPDATE bookmarks SET \
               title = COALESCE($2, title), \
               link = COALESCE($3, link), \
               description = COALESCE($4, description), \
               updated_at = now() \
             WHERE id = $1 RETURNING {}",
            BOOKMARK_COLUMNS
        );
        sqlx::query_as::<_, Bookmark>(&sql)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.link)
            .bind(&patch.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)?
            .ok_or_else(|| StoreError::not_found::<Bookmark>(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found::<Bookmark>(id));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
