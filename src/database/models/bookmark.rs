use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::store::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub owner_id: i64,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookmarkFilter {
    pub owner_id: Option<i64>,
}

impl Entity for Bookmark {
    type Draft = NewBookmark;
    type Patch = BookmarkPatch;
    type Filter = BookmarkFilter;

    const KIND: EntityKind = EntityKind::Bookmark;
}

impl BookmarkPatch {
    pub fn apply_to(self, bookmark: &mut Bookmark) {
        if let Some(title) = self.title {
            bookmark.title = title;
        }
        if let Some(link) = self.link {
            bookmark.link = link;
        }
        if let Some(description) = self.description {
            bookmark.description = Some(description);
        }
    }
}

impl BookmarkFilter {
    pub fn owned_by(owner_id: i64) -> Self {
        Self { owner_id: Some(owner_id) }
    }

    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        self.owner_id.map_or(true, |owner| bookmark.owner_id == owner)
    }
}
