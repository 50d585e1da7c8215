use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::database::models::Bookmark;
use crate::handlers::dto::{parse_id, CreateBookmarkDto, EditBookmarkDto, Valid};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

/// GET /bookmarks - Bookmarks owned by the caller
pub async fn list(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
) -> ApiResult<Vec<Bookmark>> {
    let bookmarks = state.bookmarks.list_owned(user.id).await?;
    Ok(ApiResponse::success(bookmarks))
}

/// POST /bookmarks - Create a bookmark owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Valid(input): Valid<CreateBookmarkDto>,
) -> ApiResult<Bookmark> {
    let bookmark = state.bookmarks.create(user.id, input).await?;
    Ok(ApiResponse::created(bookmark))
}

/// GET /bookmarks/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Bookmark> {
    let id = parse_id(&id)?;
    let bookmark = state.bookmarks.get_owned(user.id, id).await?;
    Ok(ApiResponse::success(bookmark))
}

/// PATCH /bookmarks/:id - Partial update; omitted fields are kept
pub async fn edit(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
    Valid(patch): Valid<EditBookmarkDto>,
) -> ApiResult<Bookmark> {
    let id = parse_id(&id)?;
    let bookmark = state.bookmarks.update_owned(user.id, id, patch).await?;
    Ok(ApiResponse::success(bookmark))
}

/// DELETE /bookmarks/:id - 204 on success
pub async fn delete(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.bookmarks.delete_owned(user.id, id).await?;
    Ok(ApiResponse::no_content())
}
