use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::database::models::User;
use crate::handlers::dto::{EditUserDto, Valid};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

/// GET /users/me - The authenticated user's profile
pub async fn me(Extension(ValidatedUser(user)): Extension<ValidatedUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// PATCH /users - Edit email, firstName and lastName; omitted fields are kept
pub async fn edit(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Valid(patch): Valid<EditUserDto>,
) -> ApiResult<User> {
    let updated = state.users.edit(user.id, patch).await?;
    Ok(ApiResponse::success(updated))
}
