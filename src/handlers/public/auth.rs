use axum::extract::State;

use crate::app::AppState;
use crate::handlers::dto::{AuthDto, Valid};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AccessToken;

/// POST /auth/signup - Register with email + password, returns `{ access_token }`
pub async fn signup(
    State(state): State<AppState>,
    Valid(credentials): Valid<AuthDto>,
) -> ApiResult<AccessToken> {
    let token = state.users.signup(credentials).await?;
    Ok(ApiResponse::created(token))
}

/// POST /auth/signin - Exchange email + password for `{ access_token }`
pub async fn signin(
    State(state): State<AppState>,
    Valid(credentials): Valid<AuthDto>,
) -> ApiResult<AccessToken> {
    let token = state.users.signin(credentials).await?;
    Ok(ApiResponse::success(token))
}
