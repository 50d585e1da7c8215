use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::services::ServiceError;

/// The authenticated caller, confirmed to still exist in the store
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

/// Middleware that loads the user named by the token. A token for a user that
/// no longer exists is rejected as unauthenticated.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = match state.users.me(auth_user.user_id).await {
        Ok(user) => user,
        Err(ServiceError::NotFound(_)) => {
            tracing::warn!("User validation failed: user {} no longer exists", auth_user.user_id);
            return Err(ApiError::unauthorized("User no longer exists"));
        }
        Err(other) => return Err(other.into()),
    };

    tracing::debug!("User validation successful: {} ({})", user.id, user.email);

    request.extensions_mut().insert(ValidatedUser(user));
    Ok(next.run(request).await)
}
