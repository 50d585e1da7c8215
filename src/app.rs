use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{IdentityProvider, JwtIdentity};
use crate::config::{ApiConfig, SecurityConfig};
use crate::database::store::Store;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};
use crate::services::{BookmarkService, UserService};

/// Shared per-process handles. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub users: UserService,
    pub bookmarks: BookmarkService,
}

impl AppState {
    pub fn new<S: Store + 'static>(store: Arc<S>, identity: Arc<JwtIdentity>) -> Self {
        Self {
            users: UserService::new(store.clone(), identity.clone()),
            bookmarks: BookmarkService::new(store.clone()),
            identity,
            store,
        }
    }
}

/// Build the full router: public routes, protected routes behind the
/// bearer-token and user-validation layers, and the global layers.
pub fn router(state: AppState, api: &ApiConfig, security: &SecurityConfig) -> Router {
    let mut app = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(|| async { ApiError::not_found("Route not found") })
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .with_state(state);

    if security.enable_cors {
        app = app.layer(cors_layer(&security.cors_origins));
    }
    if api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/signup", post(public::signup))
        .route("/auth/signin", post(public::signin))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::patch;
    use protected::{bookmarks, users};

    Router::new()
        .route("/users/me", get(users::me))
        .route("/users", patch(users::edit))
        .route("/bookmarks", get(bookmarks::list).post(bookmarks::create))
        .route(
            "/bookmarks/:id",
            get(bookmarks::get)
                .patch(bookmarks::edit)
                .delete(bookmarks::delete),
        )
        // last added runs first: token resolution, then user validation
        .route_layer(middleware::from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
