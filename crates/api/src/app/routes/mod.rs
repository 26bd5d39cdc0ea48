use axum::Router;

pub mod auth;
pub mod system;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new().nest("/auth", auth::public_router())
}

/// Endpoints that require a bearer token (the caller layers the auth middleware).
pub fn protected_router() -> Router {
    Router::new().nest("/auth", auth::protected_router())
}
