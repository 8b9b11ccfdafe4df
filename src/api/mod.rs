//! HTTP handlers and routing

pub mod books;
pub mod openapi;
pub mod pages;
pub mod search;
pub mod session;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{error::AppError, AppState};

use self::session::Session;

/// Path that stays reachable without a session
pub const LOGIN_PATH: &str = "/login";

/// Username of the logged-in user, attached by [`require_login`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Authentication("Not logged in".to_string()))
    }
}

/// Redirect to the login page unless the session names an existing user
pub async fn require_login(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.uri().path() == LOGIN_PATH {
        return Ok(next.run(request).await);
    }

    if let Some(username) = session.username() {
        if state.services.users.exists(&username).await? {
            request.extensions_mut().insert(CurrentUser(username));
            return Ok(next.run(request).await);
        }
        tracing::debug!(username, "Session names an unknown user");
    }

    Ok(Redirect::temporary(LOGIN_PATH).into_response())
}

/// Fail fast with 500 when the database is unreachable
pub async fn verify_database(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.services.repository.ping().await?;
    Ok(next.run(request).await)
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route(LOGIN_PATH, get(pages::login_form).post(pages::login))
        .route("/logout", get(pages::logout).post(pages::logout))
        .route("/books", get(books::list_books).put(books::add_book))
        .route("/books/:pk", delete(books::delete_book))
        .route("/search", post(search::search))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(middleware::from_fn_with_state(state.clone(), require_login))
        .layer(middleware::from_fn_with_state(state.clone(), verify_database))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
