//! HTML pages: collection, login and logout

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookFilter, SortColumn},
        user::{LoginAction, LoginForm},
    },
    templates::{IndexPage, LoginPage},
    AppState,
};

use super::{
    session::{Session, FILTER, SORT_BY, USER},
    CurrentUser, LOGIN_PATH,
};

/// Collection page, using the filter and order remembered in the session
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    session: Session,
) -> AppResult<Html<String>> {
    let filter = BookFilter::from_session(&session.get(FILTER));
    let sort = SortColumn::from_session(&session.get(SORT_BY));

    let books = state.services.catalog.list_books(&user, sort, filter).await?;

    let html = state.templates.render_index(&IndexPage {
        user: &user,
        filter,
        sort,
        books: &books,
    })?;
    Ok(Html(html))
}

/// Empty login / registration form
pub async fn login_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    Ok(Html(state.templates.render_login(&LoginPage::default())?))
}

/// Handle the login form: log in or register, depending on the button pressed
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let Some(action) = form.action() else {
        return login_form(State(state)).await.map(IntoResponse::into_response);
    };

    let outcome = match form.validate() {
        Err(errors) => Err(AppError::from(errors)),
        Ok(()) => match action {
            LoginAction::Register => state.services.users.register(&form.username, &form.password).await,
            LoginAction::Login => state.services.users.authenticate(&form.username, &form.password).await,
        },
    };

    match outcome {
        Ok(user) => {
            session.set(USER, user.username);
            Ok((session, Redirect::to("/")).into_response())
        }
        Err(
            err @ (AppError::Authentication(_) | AppError::Conflict(_) | AppError::Validation(_)),
        ) => {
            let page = LoginPage {
                error: Some(err.user_message()),
                username: form.username,
            };
            Ok(Html(state.templates.render_login(&page)?).into_response())
        }
        Err(err) => Err(err),
    }
}

/// Forget the user and their view preferences
pub async fn logout(mut session: Session) -> (Session, Redirect) {
    if let Some(username) = session.username() {
        tracing::info!(username, "User logged out");
    }
    session.clear(USER);
    session.clear(FILTER);
    session.clear(SORT_BY);
    (session, Redirect::to(LOGIN_PATH))
}
