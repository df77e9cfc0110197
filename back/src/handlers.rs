//! Request handlers.
//!
//! Each handler takes the caller (if authenticated) and the request
//! parameters and answers with a [`Reply`]. Mutations triggered by the inline
//! editor never report failures, they just leave the store untouched.

use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderValue, StatusCode,
    },
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use todos_api::v1::{routes, TodoId, UserId};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::{expired_session_cookie, login_url, safe_redirect, session_cookie},
    relation,
    store::TodoFilter,
    views::{self, Page},
    AppState,
};

pub const LOGIN_FAILED: &str = "Unknown user or wrong password.";

#[derive(Debug)]
pub enum Reply {
    Page(Page),
    Unauthorized(Page),
    NotFound,
    Redirect {
        location: String,
        cookie: Option<String>,
    },
    /// 200 with no body.
    Empty,
}

impl Reply {
    pub fn redirect(location: impl Into<String>) -> Self {
        Reply::Redirect {
            location: location.into(),
            cookie: None,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Page(page) => Html(page.render()).into_response(),
            Reply::Unauthorized(page) => {
                (StatusCode::UNAUTHORIZED, Html(page.render())).into_response()
            }
            Reply::NotFound => {
                (StatusCode::NOT_FOUND, Html(views::not_found().render())).into_response()
            }
            Reply::Redirect { location, cookie } => {
                let location = HeaderValue::from_str(&location).unwrap_or_else(|_| {
                    debug!(location = ?location, "replaced unusable redirect target");
                    HeaderValue::from_static(routes::INDEX)
                });
                let cookies = cookie.map(|cookie| (SET_COOKIE, cookie));

                (
                    StatusCode::SEE_OTHER,
                    AppendHeaders(cookies),
                    [(LOCATION, location)],
                )
                    .into_response()
            }
            Reply::Empty => StatusCode::OK.into_response(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DescriptionForm {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub redirect_to: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub redirect_to: String,
}

pub async fn index(state: &AppState) -> Reply {
    let contributors = relation::contributors(&*state.users, &*state.store).await;
    Reply::Page(views::index(&contributors))
}

pub async fn show_user_todos(state: &AppState, slug: &str) -> Reply {
    match relation::find_by_slug(&*state.users, &*state.store, slug).await {
        Some(user_todos) => Reply::Page(views::user_todos(&user_todos)),
        None => Reply::NotFound,
    }
}

pub async fn show_todos_list(state: &AppState, slug: &str) -> Reply {
    if slug.is_empty() || state.users.find_by_slug(slug).is_none() {
        return Reply::NotFound;
    }

    Reply::Page(views::greeting(slug))
}

pub async fn edit_todos_list(state: &AppState, user: Option<UserId>) -> Reply {
    let Some(user) = user else {
        return Reply::redirect(login_url(routes::MY_TODOS));
    };

    let todos = state.store.find_all(TodoFilter::Owner(user)).await;
    Reply::Page(views::edit_todos(&todos, &state.editor))
}

/// Always ends on the edit page, whether or not a todo was created.
pub async fn create_todo(state: &AppState, user: Option<UserId>, description: Option<&str>) -> Reply {
    let back = Reply::redirect(routes::MY_TODOS);

    let (Some(user), Some(description)) = (user, description) else {
        debug!(authenticated = user.is_some(), "ignored todo creation");
        return back;
    };

    match state.store.create(user, description).await {
        Ok(todo) => info!(
            id = %todo.id,
            owner = %todo.owner_id,
            description = %todo.description,
            "created todo"
        ),
        Err(err) => debug!(owner = %user, "ignored todo creation: {}", err),
    }

    back
}

pub async fn update_todo(
    state: &AppState,
    user: Option<UserId>,
    id: Option<TodoId>,
    description: Option<&str>,
) -> Reply {
    let (Some(user), Some(id), Some(description)) = (user, id, description) else {
        debug!("ignored todo update");
        return Reply::Empty;
    };

    if !owns(state, user, id).await {
        return Reply::Empty;
    }

    match state.store.update(id, description).await {
        Ok(todo) => info!(
            id = %todo.id,
            description = ?todo.description,
            "updated todo description"
        ),
        Err(err) => debug!(id = %id, "ignored todo update: {}", err),
    }

    Reply::Empty
}

pub async fn toggle_todo(state: &AppState, user: Option<UserId>, id: Option<TodoId>) -> Reply {
    let (Some(user), Some(id)) = (user, id) else {
        debug!("ignored todo toggle");
        return Reply::Empty;
    };

    if !owns(state, user, id).await {
        return Reply::Empty;
    }

    match state.store.toggle_completed(id).await {
        Ok(todo) => info!(
            id = %todo.id,
            completed = todo.completed,
            "toggled todo"
        ),
        Err(err) => debug!(id = %id, "ignored todo toggle: {}", err),
    }

    Reply::Empty
}

async fn owns(state: &AppState, user: UserId, id: TodoId) -> bool {
    match state.store.find_by_id(id).await {
        Some(todo) if todo.owner_id == user => true,
        Some(todo) => {
            debug!(id = %id, owner = %todo.owner_id, caller = %user, "not the owner");
            false
        }
        None => {
            debug!(id = %id, "no such todo");
            false
        }
    }
}

pub async fn login_form(redirect_to: Option<&str>) -> Reply {
    let redirect_to = safe_redirect(redirect_to.unwrap_or(routes::MY_TODOS));
    Reply::Page(views::login(redirect_to, "", None))
}

pub async fn login(state: &AppState, form: &LoginForm) -> Reply {
    let redirect_to = safe_redirect(&form.redirect_to);

    let Some(user) = state.users.authenticate(&form.slug, &form.password) else {
        info!(slug = %form.slug, "rejected login");
        return Reply::Unauthorized(views::login(redirect_to, &form.slug, Some(LOGIN_FAILED)));
    };

    let token = state.sessions.start(user.id).await;
    info!(user = %user.id, slug = %user.slug, "logged in");

    Reply::Redirect {
        location: String::from(redirect_to),
        cookie: Some(session_cookie(token)),
    }
}

pub async fn logout(state: &AppState, token: Option<Uuid>) -> Reply {
    if let Some(token) = token {
        if let Some(user) = state.sessions.end(token).await {
            info!(user = %user, "logged out");
        }
    }

    Reply::Redirect {
        location: String::from(routes::INDEX),
        cookie: Some(expired_session_cookie()),
    }
}
