use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
    Form, Router,
};
use todos_api::v1::{routes, TodoId};

use crate::{
    auth::{session_token, CurrentUser},
    handlers::{self, DescriptionForm, LoginForm, LoginQuery, Reply},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(|| async { Redirect::to(routes::INDEX) }))
        .route(routes::INDEX, get(index))
        .route(routes::USER_TODOS, get(show_user_todos))
        .route(routes::GREETING, get(show_todos_list))
        .route(routes::MY_TODOS, get(edit_todos_list))
        .route(routes::CREATE_TODO, post(create_todo))
        .route(routes::UPDATE_TODO, post(update_todo))
        .route(routes::TOGGLE_TODO, post(toggle_todo))
        .route(routes::LOGIN, get(login_form).post(login))
        .route(routes::LOGOUT, get(logout))
}

async fn index(State(state): State<Arc<AppState>>) -> Reply {
    handlers::index(&state).await
}

async fn show_user_todos(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Reply {
    handlers::show_user_todos(&state, &slug).await
}

async fn show_todos_list(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Reply {
    handlers::show_todos_list(&state, &slug).await
}

async fn edit_todos_list(State(state): State<Arc<AppState>>, CurrentUser(user): CurrentUser) -> Reply {
    handlers::edit_todos_list(&state, user).await
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    form: Option<Form<DescriptionForm>>,
) -> Reply {
    let description = form.as_ref().and_then(|form| form.description.as_deref());
    handlers::create_todo(&state, user, description).await
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    id: Option<Path<TodoId>>,
    form: Option<Form<DescriptionForm>>,
) -> Reply {
    let id = id.map(|Path(id)| id);
    let description = form.as_ref().and_then(|form| form.description.as_deref());
    handlers::update_todo(&state, user, id, description).await
}

async fn toggle_todo(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    id: Option<Path<TodoId>>,
) -> Reply {
    let id = id.map(|Path(id)| id);
    handlers::toggle_todo(&state, user, id).await
}

async fn login_form(Query(query): Query<LoginQuery>) -> Reply {
    handlers::login_form(query.redirect_to.as_deref()).await
}

async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Reply {
    handlers::login(&state, &form).await
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Reply {
    handlers::logout(&state, session_token(&headers)).await
}
