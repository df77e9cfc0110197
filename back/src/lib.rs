pub mod auth;
pub mod config;
pub mod handlers;
pub mod relation;
pub mod router;
pub mod store;
pub mod template;
pub mod users;
pub mod views;

use std::{path::Path, sync::Arc};

use axum::Router;
use todos_api::v1::{routes, EditorConfig};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{auth::Sessions, store::TodoStore, users::UserDirectory};

pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub users: Arc<dyn UserDirectory>,
    pub sessions: Sessions,
    pub editor: EditorConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            store,
            users,
            sessions: Sessions::default(),
            editor: EditorConfig::default(),
        }
    }
}

/// Registers every route and the static assets on top of `state`.
pub fn app(state: Arc<AppState>, assets_dir: impl AsRef<Path>) -> Router {
    router::router()
        .nest_service(routes::ASSETS, ServeDir::new(assets_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
