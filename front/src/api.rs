use std::sync::OnceLock;

use reqwest::{Request, Result};
use todos_api::v1::TodoId;

use crate::editor::Endpoints;

pub static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn client() -> &'static reqwest::Client {
    CLIENT.get_or_init(reqwest::Client::new)
}

pub fn update_todo(endpoints: &Endpoints, id: TodoId, description: &str) -> Result<Request> {
    client()
        .post(endpoints.update_url(id))
        .form(&[("description", description)])
        .build()
}

pub fn toggle_todo(endpoints: &Endpoints, id: TodoId) -> Result<Request> {
    client().post(endpoints.toggle_url(id)).build()
}

/// Sends `request` in the background. The response is never looked at.
#[cfg(target_arch = "wasm32")]
pub fn fire(request: Result<Request>) {
    let Ok(request) = request else {
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let _ = client().execute(request).await;
    });
}
