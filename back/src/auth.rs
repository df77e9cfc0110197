//! Cookie sessions and the current-user extractor.

use std::{
    collections::HashMap,
    convert::Infallible,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap, HeaderValue},
};
use todos_api::v1::{routes, UserId};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::AppState;

pub const SESSION_COOKIE: &str = "todos_session";
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Clone, Copy, Debug)]
struct Session {
    user: UserId,
    issued: Instant,
}

/// In-process sessions. Expired ones are dropped on lookup and whenever a new
/// session starts.
#[derive(Debug)]
pub struct Sessions {
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl Default for Sessions {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl Sessions {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::default(),
        }
    }

    pub async fn start(&self, user: UserId) -> Uuid {
        let token = Uuid::new_v4();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, session| !self.expired(session));
        sessions.insert(
            token,
            Session {
                user,
                issued: Instant::now(),
            },
        );
        token
    }

    pub async fn user(&self, token: Uuid) -> Option<UserId> {
        let mut sessions = self.sessions.lock().await;
        let session = *sessions.get(&token)?;
        if self.expired(&session) {
            sessions.remove(&token);
            return None;
        }
        Some(session.user)
    }

    pub async fn end(&self, token: Uuid) -> Option<UserId> {
        let session = self.sessions.lock().await.remove(&token)?;
        Some(session.user)
    }

    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn expired(&self, session: &Session) -> bool {
        session.issued.elapsed() >= self.ttl
    }
}

/// The authenticated user, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub Option<UserId>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(CurrentUser(None));
        };

        Ok(CurrentUser(state.sessions.user(token).await))
    }
}

pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    (headers.get_all(COOKIE).iter())
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

pub fn session_cookie(token: Uuid) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_TTL.as_secs()
    )
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Login page url that sends the user back to `return_to` afterwards.
pub fn login_url(return_to: &str) -> String {
    format!(
        "{}?redirect_to={}",
        routes::LOGIN,
        urlencoding::encode(return_to)
    )
}

/// Only same-site paths are followed after login.
///
/// Browsers read `//host` and `/\host` as another origin, and strip tabs
/// and newlines before resolving.
pub fn safe_redirect(target: &str) -> &str {
    let local = target.starts_with('/')
        && !target.starts_with("//")
        && !(target.chars())
            .any(|c| c == '\\' || c.is_whitespace() || c.is_control())
        && HeaderValue::from_str(target).is_ok();

    if local {
        target
    } else {
        routes::MY_TODOS
    }
}
