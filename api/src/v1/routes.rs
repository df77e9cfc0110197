//! Path patterns shared by the router and the pages linking to it.

pub const INDEX: &str = "/todos";
pub const USER_TODOS: &str = "/todos/:slug";
pub const GREETING: &str = "/todos/:slug/greeting";
pub const MY_TODOS: &str = "/mytodos";
pub const CREATE_TODO: &str = "/todo/create";
pub const UPDATE_TODO: &str = "/todo/update/:id";
pub const TOGGLE_TODO: &str = "/todo/toggle/:id";
pub const LOGIN: &str = "/login";
pub const LOGOUT: &str = "/logout";
pub const ASSETS: &str = "/assets";

pub const UPDATE_TODO_PREFIX: &str = "/todo/update/";
pub const TOGGLE_TODO_PREFIX: &str = "/todo/toggle/";

pub fn user_todos(slug: &str) -> String {
    format!("{INDEX}/{slug}")
}
