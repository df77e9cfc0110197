use todos_api::v1::{element, routes, EditorConfig, TodoItem, UserAccount, EDITOR_OBJECT};

use crate::{
    relation::UserTodos,
    template::{escape, Bindings, Fragment, Render},
};

const LAYOUT: &str = include_str!("../templates/layout.html");
const INDEX: &str = include_str!("../templates/index.html");
const SHOW_USERS_TODOS: &str = include_str!("../templates/show_users_todos.html");
const GREETING: &str = include_str!("../templates/greeting.html");
const EDIT_TODOS: &str = include_str!("../templates/edit_todos.html");
const LOGIN: &str = include_str!("../templates/login.html");
const NOT_FOUND: &str = include_str!("../templates/not_found.html");

pub const NO_CONTRIBUTORS: &str = "<h3>No users with Todos yet.</h3>";
pub const EDITOR_MODULE: &str = "/assets/pkg/todos_front.js";

pub fn no_todos_yet(display_name: &str) -> String {
    format!("<h3>{} doesn't have any todos yet.</h3>", escape(display_name))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Script {
    /// Exposes a JSON object as `window.<object>`.
    Localize { object: &'static str, json: String },
    Module(&'static str),
}

impl Script {
    fn to_html(&self) -> String {
        match self {
            Script::Localize { object, json } => {
                let json = json.replace("</", "<\\/");
                format!("<script>window.{object} = {json};</script>")
            }
            Script::Module(src) => format!(
                "<script type=\"module\">import init from \"{}\"; init();</script>",
                escape(src)
            ),
        }
    }
}

/// A page body plus everything the layout needs around it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub content: Fragment,
    pub scripts: Vec<Script>,
}

impl Page {
    pub fn new(title: impl Into<String>, content: Fragment) -> Self {
        Self {
            title: title.into(),
            content,
            scripts: Vec::new(),
        }
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.scripts.push(script);
        self
    }

    pub fn render(&self) -> String {
        let scripts: String = self.scripts.iter().map(Script::to_html).collect();
        let bindings = Bindings::new()
            .text("title", &self.title)
            .html("content", self.content.as_str())
            .html("scripts", scripts);

        Fragment::new(LAYOUT).apply(&bindings).into_string()
    }
}

impl Render for TodoItem {
    fn bindings(&self) -> Bindings {
        Bindings::new()
            .text("id", self.id)
            .text("description", &self.description)
            .text("status", if self.completed { "completed" } else { "open" })
            .html("checked", if self.completed { "checked" } else { "" })
            .text("description_input_id", element::description_input(self.id))
            .text("completed_checkbox_id", element::completed_checkbox(self.id))
    }
}

impl Render for UserAccount {
    fn bindings(&self) -> Bindings {
        Bindings::new()
            .text("display_name", &self.display_name)
            .text("slug", &self.slug)
            .text("view_link", routes::user_todos(&self.slug))
    }
}

impl Render for UserTodos {
    fn bindings(&self) -> Bindings {
        self.user
            .bindings()
            .text("finished_count", self.completed_count())
            .text("unfinished_count", self.incomplete_count())
    }
}

pub fn index(contributors: &[UserTodos]) -> Page {
    let template = Fragment::new(INDEX);
    let row = template.copy("todos_user");

    let rows: String = (contributors.iter())
        .map(|contributor| contributor.render(&row).into_string())
        .collect();
    let rows = if rows.is_empty() {
        String::from(NO_CONTRIBUTORS)
    } else {
        rows
    };

    Page::new("Todos", template.replace("todos_user", rows))
}

pub fn user_todos(user_todos: &UserTodos) -> Page {
    let template = Fragment::new(SHOW_USERS_TODOS);
    let row = template.copy("existing_todos");

    let rows: String = (user_todos.todos.iter())
        .map(|todo| todo.render(&row).into_string())
        .collect();

    let mut output = user_todos
        .user
        .render(&template)
        .replace("existing_todos", &rows);
    if rows.is_empty() {
        output = output.replace("has_todos", no_todos_yet(&user_todos.user.display_name));
    }

    let title = format!("{}'s todos", user_todos.user.display_name);
    Page::new(title, output)
}

pub fn greeting(slug: &str) -> Page {
    let content = Fragment::new(GREETING).apply(&Bindings::new().text("slug", slug));
    Page::new("Todos", content)
}

pub fn edit_todos(todos: &[TodoItem], config: &EditorConfig) -> Page {
    let template = Fragment::new(EDIT_TODOS);
    let row = template.copy("existing_todo_form");
    let form = template
        .copy("new_todo_form")
        .apply(&Bindings::new().text("target_link", routes::CREATE_TODO));

    let rows: String = (todos.iter())
        .map(|todo| todo.render(&row).into_string())
        .collect();

    let mut output = template
        .replace("new_todo_form", form.as_str())
        .replace("existing_todo_form", rows);
    if todos.is_empty() {
        output = output.replace("existing_todos", "");
    }

    let json = serde_json::to_string(config).unwrap_or_else(|_| String::from("{}"));
    Page::new("My todos", output)
        .with_script(Script::Localize {
            object: EDITOR_OBJECT,
            json,
        })
        .with_script(Script::Module(EDITOR_MODULE))
}

pub fn login(redirect_to: &str, slug: &str, error: Option<&str>) -> Page {
    let template = Fragment::new(LOGIN);
    let template = match error {
        Some(message) => {
            let error = template
                .copy("login_error")
                .apply(&Bindings::new().text("message", message));
            template.replace("login_error", error.as_str())
        }
        None => template.replace("login_error", ""),
    };

    let bindings = Bindings::new()
        .text("login_link", routes::LOGIN)
        .text("redirect_to", redirect_to)
        .text("slug", slug);

    Page::new("Log in", template.apply(&bindings))
}

pub fn not_found() -> Page {
    Page::new("Page not found", Fragment::new(NOT_FOUND))
}
