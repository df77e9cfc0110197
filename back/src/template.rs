//! Named-placeholder HTML templates.
//!
//! A template is plain HTML with two kinds of names in it:
//!
//! - blocks, `<!-- name -->...<!-- /name -->`, which can be copied out as a
//!   fragment of their own or replaced as a whole,
//! - placeholders, `{{name}}`, which are replaced in place.
//!
//! Fragments are immutable, every substitution returns a new fragment.

use std::{collections::BTreeMap, fmt};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    html: String,
}

impl Fragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }

    /// Inner text of the first `name` block, or an empty fragment.
    pub fn copy(&self, name: &str) -> Fragment {
        let (open, close) = markers(name);
        let Some(start) = self.html.find(&open) else {
            return Fragment::default();
        };
        let inner = start + open.len();

        match self.html[inner..].find(&close) {
            Some(end) => Fragment::new(&self.html[inner..inner + end]),
            None => Fragment::default(),
        }
    }

    /// Replaces every `name` block and `{{name}}` placeholder with raw `html`.
    pub fn replace(&self, name: &str, html: impl AsRef<str>) -> Fragment {
        let html = html.as_ref();
        let replaced = replace_blocks(&self.html, name, html);
        Fragment::new(replaced.replace(&placeholder(name), html))
    }

    pub fn apply(&self, bindings: &Bindings) -> Fragment {
        (bindings.values.iter()).fold(self.clone(), |fragment, (name, value)| {
            fragment.replace(name, value.to_html())
        })
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Escaped on substitution.
    Text(String),
    Html(String),
}

impl Value {
    fn to_html(&self) -> String {
        match self {
            Value::Text(text) => escape(text),
            Value::Html(html) => html.clone(),
        }
    }
}

/// Typed mapping from placeholder name to value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<&'static str, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, text: impl ToString) -> Self {
        self.values.insert(name, Value::Text(text.to_string()));
        self
    }

    pub fn html(mut self, name: &'static str, html: impl Into<String>) -> Self {
        self.values.insert(name, Value::Html(html.into()));
        self
    }
}

/// Something that knows how to fill a template with its own fields.
pub trait Render {
    fn bindings(&self) -> Bindings;

    fn render(&self, fragment: &Fragment) -> Fragment {
        fragment.apply(&self.bindings())
    }
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn markers(name: &str) -> (String, String) {
    (format!("<!-- {name} -->"), format!("<!-- /{name} -->"))
}

fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

fn replace_blocks(html: &str, name: &str, with: &str) -> String {
    let (open, close) = markers(name);
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(&open) {
        let Some(end) = rest[start + open.len()..].find(&close) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(with);
        rest = &rest[start + open.len() + end + close.len()..];
    }

    out.push_str(rest);
    out
}
