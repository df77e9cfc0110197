//! Event wiring for the edit page.

use std::rc::Rc;

use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::{api, editor, editor::Endpoints};

const DESCRIPTION: &str = ".existing_todo_description";
const DESCRIPTION_INPUT: &str = ".existing_todo_desc_input";
const COMPLETED: &str = ".completed input";

pub fn install(document: &Document, endpoints: Endpoints) -> Result<(), JsValue> {
    let endpoints = Rc::new(endpoints);

    for description in query_all(document, DESCRIPTION)? {
        let target = description.clone();
        listen(&description, "dblclick", move |_| begin_edit(&target))?;
    }

    for input in query_all(document, &format!("{DESCRIPTION_INPUT} input"))? {
        let Ok(input) = input.dyn_into::<HtmlInputElement>() else {
            continue;
        };
        let target = input.clone();
        let endpoints = endpoints.clone();
        listen(&input, "keyup", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                finish_edit(&target, &event.key(), &endpoints);
            }
        })?;
    }

    for checkbox in query_all(document, COMPLETED)? {
        let id = checkbox.id();
        let endpoints = endpoints.clone();
        listen(&checkbox, "click", move |_| {
            if let Some(id) = editor::toggle_target(&id) {
                api::fire(api::toggle_todo(&endpoints, id));
            }
        })?;
    }

    Ok(())
}

fn begin_edit(description: &Element) {
    set_display(description, Some("none"));

    let input = (description.parent_element())
        .and_then(|row| row.query_selector(DESCRIPTION_INPUT).ok().flatten());
    if let Some(input) = input {
        set_display(&input, Some("inline"));
    }
}

fn finish_edit(input: &HtmlInputElement, key: &str, endpoints: &Endpoints) {
    let value = input.value();
    let Some(confirmed) = editor::confirm(key, &input.id(), &value) else {
        return;
    };

    let wrapper = input.parent_element();
    if let Some(wrapper) = &wrapper {
        set_display(wrapper, Some("none"));
    }

    let description = (wrapper.and_then(|wrapper| wrapper.parent_element()))
        .and_then(|row| row.query_selector(DESCRIPTION).ok().flatten());
    if let Some(description) = description {
        description.set_text_content(Some(&confirmed.description));
        set_display(&description, None);
    }

    if let Some(id) = confirmed.id {
        api::fire(api::update_todo(endpoints, id, &confirmed.description));
    }
}

fn set_display(element: &Element, display: Option<&str>) {
    let Some(element) = element.dyn_ref::<HtmlElement>() else {
        return;
    };

    let style = element.style();
    let _ = match display {
        Some(display) => style.set_property("display", display),
        None => style.remove_property("display").map(|_| ()),
    };
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn listen(
    element: &Element,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    element.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
