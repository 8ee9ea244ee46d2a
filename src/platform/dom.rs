//! Small DOM helpers shared by the views

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CustomEvent, CustomEventInit, Document, Element, Event, EventTarget,
    HtmlElement, HtmlImageElement, Window,
};

use crate::events::ShowcaseEvent;
use crate::gallery;
use crate::tuning::{self, Tuning};

pub fn window() -> Option<Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

pub fn body() -> Option<HtmlElement> {
    document().and_then(|d| d.body())
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

pub fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

pub fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_document(selector: &str) -> Vec<Element> {
    document()
        .and_then(|d| d.document_element())
        .map(|root| query_all(&root, selector))
        .unwrap_or_default()
}

/// Create `<tag class="...">`
pub fn create(tag: &str, class: &str) -> Option<Element> {
    let el = document()?.create_element(tag).ok()?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Some(el)
}

pub fn create_as<T: JsCast>(tag: &str, class: &str) -> Option<T> {
    create(tag, class)?.dyn_into::<T>().ok()
}

pub fn set_style(el: &Element, property: &str, value: &str) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        let _ = el.style().set_property(property, value);
    }
}

pub fn clear_style(el: &Element, property: &str) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        let _ = el.style().remove_property(property);
    }
}

pub fn set_class(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

pub fn data(el: &Element, name: &str) -> Option<String> {
    el.get_attribute(&format!("data-{}", name))
        .filter(|v| !v.trim().is_empty())
}

/// Attach a listener for the lifetime of the page
pub fn listen(target: &EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(_)>::new(handler);
    let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Non-passive listener so the handler may call `prevent_default`
pub fn listen_active(target: &EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(_)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        closure.as_ref().unchecked_ref(),
        &options,
    );
    closure.forget();
}

/// Capture-phase listener, for events like `error` and `ended` that do not bubble
pub fn listen_capture(target: &EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(_)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_capture(true);
    let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
        name,
        closure.as_ref().unchecked_ref(),
        &options,
    );
    closure.forget();
}

/// Element that dispatched `event`
pub fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// `data-index` of the nearest tagged ancestor of the event target
pub fn target_index(event: &Event) -> Option<usize> {
    let tile = event_element(event)?
        .closest(&format!("[{}]", gallery::INDEX_ATTR))
        .ok()
        .flatten()?;
    gallery::parse_index(&tile.get_attribute(gallery::INDEX_ATTR)?)
}

/// Swap failed video posters inside `container` for the placeholder.
/// One listener serves every thumbnail the container will ever hold.
pub fn fallback_posters(container: &Element) {
    listen_capture(container, "error", |event: Event| {
        let Some(img) = event_element(&event)
            .filter(|el| el.has_attribute(gallery::POSTER_ATTR))
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        else {
            return;
        };
        if img.src() != gallery::thumbnail_fallback() {
            img.set_src(gallery::thumbnail_fallback());
        }
    });
}

pub fn set_interval(ms: f64, mut handler: impl FnMut() + 'static) -> Option<i32> {
    let window = window()?;
    let closure = Closure::<dyn FnMut()>::new(move || handler());
    let id = window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ms as i32,
        )
        .ok();
    closure.forget();
    id
}

pub fn clear_interval(id: i32) {
    if let Some(window) = window() {
        window.clear_interval_with_handle(id);
    }
}

pub fn set_timeout(ms: f64, handler: impl FnOnce() + 'static) {
    if let Some(window) = window() {
        let callback = Closure::once_into_js(handler);
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            ms as i32,
        );
    }
}

pub fn viewport_height() -> f64 {
    window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

pub fn matches_media(query: &str) -> bool {
    window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|list| list.matches())
        .unwrap_or(false)
}

/// Coarse pointer without hover, or a narrow viewport
pub fn is_mobile_like(tuning: &Tuning) -> bool {
    let coarse = matches_media("(hover: none) and (pointer: coarse)");
    let width = window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(f64::MAX);
    tuning::is_mobile_like(coarse, width, tuning)
}

/// `location.search` without the leading `?`
pub fn query_string() -> String {
    window()
        .and_then(|w| w.location().search().ok())
        .map(|s| s.trim_start_matches('?').to_string())
        .unwrap_or_default()
}

/// Swap the query string in place, no history entry
pub fn replace_query(query: &str) {
    let Some(window) = window() else {
        return;
    };
    let location = window.location();
    let path = location.pathname().unwrap_or_default();
    let hash = location.hash().unwrap_or_default();
    let url = if query.is_empty() {
        format!("{}{}", path, hash)
    } else {
        format!("{}?{}{}", path, query, hash)
    };
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&url));
    }
}

/// Mirror a bus event onto `document` as a `CustomEvent`
pub fn dispatch(event: &ShowcaseEvent) {
    let Some(document) = document() else {
        return;
    };
    let detail = js_sys::Object::new();
    match event {
        ShowcaseEvent::GamesRendered { count } => {
            let _ = js_sys::Reflect::set(&detail, &"count".into(), &(*count as f64).into());
        }
        ShowcaseEvent::InlineAudible { slug, audible } => {
            let _ = js_sys::Reflect::set(&detail, &"slug".into(), &slug.as_str().into());
            let _ = js_sys::Reflect::set(&detail, &"audible".into(), &(*audible).into());
        }
        ShowcaseEvent::SearchChanged { visible } => {
            let _ = js_sys::Reflect::set(&detail, &"visible".into(), &(*visible as f64).into());
        }
        _ => {}
    }
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    if let Ok(custom) = CustomEvent::new_with_event_init_dict(event.dom_name(), &init) {
        let _ = document.dispatch_event(&custom);
    }
}
