//! Full-screen lightbox viewer

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{
    Element, Event, HtmlImageElement, HtmlVideoElement, KeyboardEvent, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, TouchEvent,
};

use super::dom;
use crate::events::{EventBus, ShowcaseEvent};
use crate::gallery::{INDEX_ATTR, Lightbox, LightboxAction, OpenTarget, POSTER_ATTR, thumbnail_source};
use crate::media::{MediaKind, is_video};
use crate::tuning::Tuning;

pub struct LightboxView {
    state: RefCell<Lightbox>,
    root: Element,
    image: HtmlImageElement,
    video: HtmlVideoElement,
    thumbs: Element,
    bus: EventBus,
    swipe_threshold: f64,
}

impl LightboxView {
    /// Build the viewer DOM once and wire its controls
    pub fn mount(bus: EventBus, tuning: &Tuning) -> Option<Rc<Self>> {
        let body = dom::body()?;
        let root = dom::create("div", "lightbox")?;
        let _ = root.set_attribute("role", "dialog");
        let _ = root.set_attribute("aria-modal", "true");

        let image: HtmlImageElement = dom::create_as("img", "")?;
        let video: HtmlVideoElement = dom::create_as("video", "")?;
        video.set_controls(true);
        let _ = video.set_attribute("playsinline", "");
        dom::set_style(&video, "max-width", "90%");
        dom::set_style(&video, "max-height", "80%");

        let controls = dom::create("div", "controls")?;
        let prev = dom::create("span", "arrow")?;
        prev.set_text_content(Some("❮"));
        let next = dom::create("span", "arrow")?;
        next.set_text_content(Some("❯"));
        let _ = controls.append_child(&prev);
        let _ = controls.append_child(&next);

        let thumbs = dom::create("div", "thumbs")?;

        let _ = root.append_child(&image);
        let _ = root.append_child(&video);
        let _ = root.append_child(&controls);
        let _ = root.append_child(&thumbs);
        let _ = body.append_child(&root);

        let view = Rc::new(Self {
            state: RefCell::new(Lightbox::new()),
            root,
            image,
            video,
            thumbs,
            bus,
            swipe_threshold: tuning.swipe_threshold_px,
        });
        view.wire(&prev, &next);
        Some(view)
    }

    fn wire(self: &Rc<Self>, prev: &Element, next: &Element) {
        {
            let view = self.clone();
            dom::listen(next, "click", move |event: Event| {
                event.stop_propagation();
                let moved = view.state.borrow_mut().show_next();
                view.apply(LightboxAction::Moved { index: moved });
            });
        }
        {
            let view = self.clone();
            dom::listen(prev, "click", move |event: Event| {
                event.stop_propagation();
                let moved = view.state.borrow_mut().show_prev();
                view.apply(LightboxAction::Moved { index: moved });
            });
        }
        {
            // Backdrop or image click closes
            let view = self.clone();
            dom::listen(&self.root, "click", move |event: Event| {
                let Some(target) = event.target() else {
                    return;
                };
                let on_backdrop = target
                    .dyn_ref::<Element>()
                    .is_some_and(|el| el == &view.root || el == view.image.unchecked_ref::<Element>());
                if on_backdrop {
                    view.close();
                }
            });
        }
        if let Some(document) = dom::document() {
            let view = self.clone();
            dom::listen(&document, "keydown", move |event: Event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
                    return;
                };
                let action = view.state.borrow_mut().handle_key(&key);
                view.apply(action);
            });
        }
        {
            let view = self.clone();
            dom::listen(&self.root, "touchstart", move |event: Event| {
                if let Some(x) = first_touch_x(&event) {
                    view.state.borrow_mut().touch_start(x);
                }
            });
        }
        {
            let view = self.clone();
            dom::listen(&self.root, "touchend", move |event: Event| {
                if let Some(x) = first_touch_x(&event) {
                    let action = view.state.borrow_mut().touch_end(x, view.swipe_threshold);
                    view.apply(action);
                }
            });
        }
        {
            let view = self.clone();
            dom::listen(&self.thumbs, "click", move |event: Event| {
                event.stop_propagation();
                let Some(index) = dom::target_index(&event) else {
                    return;
                };
                let selected = view.state.borrow_mut().select(index);
                if let Some(index) = selected {
                    view.apply(LightboxAction::Moved { index });
                }
            });
        }
        dom::fallback_posters(&self.thumbs);
        for (name, event) in [
            ("play", ShowcaseEvent::LightboxVideoPlay),
            ("pause", ShowcaseEvent::LightboxVideoPause),
            ("ended", ShowcaseEvent::LightboxVideoEnded),
        ] {
            let bus = self.bus.clone();
            dom::listen(&self.video, name, move |_event: Event| {
                bus.emit(event.clone());
            });
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    pub fn open(self: &Rc<Self>, items: Vec<String>, target: OpenTarget) {
        let opened = self.state.borrow_mut().open(items, target);
        if !opened {
            return;
        }
        self.build_thumbs();
        self.render();
        dom::set_style(&self.root, "display", "flex");
        if let Some(body) = dom::body() {
            dom::set_class(&body, "no-scroll", true);
        }
        self.bus.emit(ShowcaseEvent::LightboxOpen);
    }

    pub fn close(&self) {
        let closed = self.state.borrow_mut().close();
        if closed {
            self.close_effects();
        }
    }

    fn apply(&self, action: LightboxAction) {
        match action {
            LightboxAction::Ignored => {}
            LightboxAction::Closed => self.close_effects(),
            LightboxAction::Moved { .. } => self.render(),
        }
    }

    /// DOM side of a close that the state machine already performed
    fn close_effects(&self) {
        self.stop_video();
        dom::set_style(&self.root, "display", "none");
        if let Some(body) = dom::body() {
            dom::set_class(&body, "no-scroll", false);
        }
        self.bus.emit(ShowcaseEvent::LightboxClose);
    }

    fn stop_video(&self) {
        let _ = self.video.pause();
        let _ = self.video.remove_attribute("src");
        self.video.load();
    }

    fn render(&self) {
        let current = self
            .state
            .borrow()
            .current()
            .map(|(url, kind)| (url.to_string(), kind));
        let Some((url, kind)) = current else {
            return;
        };
        match kind {
            MediaKind::Video => {
                dom::set_style(&self.image, "display", "none");
                dom::set_style(&self.video, "display", "block");
                self.video.set_src(&url);
                if let Ok(promise) = self.video.play() {
                    // Rejections (autoplay policy) are expected and ignored
                    wasm_bindgen_futures::spawn_local(async move {
                        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
                    });
                }
            }
            MediaKind::Image => {
                let _ = self.video.pause();
                dom::set_style(&self.video, "display", "none");
                dom::set_style(&self.image, "display", "block");
                self.image.set_src(&url);
            }
        }
        self.update_active_thumb();
    }

    /// Tiles are plain markup; the strip's delegated listeners handle them
    fn build_thumbs(&self) {
        self.thumbs.set_inner_html("");
        let items: Vec<String> = self.state.borrow().items().to_vec();
        for (index, src) in items.iter().enumerate() {
            let class = if is_video(src) { "thumb video" } else { "thumb" };
            let Some(tile) = dom::create("div", class) else {
                continue;
            };
            let Some(img) = dom::create_as::<HtmlImageElement>("img", "") else {
                continue;
            };
            img.set_src(&thumbnail_source(src));
            if is_video(src) {
                let _ = img.set_attribute(POSTER_ATTR, "");
            }
            let _ = img.set_attribute("loading", "lazy");
            let _ = img.set_attribute("decoding", "async");
            img.set_alt(&format!("media {}", index + 1));
            let _ = tile.append_child(&img);
            let _ = tile.set_attribute(INDEX_ATTR, &index.to_string());
            let _ = self.thumbs.append_child(&tile);
        }
    }

    fn update_active_thumb(&self) {
        let current = self.state.borrow().index();
        let tiles = dom::query_all(&self.thumbs, ".thumb");
        for (i, tile) in tiles.iter().enumerate() {
            dom::set_class(tile, "active", i == current);
        }
        if let Some(tile) = tiles.get(current) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Nearest);
            options.set_inline(ScrollLogicalPosition::Center);
            tile.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}

fn first_touch_x(event: &Event) -> Option<f64> {
    let touch = event.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
    Some(touch.client_x() as f64)
}
