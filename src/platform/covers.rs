//! Inline cover rotation on the index page

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, HtmlImageElement, HtmlVideoElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit,
};

use super::cards::{self, CardElements};
use super::dom;
use super::host::WebAssetHost;
use crate::events::{EventBus, ShowcaseEvent};
use crate::media::{EMPTY_GALLERY_TEXT, MediaKind};
use crate::prefs::Preferences;
use crate::probe::{FallbackChain, MediaTarget, discover_logo};
use crate::rotator::{CoverRotator, RotatorCommand, RotatorTiming};
use crate::storage::KeyValueStore;
use crate::tuning::Tuning;
use crate::visibility::{CardGeometry, VisibilityChange, VisibilityTracker};

pub struct CoversView {
    rotator: RefCell<CoverRotator>,
    tracker: RefCell<VisibilityTracker>,
    cards: Vec<CardElements>,
    videos: RefCell<HashMap<String, HtmlVideoElement>>,
    prefs: RefCell<Preferences>,
    local: Rc<dyn KeyValueStore>,
    session: Rc<dyn KeyValueStore>,
    bus: EventBus,
}

impl CoversView {
    #[allow(clippy::too_many_arguments)]
    pub fn mount(
        cards: Vec<CardElements>,
        host: WebAssetHost,
        bus: EventBus,
        tuning: Rc<Tuning>,
        prefs: Preferences,
        local: Rc<dyn KeyValueStore>,
        session: Rc<dyn KeyValueStore>,
        mobile: bool,
    ) -> Rc<Self> {
        let view = Rc::new(Self {
            rotator: RefCell::new(CoverRotator::new(
                RotatorTiming::from(tuning.as_ref()),
                prefs.inline_unmuted,
            )),
            tracker: RefCell::new(VisibilityTracker::new(dom::viewport_height())),
            cards,
            videos: RefCell::new(HashMap::new()),
            prefs: RefCell::new(prefs),
            local,
            session,
            bus,
        });

        {
            let weak = Rc::downgrade(&view);
            view.tracker.borrow_mut().subscribe(move |change: &VisibilityChange| {
                let Some(view) = weak.upgrade() else {
                    return;
                };
                match change {
                    VisibilityChange::Visibility { card, visible } => {
                        view.rotator.borrow_mut().set_visible(card, *visible)
                    }
                    VisibilityChange::Focus { focused } => {
                        view.rotator.borrow_mut().set_focused(focused.as_deref())
                    }
                }
            });
        }

        view.observe();
        view.wire_controls();
        view.discover(host, tuning.clone(), mobile);

        let tick_view = view.clone();
        dom::set_interval(tuning.rotator_tick_ms, move || {
            tick_view.rotator.borrow_mut().tick(dom::now_ms());
            tick_view.flush();
        });
        view
    }

    fn card(&self, slug: &str) -> Option<&CardElements> {
        self.cards.iter().find(|c| c.slug == slug)
    }

    fn slug_of(&self, cover: &Element) -> Option<String> {
        self.cards
            .iter()
            .find(|c| &c.cover == cover)
            .map(|c| c.slug.clone())
    }

    /// Probe each card's media folder and logo concurrently
    fn discover(self: &Rc<Self>, host: WebAssetHost, tuning: Rc<Tuning>, mobile: bool) {
        let pending = Rc::new(Cell::new(self.cards.len()));
        if self.cards.is_empty() {
            self.bus.emit(ShowcaseEvent::CoversReady);
            return;
        }
        for card in &self.cards {
            let view = self.clone();
            let tuning = tuning.clone();
            let pending = pending.clone();
            let slug = card.slug.clone();
            let folder = card.root.get_attribute("data-folder");
            wasm_bindgen_futures::spawn_local(async move {
                let target = MediaTarget::new(folder.as_deref(), Some(&slug), mobile).with_default_folder();
                let items = FallbackChain::for_gallery(&target)
                    .run(&host, &target, &tuning)
                    .await;
                view.media_ready(&slug, items);

                if let Some(card) = view.card(&slug) {
                    if let Some(logo) = discover_logo(&host, &card.game).await {
                        cards::show_logo(card, &logo);
                    }
                }

                pending.set(pending.get().saturating_sub(1));
                if pending.get() == 0 {
                    log::info!("All cover media discovered");
                    view.bus.emit(ShowcaseEvent::CoversReady);
                }
            });
        }
    }

    fn media_ready(&self, slug: &str, items: Vec<String>) {
        if items.is_empty() {
            if let Some(card) = self.card(slug) {
                card.media.set_inner_html("");
                if let Some(empty) = dom::create("div", "gallery-empty") {
                    empty.set_text_content(Some(EMPTY_GALLERY_TEXT));
                    let _ = card.media.append_child(&empty);
                }
            }
            return;
        }
        let visible = self.tracker.borrow().is_visible(slug);
        let focused = self.tracker.borrow().focused().map(str::to_string);
        {
            let mut rotator = self.rotator.borrow_mut();
            rotator.set_media(slug, items);
            rotator.set_visible(slug, visible);
            rotator.set_focused(focused.as_deref());
        }
        self.flush();
    }

    /// IntersectionObserver feeds the tracker; scroll/resize refresh geometry
    fn observe(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let Some(view) = weak.upgrade() else {
                return;
            };
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let Some(slug) = view.slug_of(&entry.target()) else {
                    continue;
                };
                let rect = entry.bounding_client_rect();
                view.tracker.borrow_mut().update(
                    &slug,
                    CardGeometry {
                        intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                        top: rect.top(),
                        bottom: rect.bottom(),
                    },
                );
            }
            view.flush();
        });

        let init = IntersectionObserverInit::new();
        let thresholds = js_sys::Array::of3(&0.0.into(), &0.25.into(), &0.5.into());
        init.set_threshold(&thresholds);
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                for card in &self.cards {
                    observer.observe(&card.cover);
                }
            }
            Err(e) => log::warn!("IntersectionObserver unavailable: {:?}", e),
        }
        callback.forget();

        if let Some(window) = dom::window() {
            for name in ["scroll", "resize"] {
                let weak = Rc::downgrade(self);
                dom::listen(&window, name, move |_event: Event| {
                    if let Some(view) = weak.upgrade() {
                        view.refresh_geometry();
                    }
                });
            }
        }
    }

    fn refresh_geometry(&self) {
        let height = dom::viewport_height();
        let mut tracker = self.tracker.borrow_mut();
        tracker.set_viewport_height(height);
        for card in &self.cards {
            let rect = card.cover.get_bounding_client_rect();
            let (top, bottom) = (rect.top(), rect.bottom());
            let shown = (bottom.min(height) - top.max(0.0)).max(0.0);
            let ratio = if rect.height() > 0.0 {
                shown / rect.height()
            } else {
                0.0
            };
            tracker.update(
                &card.slug,
                CardGeometry {
                    intersecting: shown > 0.0,
                    ratio,
                    top,
                    bottom,
                },
            );
        }
        drop(tracker);
        self.flush();
    }

    fn wire_controls(self: &Rc<Self>) {
        for card in &self.cards {
            for (button, forward) in [(&card.prev, false), (&card.next, true)] {
                let weak = Rc::downgrade(self);
                let slug = card.slug.clone();
                dom::listen(button, "click", move |event: Event| {
                    event.prevent_default();
                    if let Some(view) = weak.upgrade() {
                        view.rotator
                            .borrow_mut()
                            .manual_step(&slug, forward, dom::now_ms());
                        view.flush();
                    }
                });
            }

            // Rotated videos come and go; the media slot outlives them
            let weak = Rc::downgrade(self);
            let slug = card.slug.clone();
            dom::listen_capture(&card.media, "ended", move |event: Event| {
                let from_video = dom::event_element(&event)
                    .is_some_and(|el| el.dyn_ref::<HtmlVideoElement>().is_some());
                if !from_video {
                    return;
                }
                if let Some(view) = weak.upgrade() {
                    view.rotator.borrow_mut().video_ended(&slug);
                    view.flush();
                }
            });

            let weak = Rc::downgrade(self);
            let slug = card.slug.clone();
            dom::listen(&card.mute, "click", move |event: Event| {
                event.prevent_default();
                if let Some(view) = weak.upgrade() {
                    view.toggle_sound(&slug);
                }
            });
        }
    }

    /// Mute button: unmuting opts this session into inline audio
    fn toggle_sound(&self, slug: &str) {
        let audible = self.rotator.borrow().audible_card() == Some(slug);
        {
            let mut prefs = self.prefs.borrow_mut();
            prefs.inline_unmuted = !audible;
            prefs.save_inline(self.local.as_ref(), self.session.as_ref());
        }
        self.rotator.borrow_mut().set_user_unmuted(!audible);
        self.flush();
    }

    /// Apply queued rotator commands to the DOM
    fn flush(&self) {
        let commands = self.rotator.borrow_mut().drain_commands();
        for command in commands {
            match command {
                RotatorCommand::Show {
                    slug,
                    index,
                    url,
                    kind,
                } => self.show(&slug, index, &url, kind),
                RotatorCommand::Progress { slug, fraction } => {
                    if let Some(card) = self.card(&slug) {
                        match fraction {
                            Some(f) => {
                                dom::set_style(&card.progress, "visibility", "visible");
                                if let Some(bar) = card.progress.first_element_child() {
                                    dom::set_style(&bar, "width", &format!("{:.1}%", f * 100.0));
                                }
                            }
                            None => dom::set_style(&card.progress, "visibility", "hidden"),
                        }
                    }
                }
                RotatorCommand::Mute { slug, muted } => {
                    if let Some(video) = self.videos.borrow().get(&slug) {
                        video.set_muted(muted);
                    }
                    if let Some(card) = self.card(&slug) {
                        card.mute.set_text_content(Some(if muted { "🔇" } else { "🔊" }));
                    }
                    self.bus.emit(ShowcaseEvent::InlineAudible {
                        slug,
                        audible: !muted,
                    });
                }
            }
        }
    }

    fn show(&self, slug: &str, index: usize, url: &str, kind: MediaKind) {
        let Some(card) = self.card(slug) else {
            return;
        };
        if let Some(old) = self.videos.borrow_mut().remove(slug) {
            let _ = old.pause();
        }
        card.media.set_inner_html("");

        match kind {
            MediaKind::Image => {
                let Some(img) = dom::create_as::<HtmlImageElement>("img", "cover-item") else {
                    return;
                };
                img.set_src(url);
                img.set_alt(&format!("{} cover {}", slug, index + 1));
                let _ = card.media.append_child(&img);
                dom::set_style(&card.mute, "display", "none");
            }
            MediaKind::Video => {
                let Some(video) = dom::create_as::<HtmlVideoElement>("video", "cover-item") else {
                    return;
                };
                video.set_muted(true);
                video.set_autoplay(true);
                let _ = video.set_attribute("playsinline", "");
                video.set_volume(self.prefs.borrow().inline_volume as f64);
                video.set_src(url);

                let _ = card.media.append_child(&video);
                dom::set_style(&card.mute, "display", "block");
                self.videos.borrow_mut().insert(slug.to_string(), video);
            }
        }
    }
}
