//! Typed event bus for cross-component notifications
//!
//! Everything runs on the browser's UI thread, so listeners are plain
//! `FnMut` closures behind `Rc<RefCell<..>>`. A listener may emit or
//! (un)subscribe from inside its own callback: each emit works on a snapshot
//! of the listener list.

use std::cell::RefCell;
use std::rc::Rc;

/// Notifications shared between gallery, rotator, search and music
#[derive(Debug, Clone, PartialEq)]
pub enum ShowcaseEvent {
    /// Game cards are in the DOM
    GamesRendered { count: usize },
    /// Every card has its cover media list
    CoversReady,
    LightboxOpen,
    LightboxClose,
    LightboxVideoPlay,
    LightboxVideoPause,
    LightboxVideoEnded,
    /// An inline cover video became audible (or stopped being audible)
    InlineAudible { slug: String, audible: bool },
    /// Search re-ordered the list; `visible` cards remain
    SearchChanged { visible: usize },
}

impl ShowcaseEvent {
    /// Name of the matching DOM `CustomEvent` dispatched on `document`
    pub fn dom_name(&self) -> &'static str {
        match self {
            ShowcaseEvent::GamesRendered { .. } => "gamesRendered",
            ShowcaseEvent::CoversReady => "coversReady",
            ShowcaseEvent::LightboxOpen => "lightboxOpen",
            ShowcaseEvent::LightboxClose => "lightboxClose",
            ShowcaseEvent::LightboxVideoPlay => "lightboxVideoPlay",
            ShowcaseEvent::LightboxVideoPause => "lightboxVideoPause",
            ShowcaseEvent::LightboxVideoEnded => "lightboxVideoEnded",
            ShowcaseEvent::InlineAudible { .. } => "inlineAudible",
            ShowcaseEvent::SearchChanged { .. } => "searchChanged",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Listener = Rc<RefCell<dyn FnMut(&ShowcaseEvent)>>;

#[derive(Default)]
struct BusInner {
    next_id: u32,
    listeners: Vec<(SubscriptionId, Listener)>,
}

/// Cheaply clonable handle to a shared bus
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.inner.borrow().listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut(&ShowcaseEvent) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.listeners.push((id, Rc::new(RefCell::new(listener))));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != before
    }

    pub fn emit(&self, event: ShowcaseEvent) {
        let snapshot: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        log::debug!("event: {}", event.dom_name());
        for listener in snapshot {
            // A listener that re-emits into itself is skipped rather than panicking
            match listener.try_borrow_mut() {
                Ok(mut f) => f(&event),
                Err(_) => log::warn!("Skipped re-entrant listener for {}", event.dom_name()),
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}
