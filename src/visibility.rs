//! Visibility tracking for game cards
//!
//! Fed by the platform's intersection observer (or anything else that can
//! report card geometry), this service answers "is this card on screen" and
//! "which card is focused", and pushes changes to subscribers.

/// Geometry of a card relative to the viewport (px, viewport coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CardGeometry {
    pub intersecting: bool,
    /// Visible fraction reported by the observer (0.0 - 1.0)
    pub ratio: f64,
    pub top: f64,
    pub bottom: f64,
}

impl CardGeometry {
    pub fn visible(&self) -> bool {
        self.intersecting && self.ratio > 0.0
    }

    pub fn center(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Change notification pushed to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum VisibilityChange {
    Visibility { card: String, visible: bool },
    Focus { focused: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u32);

/// Per-card visibility and focus service
pub struct VisibilityTracker {
    viewport_height: f64,
    /// Registration order doubles as the focus tie-breaker
    cards: Vec<(String, CardGeometry)>,
    focused: Option<String>,
    next_id: u32,
    watchers: Vec<(WatchId, Box<dyn FnMut(&VisibilityChange)>)>,
}

impl std::fmt::Debug for VisibilityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("viewport_height", &self.viewport_height)
            .field("cards", &self.cards)
            .field("focused", &self.focused)
            .finish()
    }
}

impl VisibilityTracker {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            cards: Vec::new(),
            focused: None,
            next_id: 0,
            watchers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, watcher: impl FnMut(&VisibilityChange) + 'static) -> WatchId {
        self.next_id += 1;
        let id = WatchId(self.next_id);
        self.watchers.push((id, Box::new(watcher)));
        id
    }

    pub fn unsubscribe(&mut self, id: WatchId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|(wid, _)| *wid != id);
        self.watchers.len() != before
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
        self.refocus();
    }

    /// Record new geometry for a card (registers it on first sight)
    pub fn update(&mut self, card: &str, geometry: CardGeometry) {
        let was_visible = match self.cards.iter_mut().find(|(id, _)| id == card) {
            Some((_, g)) => {
                let was = g.visible();
                *g = geometry;
                was
            }
            None => {
                self.cards.push((card.to_string(), geometry));
                false
            }
        };

        if was_visible != geometry.visible() {
            self.notify(VisibilityChange::Visibility {
                card: card.to_string(),
                visible: geometry.visible(),
            });
        }
        self.refocus();
    }

    pub fn remove(&mut self, card: &str) {
        let Some(pos) = self.cards.iter().position(|(id, _)| id == card) else {
            return;
        };
        let (_, geometry) = self.cards.remove(pos);
        if geometry.visible() {
            self.notify(VisibilityChange::Visibility {
                card: card.to_string(),
                visible: false,
            });
        }
        self.refocus();
    }

    pub fn is_visible(&self, card: &str) -> bool {
        self.cards
            .iter()
            .find(|(id, _)| id == card)
            .is_some_and(|(_, g)| g.visible())
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn visible_cards(&self) -> impl Iterator<Item = &str> {
        self.cards
            .iter()
            .filter(|(_, g)| g.visible())
            .map(|(id, _)| id.as_str())
    }

    /// Visible card whose vertical centre is nearest the viewport centre
    fn compute_focus(&self) -> Option<String> {
        let mid = self.viewport_height / 2.0;
        let mut best: Option<(&str, f64)> = None;
        for (id, g) in &self.cards {
            if !g.visible() {
                continue;
            }
            let dist = (g.center() - mid).abs();
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((id, dist));
            }
        }
        best.map(|(id, _)| id.to_string())
    }

    fn refocus(&mut self) {
        let focus = self.compute_focus();
        if focus != self.focused {
            self.focused = focus.clone();
            self.notify(VisibilityChange::Focus { focused: focus });
        }
    }

    fn notify(&mut self, change: VisibilityChange) {
        for (_, watcher) in self.watchers.iter_mut() {
            watcher(&change);
        }
    }
}
