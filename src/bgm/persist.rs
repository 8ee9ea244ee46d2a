//! Playback position persistence across page loads
//!
//! The index page and each game page remember their own track and playhead,
//! so a visitor bouncing between pages hears each page's music continue.

use crate::storage::KeyValueStore;

/// Which page family the player is running on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackScope {
    Index,
    Game(String),
}

impl PlaybackScope {
    pub const URL_KEY: &'static str = "bgm-last-url";
    pub const POS_KEY: &'static str = "bgm-last-pos";

    pub fn url_key(&self) -> String {
        match self {
            PlaybackScope::Index => Self::URL_KEY.to_string(),
            PlaybackScope::Game(slug) => format!("{}:{}", Self::URL_KEY, slug),
        }
    }

    pub fn pos_key(&self) -> String {
        match self {
            PlaybackScope::Index => Self::POS_KEY.to_string(),
            PlaybackScope::Game(slug) => format!("{}:{}", Self::POS_KEY, slug),
        }
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            PlaybackScope::Index => None,
            PlaybackScope::Game(slug) => Some(slug),
        }
    }
}

/// Last track and playhead
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub url: String,
    /// Seconds into the track
    pub position: f64,
}

impl PlaybackSnapshot {
    pub fn save(&self, store: &dyn KeyValueStore, scope: &PlaybackScope) {
        store.set(&scope.url_key(), &self.url);
        store.set(&scope.pos_key(), &format!("{:.2}", self.position.max(0.0)));
    }

    pub fn load(store: &dyn KeyValueStore, scope: &PlaybackScope) -> Option<Self> {
        let url = store.get(&scope.url_key()).filter(|u| !u.trim().is_empty())?;
        let position = store.get_f64(&scope.pos_key()).unwrap_or(0.0).max(0.0);
        Some(Self { url, position })
    }

    pub fn clear(store: &dyn KeyValueStore, scope: &PlaybackScope) {
        store.remove(&scope.url_key());
        store.remove(&scope.pos_key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_scopes_are_separate() {
        let store = MemoryStore::new();
        let index = PlaybackScope::Index;
        let game = PlaybackScope::Game("zeta".into());

        PlaybackSnapshot { url: "a.mp3".into(), position: 12.5 }.save(&store, &index);
        assert!(PlaybackSnapshot::load(&store, &game).is_none());

        PlaybackSnapshot { url: "b.mp3".into(), position: 3.0 }.save(&store, &game);
        assert_eq!(
            PlaybackSnapshot::load(&store, &index),
            Some(PlaybackSnapshot { url: "a.mp3".into(), position: 12.5 })
        );
        assert_eq!(store.get("bgm-last-url:zeta").as_deref(), Some("b.mp3"));
    }

    #[test]
    fn test_bad_position_defaults_to_zero() {
        let store = MemoryStore::new();
        store.set("bgm-last-url", "a.mp3");
        store.set("bgm-last-pos", "oops");
        assert_eq!(
            PlaybackSnapshot::load(&store, &PlaybackScope::Index).map(|s| s.position),
            Some(0.0)
        );
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::new();
        let scope = PlaybackScope::Index;
        PlaybackSnapshot { url: "a.mp3".into(), position: 1.0 }.save(&store, &scope);
        PlaybackSnapshot::clear(&store, &scope);
        assert!(store.is_empty());
    }
}
