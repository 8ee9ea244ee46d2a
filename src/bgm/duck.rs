//! Tracks which other audio sources are playing on the page

use std::collections::BTreeSet;

use crate::events::ShowcaseEvent;

#[derive(Debug, Default)]
pub struct DuckSources {
    lightbox_video: bool,
    inline: BTreeSet<String>,
}

impl DuckSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ducked(&self) -> bool {
        self.lightbox_video || !self.inline.is_empty()
    }

    /// Feed a bus event; returns the new ducked state when it changed
    pub fn observe(&mut self, event: &ShowcaseEvent) -> Option<bool> {
        let before = self.is_ducked();
        match event {
            ShowcaseEvent::LightboxVideoPlay => self.lightbox_video = true,
            ShowcaseEvent::LightboxVideoPause
            | ShowcaseEvent::LightboxVideoEnded
            | ShowcaseEvent::LightboxClose => self.lightbox_video = false,
            ShowcaseEvent::InlineAudible { slug, audible: true } => {
                self.inline.insert(slug.clone());
            }
            ShowcaseEvent::InlineAudible { slug, audible: false } => {
                self.inline.remove(slug);
            }
            _ => return None,
        }
        let after = self.is_ducked();
        (before != after).then_some(after)
    }
}
