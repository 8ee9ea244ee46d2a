//! User preferences
//!
//! Persisted in local storage under the keys the site has always used, so a
//! visitor's choice survives upgrades of this crate.

use crate::storage::KeyValueStore;

/// Explicit background-music preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundPref {
    #[default]
    On,
    Off,
}

impl SoundPref {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundPref::On => "on",
            SoundPref::Off => "off",
        }
    }

    /// Anything other than an explicit "off" counts as on
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("off") {
            SoundPref::Off
        } else {
            SoundPref::On
        }
    }

    pub fn is_on(&self) -> bool {
        *self == SoundPref::On
    }
}

/// Persisted preferences
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    /// Background music on/off
    pub sound: SoundPref,
    /// Background music target volume (0.0 - 1.0), `None` = use tuning max
    pub bgm_volume: Option<f32>,
    /// Volume for inline cover videos (0.0 - 1.0)
    pub inline_volume: f32,
    /// User unmuted an inline video during this session
    pub inline_unmuted: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound: SoundPref::On,
            bgm_volume: None,
            inline_volume: 1.0,
            inline_unmuted: false,
        }
    }
}

impl Preferences {
    pub const SOUND_KEY: &'static str = "sound-pref";
    pub const BGM_VOLUME_KEY: &'static str = "bgm-volume";
    pub const INLINE_VOLUME_KEY: &'static str = "ogv:inlineVolume";
    pub const INLINE_UNMUTED_KEY: &'static str = "ogv:inlineUnmuted";

    /// Load from local storage (indefinite prefs) and session storage (per-tab flags)
    pub fn load(local: &dyn KeyValueStore, session: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            sound: local
                .get(Self::SOUND_KEY)
                .map(|s| SoundPref::parse(&s))
                .unwrap_or(defaults.sound),
            bgm_volume: local
                .get_f64(Self::BGM_VOLUME_KEY)
                .map(|v| (v as f32).clamp(0.0, 1.0)),
            inline_volume: local
                .get_f64(Self::INLINE_VOLUME_KEY)
                .map(|v| (v as f32).clamp(0.0, 1.0))
                .unwrap_or(defaults.inline_volume),
            inline_unmuted: session.get(Self::INLINE_UNMUTED_KEY).as_deref() == Some("1"),
        }
    }

    pub fn save_sound(&self, local: &dyn KeyValueStore) {
        local.set(Self::SOUND_KEY, self.sound.as_str());
        log::debug!("Sound preference saved: {}", self.sound.as_str());
    }

    pub fn save_bgm_volume(&self, local: &dyn KeyValueStore) {
        if let Some(vol) = self.bgm_volume {
            local.set(Self::BGM_VOLUME_KEY, &format!("{:.3}", vol));
        }
    }

    pub fn save_inline(&self, local: &dyn KeyValueStore, session: &dyn KeyValueStore) {
        local.set(Self::INLINE_VOLUME_KEY, &format!("{:.3}", self.inline_volume));
        if self.inline_unmuted {
            session.set(Self::INLINE_UNMUTED_KEY, "1");
        } else {
            session.remove(Self::INLINE_UNMUTED_KEY);
        }
    }
}
