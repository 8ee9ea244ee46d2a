//! Data-driven tuning for probing, rotation, fades and the starfield
//!
//! Every threshold here was picked by eye against real asset folders. They are
//! kept together so a page can override any subset through local storage
//! (`ogv:tuning`) without a rebuild.

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Default values
pub mod defaults {
    /// Numbered probe cap on desktop
    pub const NUMBERED_CAP: u32 = 30;
    /// Numbered probe cap on phones/tablets
    pub const NUMBERED_CAP_MOBILE: u32 = 10;
    /// Consecutive misses (with nothing found yet) that end numbered probing
    pub const MISS_LIMIT: u32 = 10;
    pub const MISS_LIMIT_MOBILE: u32 = 5;
    /// Once this many items are found, a miss past `GAP_STOP_AFTER_INDEX` ends probing
    pub const GAP_STOP_MIN_FOUND: usize = 3;
    pub const GAP_STOP_AFTER_INDEX: u32 = 6;
    /// Highest N tried for `assets/images/<key>-N.ext`
    pub const ROOT_PATTERN_MAX: u32 = 12;
    /// Candidate cap for root pattern probing on mobile
    pub const ROOT_PATTERN_MOBILE_CANDIDATES: usize = 9;

    /// Stop track discovery once this many tracks are found
    pub const TRACK_CAP: usize = 25;
    pub const TRACK_CAP_MOBILE: usize = 8;

    /// Volume ramp step (ms)
    pub const FADE_INTERVAL_MS: f64 = 120.0;
    /// Volume ramp length (ms)
    pub const FADE_DURATION_MS: f64 = 2000.0;
    /// Background music never goes louder than this
    pub const MAX_VOLUME: f32 = 0.2;
    /// Seconds before the end of a track at which the fade-out starts
    pub const END_FADE_SECS: f64 = 2.2;
    /// Tracks shorter than this never get an end fade (unknown durations report 0)
    pub const END_FADE_MIN_DURATION_SECS: f64 = 15.0;
    /// Playback position persistence cadence (ms)
    pub const PERSIST_INTERVAL_MS: f64 = 4000.0;
    /// How long the "click to enable sound" hint stays up (ms)
    pub const HINT_DURATION_MS: f64 = 3500.0;

    /// Cover rotator tick (ms)
    pub const ROTATOR_TICK_MS: f64 = 1000.0;
    /// Image dwell before advancing (ms)
    pub const DWELL_MS: f64 = 5000.0;
    /// Delay after a video ends before advancing (ms)
    pub const VIDEO_END_DELAY_MS: f64 = 5000.0;
    /// Auto-advance suppression after manual navigation (ms)
    pub const MANUAL_HOLD_MS: f64 = 20000.0;

    /// Minimum horizontal travel for a lightbox swipe (px)
    pub const SWIPE_THRESHOLD_PX: f64 = 40.0;
    /// Preview strip thumbnail base size and gap (px)
    pub const THUMB_BASE_PX: f64 = 120.0;
    pub const THUMB_GAP_PX: f64 = 10.0;

    /// Viewports at or below this width count as mobile-like (px)
    pub const MOBILE_MAX_WIDTH_PX: f64 = 600.0;

    pub const STAR_COUNT: usize = 140;
    pub const STAR_BIG_CHANCE: f64 = 0.12;
    pub const STAR_DIM_CHANCE: f64 = 0.25;
}

/// Runtime tuning; every field falls back to its default when omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub numbered_cap: u32,
    pub numbered_cap_mobile: u32,
    pub miss_limit: u32,
    pub miss_limit_mobile: u32,
    pub gap_stop_min_found: usize,
    pub gap_stop_after_index: u32,
    pub root_pattern_max: u32,
    pub root_pattern_mobile_candidates: usize,
    pub track_cap: usize,
    pub track_cap_mobile: usize,

    pub fade_interval_ms: f64,
    pub fade_duration_ms: f64,
    pub max_volume: f32,
    pub end_fade_secs: f64,
    pub end_fade_min_duration_secs: f64,
    pub persist_interval_ms: f64,
    pub hint_duration_ms: f64,

    pub rotator_tick_ms: f64,
    pub dwell_ms: f64,
    pub video_end_delay_ms: f64,
    pub manual_hold_ms: f64,

    pub swipe_threshold_px: f64,
    pub thumb_base_px: f64,
    pub thumb_gap_px: f64,
    pub mobile_max_width_px: f64,

    pub star_count: usize,
    pub star_big_chance: f64,
    pub star_dim_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        use defaults::*;
        Self {
            numbered_cap: NUMBERED_CAP,
            numbered_cap_mobile: NUMBERED_CAP_MOBILE,
            miss_limit: MISS_LIMIT,
            miss_limit_mobile: MISS_LIMIT_MOBILE,
            gap_stop_min_found: GAP_STOP_MIN_FOUND,
            gap_stop_after_index: GAP_STOP_AFTER_INDEX,
            root_pattern_max: ROOT_PATTERN_MAX,
            root_pattern_mobile_candidates: ROOT_PATTERN_MOBILE_CANDIDATES,
            track_cap: TRACK_CAP,
            track_cap_mobile: TRACK_CAP_MOBILE,

            fade_interval_ms: FADE_INTERVAL_MS,
            fade_duration_ms: FADE_DURATION_MS,
            max_volume: MAX_VOLUME,
            end_fade_secs: END_FADE_SECS,
            end_fade_min_duration_secs: END_FADE_MIN_DURATION_SECS,
            persist_interval_ms: PERSIST_INTERVAL_MS,
            hint_duration_ms: HINT_DURATION_MS,

            rotator_tick_ms: ROTATOR_TICK_MS,
            dwell_ms: DWELL_MS,
            video_end_delay_ms: VIDEO_END_DELAY_MS,
            manual_hold_ms: MANUAL_HOLD_MS,

            swipe_threshold_px: SWIPE_THRESHOLD_PX,
            thumb_base_px: THUMB_BASE_PX,
            thumb_gap_px: THUMB_GAP_PX,
            mobile_max_width_px: MOBILE_MAX_WIDTH_PX,

            star_count: STAR_COUNT,
            star_big_chance: STAR_BIG_CHANCE,
            star_dim_chance: STAR_DIM_CHANCE,
        }
    }
}

impl Tuning {
    /// Storage key for JSON overrides
    pub const STORAGE_KEY: &'static str = "ogv:tuning";

    /// Load tuning, applying any override stored under [`Self::STORAGE_KEY`]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            return Self::default();
        };
        match serde_json::from_str::<Tuning>(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring malformed tuning override: {}", e);
                Self::default()
            }
        }
    }

    /// Clamp values that would otherwise break the timers
    pub fn sanitized(mut self) -> Self {
        self.max_volume = self.max_volume.clamp(0.0, 1.0);
        self.fade_interval_ms = self.fade_interval_ms.max(1.0);
        self.fade_duration_ms = self.fade_duration_ms.max(0.0);
        self.rotator_tick_ms = self.rotator_tick_ms.max(50.0);
        self.persist_interval_ms = self.persist_interval_ms.max(250.0);
        self
    }

    /// Numbered probe cap for the current viewport class
    pub fn numbered_cap(&self, mobile: bool) -> u32 {
        if mobile {
            self.numbered_cap_mobile
        } else {
            self.numbered_cap
        }
    }

    /// Consecutive-miss limit for the current viewport class
    pub fn miss_limit(&self, mobile: bool) -> u32 {
        if mobile {
            self.miss_limit_mobile
        } else {
            self.miss_limit
        }
    }

    /// Track discovery cap for the current viewport class
    pub fn track_cap(&self, mobile: bool) -> usize {
        if mobile {
            self.track_cap_mobile
        } else {
            self.track_cap
        }
    }

    /// Number of volume steps in one fade
    pub fn fade_steps(&self) -> u32 {
        ((self.fade_duration_ms / self.fade_interval_ms).round() as u32).max(1)
    }
}

/// Mobile-like viewport: coarse pointer without hover, or a narrow window
pub fn is_mobile_like(coarse_pointer: bool, viewport_width: f64, tuning: &Tuning) -> bool {
    coarse_pointer || viewport_width <= tuning.mobile_max_width_px
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_default_fade_steps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.fade_steps(), 17);
    }

    #[test]
    fn test_partial_override() {
        let store = MemoryStore::new();
        store.set(Tuning::STORAGE_KEY, r#"{"dwellMs": 8000, "maxVolume": 3.0}"#);
        let tuning = Tuning::load(&store);
        assert_eq!(tuning.dwell_ms, 8000.0);
        assert_eq!(tuning.max_volume, 1.0);
        assert_eq!(tuning.numbered_cap, defaults::NUMBERED_CAP);
    }

    #[test]
    fn test_malformed_override_falls_back() {
        let store = MemoryStore::new();
        store.set(Tuning::STORAGE_KEY, "{not json");
        assert_eq!(Tuning::load(&store), Tuning::default());
    }

    #[test]
    fn test_mobile_like() {
        let tuning = Tuning::default();
        assert!(is_mobile_like(true, 1200.0, &tuning));
        assert!(is_mobile_like(false, 600.0, &tuning));
        assert!(!is_mobile_like(false, 601.0, &tuning));
        assert_eq!(tuning.numbered_cap(true), 10);
        assert_eq!(tuning.numbered_cap(false), 30);
    }
}
