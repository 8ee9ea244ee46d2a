//! Background music
//!
//! - `player`: state machine driven by audio element events
//! - `fade`: linear volume ramps
//! - `shuffle`: next-track selection
//! - `persist`: per-page track and playhead memory
//! - `duck`: other audible sources on the page

pub mod duck;
pub mod fade;
pub mod persist;
pub mod player;
pub mod shuffle;

pub use duck::DuckSources;
pub use fade::{Fade, FadeThen};
pub use persist::{PlaybackScope, PlaybackSnapshot};
pub use player::{AudioCommand, BgmConfig, BgmPhase, BgmPlayer, PlayPurpose, PlayRequest};
pub use shuffle::Shuffle;

use crate::probe::{AssetHost, FALLBACK_TRACK, GENERAL_MUSIC_BASE, discover_game_tracks, discover_tracks};
use crate::storage::KeyValueStore;
use crate::tuning::Tuning;

/// Track pool for a page: the game's own music if it has any, otherwise the
/// shared folder, otherwise the fallback track
pub async fn discover_pool(
    host: &dyn AssetHost,
    session: &dyn KeyValueStore,
    scope: &PlaybackScope,
    tuning: &Tuning,
    mobile: bool,
) -> Vec<String> {
    if let Some(slug) = scope.slug() {
        let own = discover_game_tracks(host, session, slug, tuning, mobile).await;
        if !own.is_empty() {
            return own;
        }
    }
    let general = discover_tracks(host, GENERAL_MUSIC_BASE, tuning, mobile).await;
    if general.is_empty() {
        vec![FALLBACK_TRACK.to_string()]
    } else {
        general
    }
}
