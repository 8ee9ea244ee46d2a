//! Background music and cover logo discovery

use super::{AssetHost, ProbeMethod};
use crate::catalog::GameEntry;
use crate::media::MediaList;
use crate::storage::KeyValueStore;
use crate::tuning::Tuning;

/// Shared background music folder
pub const GENERAL_MUSIC_BASE: &str = "assets/general/audio/music/background/";

/// Known-good track used before discovery finishes
pub const FALLBACK_TRACK: &str = "assets/general/audio/music/background/background-music-1.mp3";

pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "ogg", "webm", "wav", "m4a"];

/// Per-game music folder
pub fn game_music_base(slug: &str) -> String {
    format!("assets/games/background-music/{}/", slug)
}

pub fn game_cache_key(slug: &str) -> String {
    format!("bgm-pergame-url:{}", slug)
}

pub fn game_none_key(slug: &str) -> String {
    format!("bgm-pergame-none:{}", slug)
}

/// Candidate track URLs under `base`, in probe order, without duplicates
pub fn track_candidates(base: &str) -> Vec<String> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };

    let mut stems: Vec<String> = Vec::new();
    for prefix in ["background-music", "track", "music"] {
        stems.extend((1..=20).map(|i| format!("{}-{}", prefix, i)));
    }
    stems.extend(["background", "ambient", "theme"].map(String::from));

    let mut list = MediaList::new();
    list.push(format!("{}background-music-1.mp3", base));
    for stem in &stems {
        for ext in AUDIO_EXTENSIONS {
            list.push(format!("{}{}.{}", base, stem, ext));
        }
    }
    list.into_vec()
}

/// Sequential `HEAD` probing of the naming convention, capped by tuning
pub async fn discover_tracks(
    host: &dyn AssetHost,
    base: &str,
    tuning: &Tuning,
    mobile: bool,
) -> Vec<String> {
    let cap = tuning.track_cap(mobile);
    let mut found = Vec::new();
    for url in track_candidates(base) {
        if found.len() >= cap {
            break;
        }
        if host.exists(&url, ProbeMethod::Head).await {
            found.push(url);
        }
    }
    log::info!("Discovered {} track(s) under {}", found.len(), base);
    found
}

/// Per-game tracks, cached in session storage for the rest of the tab's life
pub async fn discover_game_tracks(
    host: &dyn AssetHost,
    session: &dyn KeyValueStore,
    slug: &str,
    tuning: &Tuning,
    mobile: bool,
) -> Vec<String> {
    if session.get(&game_none_key(slug)).is_some() {
        return Vec::new();
    }
    if let Some(cached) = session.get(&game_cache_key(slug)) {
        let tracks = serde_json::from_str::<Vec<String>>(&cached)
            .unwrap_or_else(|_| vec![cached.clone()]);
        if !tracks.is_empty() {
            return tracks;
        }
    }

    let tracks = discover_tracks(host, &game_music_base(slug), tuning, mobile).await;
    if tracks.is_empty() {
        session.set(&game_none_key(slug), "1");
    } else if let Ok(json) = serde_json::to_string(&tracks) {
        session.set(&game_cache_key(slug), &json);
    }
    tracks
}

/// First cover logo that loads
pub async fn discover_logo(host: &dyn AssetHost, game: &GameEntry) -> Option<String> {
    for url in game.logo_candidates() {
        if host.exists(&url, ProbeMethod::ImageLoad).await {
            return Some(url);
        }
    }
    None
}
