//! Game catalog loaded from `assets/data/games.json`
//!
//! The manifest maps a slug to its card data. Manifest order is the default
//! display order and the final tie-breaker for every sort.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShowcaseError};

/// Location of the manifest relative to the site root
pub const MANIFEST_PATH: &str = "assets/data/games.json";

/// Cover logo extensions, in probe order
pub const LOGO_EXTENSIONS: [&str; 4] = ["png", "webp", "jpg", "svg"];

/// Calendar date with optional month/day precision, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl ReleaseDate {
    /// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD` (anything after the day is ignored)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let date = s.split(['T', ' ']).next()?;
        let mut parts = date.split('-');
        let year: u16 = parts.next()?.parse().ok()?;
        let month: u8 = match parts.next() {
            Some(m) => m.parse().ok().filter(|m| (1..=12).contains(m))?,
            None => 0,
        };
        let day: u8 = match parts.next() {
            Some(d) => d.parse().ok().filter(|d| (1..=31).contains(d))?,
            None => 0,
        };
        Some(Self { year, month, day })
    }
}

/// Entry as written in the manifest
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    folder: Option<String>,
}

/// One game card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    /// Unique key (manifest object key)
    pub slug: String,
    pub name: String,
    pub tags: Vec<String>,
    pub release_date: Option<String>,
    pub description: Option<String>,
    /// Explicit media folder from the manifest
    pub folder: Option<String>,
}

impl GameEntry {
    /// Minimal entry, mostly for tests and the native tool
    pub fn new(slug: &str, name: &str, tags: &[&str]) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            release_date: None,
            description: None,
            folder: None,
        }
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.release_date = Some(date.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Media folder: explicit one or `assets/images/galleries/<slug>`
    pub fn media_folder(&self) -> String {
        match &self.folder {
            Some(folder) if !folder.trim().is_empty() => folder.trim_end_matches('/').to_string(),
            _ => format!("assets/images/galleries/{}", self.slug),
        }
    }

    pub fn release(&self) -> Option<ReleaseDate> {
        self.release_date.as_deref().and_then(ReleaseDate::parse)
    }

    /// Cover logo URLs in probe order
    pub fn logo_candidates(&self) -> Vec<String> {
        LOGO_EXTENSIONS
            .iter()
            .map(|ext| format!("assets/games/logos/{}/logo.{}", self.slug, ext))
            .collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// All games in manifest order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub games: Vec<GameEntry>,
}

impl Catalog {
    pub fn new(games: Vec<GameEntry>) -> Self {
        Self { games }
    }

    /// Parse the slug -> entry manifest
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(map) = value else {
            return Err(ShowcaseError::Shape(
                "games manifest must be an object keyed by slug".to_string(),
            ));
        };

        let mut games = Vec::with_capacity(map.len());
        for (slug, raw) in map {
            match serde_json::from_value::<RawEntry>(raw) {
                Ok(raw) => games.push(GameEntry {
                    slug,
                    name: raw.name,
                    tags: raw
                        .tags
                        .into_iter()
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect(),
                    release_date: raw.release_date.filter(|d| !d.trim().is_empty()),
                    description: raw.description,
                    folder: raw.folder,
                }),
                // One bad entry shouldn't blank the whole list
                Err(e) => log::warn!("Skipping manifest entry '{}': {}", slug, e),
            }
        }

        log::info!("Loaded {} games from manifest", games.len());
        Ok(Self { games })
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&GameEntry> {
        self.games.iter().find(|g| g.slug == slug)
    }

    /// Every tag used by at least one game, lower-cased and sorted
    pub fn tag_universe(&self) -> BTreeSet<String> {
        self.games
            .iter()
            .flat_map(|g| g.tags.iter())
            .map(|t| t.to_lowercase())
            .collect()
    }
}
