//! Showcase - client-side enhancements for a static game catalog site
//!
//! Core modules:
//! - `catalog`: Game manifest model
//! - `probe`: Media and music discovery against a static asset host
//! - `gallery`: Lightbox navigation and thumbnail layout
//! - `rotator`: Inline cover rotation for visible game cards
//! - `bgm`: Background music shuffle, fades and persistence
//! - `search`: Query scoring, tag filters and sorting
//! - `starfield`: Decorative background generation
//! - `platform`: Browser bindings (wasm32 only)
//!
//! Everything outside `platform` is plain Rust with no DOM types, so it runs
//! under `cargo test` on the host.

pub mod bgm;
pub mod catalog;
pub mod error;
pub mod events;
pub mod gallery;
pub mod media;
pub mod platform;
pub mod prefs;
pub mod probe;
pub mod rotator;
pub mod search;
pub mod starfield;
pub mod storage;
pub mod tuning;
pub mod visibility;

pub use catalog::{Catalog, GameEntry};
pub use error::{Result, ShowcaseError};
pub use events::{EventBus, ShowcaseEvent};
pub use prefs::{Preferences, SoundPref};
pub use search::{SearchState, SortMode};
pub use storage::{KeyValueStore, MemoryStore};
pub use tuning::Tuning;
