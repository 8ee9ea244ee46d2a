//! Media discovery against a static asset host
//!
//! The host has no listing API, so discovery is a cascade of guesses:
//! - `images.json` manifest in the game's folder
//! - the folder's HTML directory listing (when the server renders one)
//! - numbered file names (`1.png`, `key-2.jpg`, ...) with early stop
//! - root-level `assets/images/<key>-N.ext` files
//!
//! Each guess is a cheap request through [`AssetHost`]; the first strategy
//! that finds anything wins. A failed discovery is just an empty list.

pub mod chain;
pub mod strategies;
pub mod tracks;

use futures::future::LocalBoxFuture;

use crate::error::Result;

pub use chain::{DiscoveryStrategy, FallbackChain};
pub use strategies::{DirListingStrategy, ManifestStrategy, NumberedStrategy, RootPatternStrategy};
pub use tracks::{GENERAL_MUSIC_BASE, FALLBACK_TRACK, discover_game_tracks, discover_logo, discover_tracks};

/// How a URL's existence is tested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    /// Load as an image and watch load/error
    ImageLoad,
    /// `HEAD` request, success status means present
    Head,
}

impl ProbeMethod {
    /// Image loads cannot see videos or audio, so those go through `HEAD`
    pub fn for_url(url: &str) -> Self {
        match crate::media::MediaKind::of(url) {
            Some(crate::media::MediaKind::Image) => ProbeMethod::ImageLoad,
            _ => ProbeMethod::Head,
        }
    }
}

/// Body of a successful GET
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fetched {
    pub content_type: Option<String>,
    pub body: String,
}

impl Fetched {
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// Static file host, as seen from the page
///
/// Implementations never block; every request is an independent pending
/// future on the UI thread.
pub trait AssetHost {
    fn exists<'a>(&'a self, url: &'a str, method: ProbeMethod) -> LocalBoxFuture<'a, bool>;

    /// GET with caching disabled; non-success statuses are errors
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Fetched>>;
}

/// What to discover media for
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaTarget {
    /// Folder holding the game's media (`data-folder`)
    pub folder: Option<String>,
    /// Game key used in `key-N.ext` names (`data-game`)
    pub key: Option<String>,
    /// Mobile-like viewport: smaller probe caps
    pub mobile: bool,
}

impl MediaTarget {
    pub fn new(folder: Option<&str>, key: Option<&str>, mobile: bool) -> Self {
        Self {
            folder: folder.map(|f| f.trim_end_matches('/').to_string()).filter(|f| !f.is_empty()),
            key: key.map(str::to_string).filter(|k| !k.is_empty()),
            mobile,
        }
    }

    /// Fill a missing folder from the key (`assets/images/galleries/<key>`)
    pub fn with_default_folder(mut self) -> Self {
        if self.folder.is_none() {
            if let Some(key) = &self.key {
                self.folder = Some(format!("assets/images/galleries/{}", key));
            }
        }
        self
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory asset host recording every request

    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    use futures::FutureExt;
    use futures::future::LocalBoxFuture;

    use super::{AssetHost, Fetched, ProbeMethod};
    use crate::error::{Result, ShowcaseError};

    #[derive(Default)]
    pub struct FakeHost {
        pub files: HashSet<String>,
        pub documents: HashMap<String, Fetched>,
        pub requests: RefCell<Vec<String>>,
    }

    impl FakeHost {
        pub fn with_files(files: &[&str]) -> Self {
            Self {
                files: files.iter().map(|f| f.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn document(mut self, url: &str, content_type: &str, body: &str) -> Self {
            self.documents.insert(
                url.to_string(),
                Fetched {
                    content_type: Some(content_type.to_string()),
                    body: body.to_string(),
                },
            );
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl AssetHost for FakeHost {
        fn exists<'a>(&'a self, url: &'a str, _method: ProbeMethod) -> LocalBoxFuture<'a, bool> {
            self.requests.borrow_mut().push(url.to_string());
            let hit = self.files.contains(url);
            async move { hit }.boxed_local()
        }

        fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Fetched>> {
            self.requests.borrow_mut().push(url.to_string());
            let doc = self.documents.get(url).cloned();
            async move {
                doc.ok_or_else(|| ShowcaseError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }
            .boxed_local()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_method_for_url() {
        assert_eq!(ProbeMethod::for_url("a/1.png"), ProbeMethod::ImageLoad);
        assert_eq!(ProbeMethod::for_url("a/1.mp4"), ProbeMethod::Head);
        assert_eq!(ProbeMethod::for_url("a/track.mp3"), ProbeMethod::Head);
    }

    #[test]
    fn test_target_default_folder() {
        let target = MediaTarget::new(None, Some("zeta"), false).with_default_folder();
        assert_eq!(target.folder.as_deref(), Some("assets/images/galleries/zeta"));
        let target = MediaTarget::new(Some("x/y/"), None, false);
        assert_eq!(target.folder.as_deref(), Some("x/y"));
    }
}
