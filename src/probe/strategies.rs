//! The four gallery discovery strategies

use futures::FutureExt;
use futures::future::{LocalBoxFuture, join_all};
use regex::Regex;

use super::{AssetHost, DiscoveryStrategy, MediaTarget, ProbeMethod};
use crate::error::{Result, ShowcaseError};
use crate::media::{MediaList, is_media, join};
use crate::tuning::Tuning;

/// Extension order for numbered probing (most common first)
pub const NUMBERED_EXTENSIONS: [&str; 8] = ["png", "webp", "jpg", "jpeg", "gif", "mp4", "webm", "ogg"];

/// Extensions tried for root-level `key-N` files
pub const ROOT_PATTERN_EXTENSIONS: [&str; 3] = ["jpg", "png", "webp"];

/// Extract media file names from an `images.json` document
///
/// Accepts an array of names, a single name, or `{images: [...]}` /
/// `{files: [...]}`. Non-strings and non-media names are dropped.
pub fn parse_media_manifest(folder: &str, json: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let names: Vec<serde_json::Value> = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::String(name) => vec![serde_json::Value::String(name)],
        serde_json::Value::Object(mut map) => {
            let list = match map.remove("images") {
                Some(serde_json::Value::Array(items)) => Some(items),
                _ => match map.remove("files") {
                    Some(serde_json::Value::Array(items)) => Some(items),
                    _ => None,
                },
            };
            list.ok_or_else(|| {
                ShowcaseError::Shape("media manifest object needs `images` or `files`".to_string())
            })?
        }
        _ => {
            return Err(ShowcaseError::Shape(
                "media manifest must be a list of file names".to_string(),
            ));
        }
    };

    let list: MediaList = names
        .iter()
        .filter_map(|v| v.as_str())
        .filter(|name| is_media(name))
        .map(|name| join(folder, name))
        .collect();
    Ok(list.into_vec())
}

/// Extract media links from an auto-index HTML page
pub fn parse_dir_listing(folder: &str, html: &str) -> Vec<String> {
    let Ok(anchor) = Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["']"#) else {
        return Vec::new();
    };
    let base = format!("{}/", folder.trim_end_matches('/'));

    let list: MediaList = anchor
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim()))
        .filter(|href| !href.is_empty() && !href.ends_with('/') && is_media(href))
        .map(|href| {
            if href.starts_with("http://") || href.starts_with("https://") || href.starts_with('/') {
                href.to_string()
            } else {
                format!("{}{}", base, href.trim_start_matches("./"))
            }
        })
        .collect();
    list.into_vec()
}

/// `<folder>/images.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestStrategy;

impl DiscoveryStrategy for ManifestStrategy {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn discover<'a>(
        &'a self,
        host: &'a dyn AssetHost,
        target: &'a MediaTarget,
        _tuning: &'a Tuning,
    ) -> LocalBoxFuture<'a, Option<Vec<String>>> {
        async move {
            let folder = target.folder.as_deref()?;
            let url = join(folder, "images.json");
            let doc = match host.fetch(&url).await {
                Ok(doc) => doc,
                Err(e) => {
                    log::debug!("No media manifest: {}", e);
                    return None;
                }
            };
            match parse_media_manifest(folder, &doc.body) {
                Ok(files) if !files.is_empty() => Some(files),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Ignoring {}: {}", url, e);
                    None
                }
            }
        }
        .boxed_local()
    }
}

/// HTML directory listing of `<folder>/`
#[derive(Debug, Clone, Copy, Default)]
pub struct DirListingStrategy;

impl DiscoveryStrategy for DirListingStrategy {
    fn name(&self) -> &'static str {
        "dir-listing"
    }

    fn discover<'a>(
        &'a self,
        host: &'a dyn AssetHost,
        target: &'a MediaTarget,
        _tuning: &'a Tuning,
    ) -> LocalBoxFuture<'a, Option<Vec<String>>> {
        async move {
            let folder = target.folder.as_deref()?;
            let url = format!("{}/", folder.trim_end_matches('/'));
            let doc = match host.fetch(&url).await {
                Ok(doc) => doc,
                Err(e) => {
                    log::debug!("No directory listing: {}", e);
                    return None;
                }
            };
            if !doc.is_html() {
                log::debug!("{}", ShowcaseError::NotHtml(url));
                return None;
            }
            let items = parse_dir_listing(folder, &doc.body);
            (!items.is_empty()).then_some(items)
        }
        .boxed_local()
    }
}

/// Sequential `N.ext` / `key-N.ext` probing with early stop
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberedStrategy;

impl NumberedStrategy {
    async fn first_existing(host: &dyn AssetHost, folder: &str, stem: &str) -> Option<String> {
        for ext in NUMBERED_EXTENSIONS {
            let url = join(folder, &format!("{}.{}", stem, ext));
            if host.exists(&url, ProbeMethod::for_url(&url)).await {
                return Some(url);
            }
        }
        None
    }
}

impl DiscoveryStrategy for NumberedStrategy {
    fn name(&self) -> &'static str {
        "numbered"
    }

    fn discover<'a>(
        &'a self,
        host: &'a dyn AssetHost,
        target: &'a MediaTarget,
        tuning: &'a Tuning,
    ) -> LocalBoxFuture<'a, Option<Vec<String>>> {
        async move {
            let folder = target.folder.as_deref()?;
            let cap = tuning.numbered_cap(target.mobile);
            let miss_limit = tuning.miss_limit(target.mobile);
            let mut found = MediaList::new();
            let mut misses = 0u32;

            for i in 1..=cap {
                let mut hit = Self::first_existing(host, folder, &i.to_string()).await;
                if hit.is_none() {
                    if let Some(key) = &target.key {
                        hit = Self::first_existing(host, folder, &format!("{}-{}", key, i)).await;
                    }
                }

                let missed = hit.is_none();
                match hit {
                    Some(url) => {
                        found.push(url);
                        misses = 0;
                    }
                    None => misses += 1,
                }

                // A gap after a decent run usually means the set is complete
                if missed && found.len() >= tuning.gap_stop_min_found && i > tuning.gap_stop_after_index {
                    break;
                }
                if found.is_empty() && misses >= miss_limit {
                    break;
                }
            }

            (!found.is_empty()).then(|| found.into_vec())
        }
        .boxed_local()
    }
}

/// Root-level `assets/images/<key>-N.<ext>`, probed as one concurrent batch
#[derive(Debug, Clone, Copy, Default)]
pub struct RootPatternStrategy;

impl RootPatternStrategy {
    pub fn candidates(key: &str, tuning: &Tuning, mobile: bool) -> Vec<String> {
        let mut candidates: Vec<String> = (1..=tuning.root_pattern_max)
            .flat_map(|i| {
                ROOT_PATTERN_EXTENSIONS
                    .iter()
                    .map(move |ext| format!("assets/images/{}-{}.{}", key, i, ext))
            })
            .collect();
        if mobile {
            candidates.truncate(tuning.root_pattern_mobile_candidates);
        }
        candidates
    }
}

impl DiscoveryStrategy for RootPatternStrategy {
    fn name(&self) -> &'static str {
        "root-pattern"
    }

    fn discover<'a>(
        &'a self,
        host: &'a dyn AssetHost,
        target: &'a MediaTarget,
        tuning: &'a Tuning,
    ) -> LocalBoxFuture<'a, Option<Vec<String>>> {
        async move {
            let key = target.key.as_deref()?;
            let candidates = Self::candidates(key, tuning, target.mobile);
            // Resolves once every candidate has reported
            let results = join_all(
                candidates
                    .iter()
                    .map(|url| host.exists(url, ProbeMethod::ImageLoad)),
            )
            .await;

            let found: Vec<String> = candidates
                .into_iter()
                .zip(results)
                .filter_map(|(url, ok)| ok.then_some(url))
                .collect();
            (!found.is_empty()).then_some(found)
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fake::FakeHost;
    use futures::executor::block_on;

    fn run(strategy: &dyn DiscoveryStrategy, host: &FakeHost, target: &MediaTarget) -> Option<Vec<String>> {
        block_on(strategy.discover(host, target, &Tuning::default()))
    }

    #[test]
    fn test_manifest_filters_non_media() {
        let json = r#"["a.png","b.mp4","c.txt"]"#;
        assert_eq!(
            parse_media_manifest("g/zeta", json).unwrap(),
            vec!["g/zeta/a.png", "g/zeta/b.mp4"]
        );
    }

    #[test]
    fn test_manifest_shapes() {
        assert_eq!(
            parse_media_manifest("f", r#"{"images":["1.jpg", 5, "x.doc"]}"#).unwrap(),
            vec!["f/1.jpg"]
        );
        assert_eq!(
            parse_media_manifest("f", r#"{"files":["2.webp"]}"#).unwrap(),
            vec!["f/2.webp"]
        );
        assert_eq!(parse_media_manifest("f", r#""solo.gif""#).unwrap(), vec!["f/solo.gif"]);
        assert!(parse_media_manifest("f", r#"{"other":[]}"#).is_err());
        assert!(parse_media_manifest("f", "42").is_err());
    }

    #[test]
    fn test_manifest_strategy() {
        let host = FakeHost::default().document(
            "g/zeta/images.json",
            "application/json",
            r#"["a.png","b.mp4","c.txt"]"#,
        );
        let target = MediaTarget::new(Some("g/zeta"), None, false);
        assert_eq!(
            run(&ManifestStrategy, &host, &target),
            Some(vec!["g/zeta/a.png".to_string(), "g/zeta/b.mp4".to_string()])
        );
    }

    #[test]
    fn test_dir_listing() {
        let html = r#"<html><body>
            <a href="../">Parent</a>
            <a href="sub/">sub/</a>
            <a href="./1.png">1.png</a>
            <A HREF='clip.webm'>clip</A>
            <a href="readme.txt">readme</a>
            <a href="https://cdn.example.com/x.jpg">cdn</a>
        </body></html>"#;
        assert_eq!(
            parse_dir_listing("g/zeta", html),
            vec![
                "g/zeta/1.png",
                "g/zeta/clip.webm",
                "https://cdn.example.com/x.jpg",
            ]
        );
    }

    #[test]
    fn test_dir_listing_requires_html() {
        let host = FakeHost::default().document("g/zeta/", "text/plain", r#"<a href="1.png">"#);
        let target = MediaTarget::new(Some("g/zeta"), None, false);
        assert_eq!(run(&DirListingStrategy, &host, &target), None);
    }

    #[test]
    fn test_numbered_prefers_plain_then_keyed() {
        let host = FakeHost::with_files(&["g/1.webp", "g/z-2.jpg", "g/3.mp4"]);
        let target = MediaTarget::new(Some("g"), Some("z"), false);
        assert_eq!(
            run(&NumberedStrategy, &host, &target),
            Some(vec!["g/1.webp".into(), "g/z-2.jpg".into(), "g/3.mp4".into()])
        );
    }

    #[test]
    fn test_numbered_gap_stop() {
        // 1..=7 present, 8 missing, 9 present: stops at the gap after index 6
        let mut files: Vec<String> = (1..=7).map(|i| format!("g/{}.png", i)).collect();
        files.push("g/9.png".into());
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let host = FakeHost::with_files(&refs);
        let target = MediaTarget::new(Some("g"), None, false);
        let found = run(&NumberedStrategy, &host, &target).unwrap();
        assert_eq!(found.len(), 7);
    }

    #[test]
    fn test_numbered_miss_limit_bounds_requests() {
        let host = FakeHost::default();
        let target = MediaTarget::new(Some("g"), None, true);
        assert_eq!(run(&NumberedStrategy, &host, &target), None);
        // 5 mobile misses x 8 extensions
        assert_eq!(host.request_count(), 5 * NUMBERED_EXTENSIONS.len());
    }

    #[test]
    fn test_root_pattern_keeps_candidate_order() {
        let host = FakeHost::with_files(&["assets/images/z-3.png", "assets/images/z-1.jpg"]);
        let target = MediaTarget::new(None, Some("z"), false);
        assert_eq!(
            run(&RootPatternStrategy, &host, &target),
            Some(vec!["assets/images/z-1.jpg".into(), "assets/images/z-3.png".into()])
        );
        assert_eq!(host.request_count(), 36);
    }

    #[test]
    fn test_root_pattern_mobile_cap() {
        let candidates = RootPatternStrategy::candidates("z", &Tuning::default(), true);
        assert_eq!(candidates.len(), 9);
        assert_eq!(candidates.last().unwrap(), "assets/images/z-3.webp");
    }
}
