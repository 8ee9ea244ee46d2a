//! Media URL classification and ordered media lists

use serde::{Deserialize, Serialize};

/// Extensions accepted as gallery media (lower-case, with dot)
pub const MEDIA_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".webp", ".gif", ".mp4", ".webm", ".ogg",
];

/// Extensions played as video
pub const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".ogg"];

/// Dark tile with a play glyph for videos whose poster is missing
pub const VIDEO_PLACEHOLDER: &str = "data:image/svg+xml;utf8,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%22120%22%20height%3D%22120%22%20viewBox%3D%220%200%20120%20120%22%3E%3Crect%20width%3D%22120%22%20height%3D%22120%22%20rx%3D%2210%22%20ry%3D%2210%22%20fill%3D%22%231f1f1f%22%2F%3E%3Ccircle%20cx%3D%2260%22%20cy%3D%2260%22%20r%3D%2226%22%20fill%3D%22%232a2a2a%22%2F%3E%3Cpolygon%20points%3D%2252%2C44%2052%2C76%2080%2C60%22%20fill%3D%22%23ffffff%22%2F%3E%3C%2Fsvg%3E";

/// Placeholder text for galleries with nothing discovered
pub const EMPTY_GALLERY_TEXT: &str = "No media added yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

/// Strip any query string or fragment before looking at the extension
fn path_part(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

fn has_extension(url: &str, exts: &[&str]) -> bool {
    let path = path_part(url).to_ascii_lowercase();
    exts.iter().any(|ext| path.ends_with(ext))
}

impl MediaKind {
    /// Classify a URL; `None` if the extension is not whitelisted
    pub fn of(url: &str) -> Option<Self> {
        if has_extension(url, &VIDEO_EXTENSIONS) {
            Some(MediaKind::Video)
        } else if has_extension(url, &MEDIA_EXTENSIONS) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }
}

pub fn is_media(url: &str) -> bool {
    has_extension(url, &MEDIA_EXTENSIONS)
}

pub fn is_video(url: &str) -> bool {
    has_extension(url, &VIDEO_EXTENSIONS)
}

/// Poster image sitting next to a video (`clip.mp4` -> `clip.jpg`)
pub fn poster_for(url: &str) -> String {
    let path = path_part(url);
    let lower = path.to_ascii_lowercase();
    for ext in VIDEO_EXTENSIONS {
        if lower.ends_with(ext) {
            return format!("{}.jpg", &path[..path.len() - ext.len()]);
        }
    }
    url.to_string()
}

/// Join a folder and a file name with exactly one slash
pub fn join(folder: &str, name: &str) -> String {
    let folder = folder.trim_end_matches('/');
    let name = name.trim_start_matches("./").trim_start_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Ordered list of unique media URLs for one game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaList {
    items: Vec<String>,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push if not already present; returns whether it was added
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.items.contains(&url) {
            return false;
        }
        self.items.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn position(&self, url: &str) -> Option<usize> {
        self.items.iter().position(|u| u == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl<S: Into<String>> FromIterator<S> for MediaList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = MediaList::new();
        for url in iter {
            list.push(url);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::of("a/1.PNG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::of("a/clip.webm"), Some(MediaKind::Video));
        assert_eq!(MediaKind::of("a/clip.mp4?v=2"), Some(MediaKind::Video));
        assert_eq!(MediaKind::of("a/notes.txt"), None);
        assert!(!is_media("folder/"));
    }

    #[test]
    fn test_poster_for() {
        assert_eq!(poster_for("g/trailer.MP4"), "g/trailer.jpg");
        assert_eq!(poster_for("g/shot.png"), "g/shot.png");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("assets/x/", "./a.png"), "assets/x/a.png");
        assert_eq!(join("assets/x", "a.png"), "assets/x/a.png");
        assert_eq!(join("", "a.png"), "a.png");
    }

    #[test]
    fn test_media_list_dedupes() {
        let list: MediaList = ["a.png", "b.png", "a.png"].into_iter().collect();
        assert_eq!(list.len(), 2);
        assert_eq!(list.position("b.png"), Some(1));
    }
}
