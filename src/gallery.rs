//! Gallery preview strip and full-screen lightbox state
//!
//! The lightbox is one shared viewer per page. Opening it copies the
//! gallery's media list, so a gallery that re-discovers media later never
//! disturbs an open viewer.

use crate::media::{MediaKind, poster_for, VIDEO_PLACEHOLDER};

/// How a lightbox open request names its starting item
#[derive(Debug, Clone, PartialEq)]
pub enum OpenTarget {
    Index(usize),
    Source(String),
}

/// Result of feeding an input to the lightbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxAction {
    Ignored,
    Closed,
    Moved { index: usize },
}

/// Full-screen viewer state
#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    items: Vec<String>,
    index: usize,
    open: bool,
    touch_start_x: Option<f64>,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Open on a list; a missing source or out-of-range index lands on 0 / last
    pub fn open(&mut self, items: Vec<String>, target: OpenTarget) -> bool {
        if items.is_empty() {
            return false;
        }
        self.index = match target {
            OpenTarget::Index(i) => i.min(items.len() - 1),
            OpenTarget::Source(src) => items.iter().position(|s| *s == src).unwrap_or(0),
        };
        self.items = items;
        self.open = true;
        log::debug!("Lightbox open at {}/{}", self.index + 1, self.items.len());
        true
    }

    /// Close; the view must stop any playing video and restore page scroll
    pub fn close(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        self.touch_start_x = None;
        was_open
    }

    pub fn show_next(&mut self) -> usize {
        if !self.items.is_empty() {
            self.index = (self.index + 1) % self.items.len();
        }
        self.index
    }

    pub fn show_prev(&mut self) -> usize {
        let n = self.items.len();
        if n > 0 {
            self.index = (self.index + n - 1) % n;
        }
        self.index
    }

    /// Jump to a thumbnail
    pub fn select(&mut self, index: usize) -> Option<usize> {
        if index < self.items.len() {
            self.index = index;
            Some(index)
        } else {
            None
        }
    }

    pub fn current(&self) -> Option<(&str, MediaKind)> {
        let url = self.items.get(self.index)?;
        Some((url, MediaKind::of(url).unwrap_or(MediaKind::Image)))
    }

    /// Keyboard handling; only active while open
    pub fn handle_key(&mut self, key: &str) -> LightboxAction {
        if !self.open {
            return LightboxAction::Ignored;
        }
        match key {
            "Escape" => {
                self.close();
                LightboxAction::Closed
            }
            "ArrowRight" => LightboxAction::Moved {
                index: self.show_next(),
            },
            "ArrowLeft" => LightboxAction::Moved {
                index: self.show_prev(),
            },
            _ => LightboxAction::Ignored,
        }
    }

    pub fn touch_start(&mut self, x: f64) {
        self.touch_start_x = Some(x);
    }

    /// Swipe left (negative dx) goes forward
    pub fn touch_end(&mut self, x: f64, threshold: f64) -> LightboxAction {
        let Some(start) = self.touch_start_x.take() else {
            return LightboxAction::Ignored;
        };
        if !self.open {
            return LightboxAction::Ignored;
        }
        let dx = x - start;
        if dx.abs() <= threshold {
            return LightboxAction::Ignored;
        }
        let index = if dx < 0.0 {
            self.show_next()
        } else {
            self.show_prev()
        };
        LightboxAction::Moved { index }
    }
}

/// Image to show for a media item inside a thumbnail
pub fn thumbnail_source(url: &str) -> String {
    match MediaKind::of(url) {
        Some(MediaKind::Video) => poster_for(url),
        _ => url.to_string(),
    }
}

/// Fallback when a video poster fails to load
pub fn thumbnail_fallback() -> &'static str {
    VIDEO_PLACEHOLDER
}

/// One slot in the inline preview strip
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewSlot {
    Thumb { index: usize },
    /// "+N" tile that opens the full list
    More { hidden: usize, total: usize },
}

impl PreviewSlot {
    /// Lightbox position a click on this slot opens at
    pub fn open_index(&self) -> usize {
        match self {
            PreviewSlot::Thumb { index } => *index,
            PreviewSlot::More { .. } => 0,
        }
    }
}

/// Attribute carrying the lightbox position of a clickable tile
pub const INDEX_ATTR: &str = "data-index";

/// Marks a thumbnail showing a video poster, which falls back on error
pub const POSTER_ATTR: &str = "data-poster";

/// Read an `INDEX_ATTR` value
pub fn parse_index(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}

/// Inline preview strip layout
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLayout {
    pub slots: Vec<PreviewSlot>,
    /// Thumbnail edge override (px); `None` leaves the stylesheet default
    pub thumb_size: Option<f64>,
}

impl PreviewLayout {
    /// Fit as many thumbnails as the width allows; the last slot becomes "+N" on overflow
    pub fn compute(container_width: f64, count: usize, base: f64, gap: f64) -> Self {
        if count == 0 {
            return Self {
                slots: Vec::new(),
                thumb_size: None,
            };
        }

        let (show, thumb_size) = if container_width > 0.0 {
            let max_thumbs = (((container_width + gap) / (base + gap)).floor() as usize).max(1);
            let show = max_thumbs.min(count);
            let gaps = (show - 1) as f64 * gap;
            (show, Some(((container_width - gaps) / show as f64).floor()))
        } else {
            (count.min(3), None)
        };

        let overflow = count > show;
        let slots = (0..show)
            .map(|i| {
                if overflow && i == show - 1 {
                    PreviewSlot::More {
                        hidden: count - (show - 1),
                        total: count,
                    }
                } else {
                    PreviewSlot::Thumb { index: i }
                }
            })
            .collect();

        Self { slots, thumb_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn items(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("g/{}.png", i)).collect()
    }

    #[test]
    fn test_next_wraps_to_zero() {
        let mut lb = Lightbox::new();
        lb.open(items(3), OpenTarget::Index(2));
        assert_eq!(lb.show_next(), 0);
    }

    #[test]
    fn test_prev_wraps_to_last() {
        let mut lb = Lightbox::new();
        lb.open(items(3), OpenTarget::Index(0));
        assert_eq!(lb.show_prev(), 2);
    }

    #[test]
    fn test_open_by_source() {
        let mut lb = Lightbox::new();
        lb.open(items(3), OpenTarget::Source("g/2.png".into()));
        assert_eq!(lb.index(), 1);
        lb.open(items(3), OpenTarget::Source("missing.png".into()));
        assert_eq!(lb.index(), 0);
        assert!(!lb.open(Vec::new(), OpenTarget::Index(0)));
    }

    #[test]
    fn test_keys_only_when_open() {
        let mut lb = Lightbox::new();
        assert_eq!(lb.handle_key("ArrowRight"), LightboxAction::Ignored);
        lb.open(items(2), OpenTarget::Index(0));
        assert_eq!(lb.handle_key("ArrowRight"), LightboxAction::Moved { index: 1 });
        assert_eq!(lb.handle_key("ArrowLeft"), LightboxAction::Moved { index: 0 });
        assert_eq!(lb.handle_key("Escape"), LightboxAction::Closed);
        assert!(!lb.is_open());
    }

    #[test]
    fn test_swipe_threshold() {
        let mut lb = Lightbox::new();
        lb.open(items(3), OpenTarget::Index(1));
        lb.touch_start(200.0);
        assert_eq!(lb.touch_end(170.0, 40.0), LightboxAction::Ignored);
        lb.touch_start(200.0);
        assert_eq!(lb.touch_end(150.0, 40.0), LightboxAction::Moved { index: 2 });
        lb.touch_start(100.0);
        assert_eq!(lb.touch_end(160.0, 40.0), LightboxAction::Moved { index: 1 });
        // touchend without touchstart
        assert_eq!(lb.touch_end(0.0, 40.0), LightboxAction::Ignored);
    }

    #[test]
    fn test_current_kind() {
        let mut lb = Lightbox::new();
        lb.open(vec!["a.png".into(), "b.mp4".into()], OpenTarget::Index(1));
        assert_eq!(lb.current(), Some(("b.mp4", MediaKind::Video)));
        assert_eq!(thumbnail_source("b.mp4"), "b.jpg");
    }

    #[test]
    fn test_preview_layout_overflow() {
        // 400px fits 3 thumbs of 120 with 10px gaps
        let layout = PreviewLayout::compute(400.0, 7, 120.0, 10.0);
        assert_eq!(
            layout.slots,
            vec![
                PreviewSlot::Thumb { index: 0 },
                PreviewSlot::Thumb { index: 1 },
                PreviewSlot::More { hidden: 5, total: 7 },
            ]
        );
        assert_eq!(layout.thumb_size, Some(126.0));
    }

    #[test]
    fn test_preview_layout_unknown_width() {
        let layout = PreviewLayout::compute(0.0, 2, 120.0, 10.0);
        assert_eq!(layout.slots.len(), 2);
        assert_eq!(layout.thumb_size, None);
    }

    #[test]
    fn test_more_slot_opens_at_start() {
        let layout = PreviewLayout::compute(250.0, 6, 120.0, 10.0);
        let opens: Vec<usize> = layout.slots.iter().map(PreviewSlot::open_index).collect();
        assert_eq!(opens, vec![0, 0]);
        assert!(matches!(layout.slots[1], PreviewSlot::More { hidden: 5, total: 6 }));
        assert_eq!(PreviewSlot::Thumb { index: 4 }.open_index(), 4);
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("3"), Some(3));
        assert_eq!(parse_index(" 12 "), Some(12));
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("two"), None);
        assert_eq!(parse_index(""), None);
    }

    proptest! {
        #[test]
        fn prop_next_then_prev_is_identity(n in 1usize..20, start in 0usize..20) {
            let mut lb = Lightbox::new();
            lb.open(items(n), OpenTarget::Index(start));
            let idx = lb.index();
            lb.show_next();
            lb.show_prev();
            prop_assert_eq!(lb.index(), idx);
            prop_assert!(idx < n);
        }
    }
}
