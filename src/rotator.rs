//! Inline cover rotation for game cards
//!
//! Each card cycles through its discovered media while on screen. Images
//! dwell for a fixed time; videos play to the end and then wait a little.
//! Manual navigation holds a card still for a while. Only the focused card's
//! video may ever be audible, and only after the visitor unmuted one.
//!
//! The rotator is driven by `tick(now)` on a fixed cadence and emits
//! [`RotatorCommand`]s for the view to apply.

use crate::media::MediaKind;
use crate::tuning::Tuning;

/// View updates produced by the rotator
#[derive(Debug, Clone, PartialEq)]
pub enum RotatorCommand {
    /// Display item `index` of the card's list
    Show {
        slug: String,
        index: usize,
        url: String,
        kind: MediaKind,
    },
    /// Progress bar fill (0.0 - 1.0); `None` hides the bar
    Progress { slug: String, fraction: Option<f64> },
    /// Mute or unmute the card's current video
    Mute { slug: String, muted: bool },
}

#[derive(Debug, Clone)]
struct CardRotation {
    slug: String,
    items: Vec<String>,
    index: usize,
    /// Dwell accrued on the current image (ms)
    elapsed_ms: f64,
    /// Time since the current video ended (ms), `None` while it plays
    after_end_ms: Option<f64>,
    hold_until: Option<f64>,
    visible: bool,
    muted: bool,
    progress: Option<f64>,
}

impl CardRotation {
    fn current_kind(&self) -> MediaKind {
        self.items
            .get(self.index)
            .and_then(|u| MediaKind::of(u))
            .unwrap_or(MediaKind::Image)
    }

    fn reset_timers(&mut self) {
        self.elapsed_ms = 0.0;
        self.after_end_ms = None;
    }
}

/// Timing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatorTiming {
    pub tick_ms: f64,
    pub dwell_ms: f64,
    pub video_end_delay_ms: f64,
    pub hold_ms: f64,
}

impl From<&Tuning> for RotatorTiming {
    fn from(t: &Tuning) -> Self {
        Self {
            tick_ms: t.rotator_tick_ms,
            dwell_ms: t.dwell_ms,
            video_end_delay_ms: t.video_end_delay_ms,
            hold_ms: t.manual_hold_ms,
        }
    }
}

/// Rotation state for every card on the page
#[derive(Debug)]
pub struct CoverRotator {
    timing: RotatorTiming,
    cards: Vec<CardRotation>,
    focused: Option<String>,
    user_unmuted: bool,
    last_tick: Option<f64>,
    commands: Vec<RotatorCommand>,
}

impl CoverRotator {
    pub fn new(timing: RotatorTiming, user_unmuted: bool) -> Self {
        Self {
            timing,
            cards: Vec::new(),
            focused: None,
            user_unmuted,
            last_tick: None,
            commands: Vec::new(),
        }
    }

    /// Register (or replace) a card's media list and show its first item
    pub fn set_media(&mut self, slug: &str, items: Vec<String>) {
        let card = CardRotation {
            slug: slug.to_string(),
            items,
            index: 0,
            elapsed_ms: 0.0,
            after_end_ms: None,
            hold_until: None,
            visible: false,
            muted: true,
            progress: None,
        };
        let pos = match self.cards.iter().position(|c| c.slug == slug) {
            Some(pos) => {
                let visible = self.cards[pos].visible;
                self.cards[pos] = card;
                self.cards[pos].visible = visible;
                pos
            }
            None => {
                self.cards.push(card);
                self.cards.len() - 1
            }
        };
        self.emit_show(pos);
        self.update_audio();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn current_index(&self, slug: &str) -> Option<usize> {
        self.cards.iter().find(|c| c.slug == slug).map(|c| c.index)
    }

    pub fn set_visible(&mut self, slug: &str, visible: bool) {
        if let Some(pos) = self.position(slug) {
            self.cards[pos].visible = visible;
            if !visible {
                self.set_progress(pos, None);
            }
            self.update_audio();
        }
    }

    pub fn set_focused(&mut self, focused: Option<&str>) {
        self.focused = focused.map(str::to_string);
        self.update_audio();
    }

    /// Visitor unmuted (or re-muted) an inline video
    pub fn set_user_unmuted(&mut self, unmuted: bool) {
        self.user_unmuted = unmuted;
        self.update_audio();
    }

    pub fn user_unmuted(&self) -> bool {
        self.user_unmuted
    }

    /// The card's current video reached its end
    pub fn video_ended(&mut self, slug: &str) {
        if let Some(pos) = self.position(slug) {
            let card = &mut self.cards[pos];
            if card.current_kind() == MediaKind::Video && card.after_end_ms.is_none() {
                card.after_end_ms = Some(0.0);
            }
        }
    }

    /// Manual prev/next; suppresses auto-advance for the hold period
    pub fn manual_step(&mut self, slug: &str, forward: bool, now: f64) {
        let Some(pos) = self.position(slug) else {
            return;
        };
        let hold = self.timing.hold_ms;
        let card = &mut self.cards[pos];
        let n = card.items.len();
        if n == 0 {
            return;
        }
        card.index = if forward {
            (card.index + 1) % n
        } else {
            (card.index + n - 1) % n
        };
        card.reset_timers();
        card.hold_until = Some(now + hold);
        self.emit_show(pos);
        self.set_progress(pos, None);
        self.update_audio();
    }

    /// Advance timers by the time since the previous tick
    pub fn tick(&mut self, now: f64) {
        // Throttled background timers can deliver huge gaps; never skip items for that
        let dt = match self.last_tick {
            Some(last) => (now - last).clamp(0.0, self.timing.tick_ms * 2.0),
            None => self.timing.tick_ms,
        };
        self.last_tick = Some(now);

        let mut advanced = false;
        for pos in 0..self.cards.len() {
            let card = &mut self.cards[pos];
            if card.items.len() < 2 {
                continue;
            }
            if let Some(until) = card.hold_until {
                if now < until {
                    self.set_progress(pos, None);
                    continue;
                }
                card.hold_until = None;
                card.reset_timers();
            }
            if !card.visible {
                continue;
            }

            let (due, fraction) = match card.current_kind() {
                MediaKind::Image => {
                    card.elapsed_ms += dt;
                    let f = card.elapsed_ms / self.timing.dwell_ms;
                    (f >= 1.0, Some(f.min(1.0)))
                }
                MediaKind::Video => match card.after_end_ms.as_mut() {
                    Some(after) => {
                        *after += dt;
                        let f = *after / self.timing.video_end_delay_ms;
                        (f >= 1.0, Some(f.min(1.0)))
                    }
                    None => (false, None),
                },
            };

            if due {
                card.index = (card.index + 1) % card.items.len();
                card.reset_timers();
                self.emit_show(pos);
                self.set_progress(pos, Some(0.0));
                advanced = true;
            } else {
                self.set_progress(pos, fraction);
            }
        }

        if advanced {
            self.update_audio();
        }
    }

    pub fn drain_commands(&mut self) -> Vec<RotatorCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Card allowed to play sound right now
    pub fn audible_card(&self) -> Option<&str> {
        if !self.user_unmuted {
            return None;
        }
        let focused = self.focused.as_deref()?;
        self.cards
            .iter()
            .find(|c| c.slug == focused && c.visible && c.current_kind() == MediaKind::Video)
            .map(|c| c.slug.as_str())
    }

    fn position(&self, slug: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.slug == slug)
    }

    /// A shown item always starts muted; callers follow with `update_audio`
    /// so an audible card gets its unmute re-issued for the new element
    fn emit_show(&mut self, pos: usize) {
        let card = &mut self.cards[pos];
        let Some(url) = card.items.get(card.index).cloned() else {
            return;
        };
        self.commands.push(RotatorCommand::Show {
            slug: card.slug.clone(),
            index: card.index,
            url,
            kind: card.current_kind(),
        });
        if !card.muted {
            card.muted = true;
            self.commands.push(RotatorCommand::Mute {
                slug: card.slug.clone(),
                muted: true,
            });
        }
    }

    fn set_progress(&mut self, pos: usize, fraction: Option<f64>) {
        let card = &mut self.cards[pos];
        if card.progress == fraction {
            return;
        }
        card.progress = fraction;
        self.commands.push(RotatorCommand::Progress {
            slug: card.slug.clone(),
            fraction,
        });
    }

    fn update_audio(&mut self) {
        let audible = self.audible_card().map(str::to_string);
        for card in self.cards.iter_mut() {
            let muted = audible.as_deref() != Some(card.slug.as_str());
            if card.muted != muted {
                card.muted = muted;
                self.commands.push(RotatorCommand::Mute {
                    slug: card.slug.clone(),
                    muted,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotator() -> CoverRotator {
        CoverRotator::new(RotatorTiming::from(&Tuning::default()), false)
    }

    fn shows(cmds: &[RotatorCommand]) -> Vec<usize> {
        cmds.iter()
            .filter_map(|c| match c {
                RotatorCommand::Show { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_image_dwell_advances_after_five_ticks() {
        let mut r = rotator();
        r.set_media("a", vec!["1.png".into(), "2.png".into()]);
        r.set_visible("a", true);
        r.drain_commands();

        for t in 1..=4 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(0));
        r.tick(5000.0);
        assert_eq!(r.current_index("a"), Some(1));
        assert_eq!(shows(&r.drain_commands()), vec![1]);
    }

    #[test]
    fn test_offscreen_pauses_dwell() {
        let mut r = rotator();
        r.set_media("a", vec!["1.png".into(), "2.png".into()]);
        r.set_visible("a", true);
        r.tick(1000.0);
        r.tick(2000.0);
        r.set_visible("a", false);
        for t in 3..=20 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(0));
        r.set_visible("a", true);
        r.tick(21000.0);
        r.tick(22000.0);
        r.tick(23000.0);
        assert_eq!(r.current_index("a"), Some(1));
    }

    #[test]
    fn test_video_waits_for_end_plus_delay() {
        let mut r = rotator();
        r.set_media("a", vec!["1.mp4".into(), "2.png".into()]);
        r.set_visible("a", true);
        for t in 1..=30 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(0));
        r.video_ended("a");
        for t in 31..=34 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(0));
        r.tick(35000.0);
        assert_eq!(r.current_index("a"), Some(1));
    }

    #[test]
    fn test_manual_hold_suppresses_advance() {
        let mut r = rotator();
        r.set_media("a", vec!["1.png".into(), "2.png".into(), "3.png".into()]);
        r.set_visible("a", true);
        r.manual_step("a", false, 0.0);
        assert_eq!(r.current_index("a"), Some(2));
        for t in 1..=19 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(2));
        // hold expires at 20s, then a full dwell
        for t in 20..=25 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(0));
    }

    #[test]
    fn test_progress_hidden_when_offscreen() {
        let mut r = rotator();
        r.set_media("a", vec!["1.png".into(), "2.png".into()]);
        r.set_visible("a", true);
        r.tick(1000.0);
        let cmds = r.drain_commands();
        assert!(cmds.contains(&RotatorCommand::Progress {
            slug: "a".into(),
            fraction: Some(0.2)
        }));
        r.set_visible("a", false);
        assert_eq!(
            r.drain_commands(),
            vec![RotatorCommand::Progress { slug: "a".into(), fraction: None }]
        );
    }

    #[test]
    fn test_single_item_never_rotates() {
        let mut r = rotator();
        r.set_media("a", vec!["1.png".into()]);
        r.set_visible("a", true);
        for t in 1..=20 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(0));
    }

    #[test]
    fn test_only_focused_video_unmuted() {
        let mut r = rotator();
        r.set_media("a", vec!["a.mp4".into()]);
        r.set_media("b", vec!["b.mp4".into()]);
        r.set_visible("a", true);
        r.set_visible("b", true);
        r.set_focused(Some("a"));
        assert_eq!(r.audible_card(), None);

        r.set_user_unmuted(true);
        assert_eq!(r.audible_card(), Some("a"));
        r.set_focused(Some("b"));
        assert_eq!(r.audible_card(), Some("b"));
        let mutes: Vec<_> = r
            .drain_commands()
            .into_iter()
            .filter(|c| matches!(c, RotatorCommand::Mute { .. }))
            .collect();
        assert_eq!(
            mutes,
            vec![
                RotatorCommand::Mute { slug: "a".into(), muted: false },
                RotatorCommand::Mute { slug: "a".into(), muted: true },
                RotatorCommand::Mute { slug: "b".into(), muted: false },
            ]
        );

        r.set_visible("b", false);
        assert_eq!(r.audible_card(), None);
    }

    #[test]
    fn test_unmute_reissued_for_next_video() {
        let mut r = rotator();
        r.set_media("a", vec!["1.mp4".into(), "2.mp4".into()]);
        r.set_visible("a", true);
        r.set_focused(Some("a"));
        r.set_user_unmuted(true);
        r.drain_commands();

        r.video_ended("a");
        for t in 1..=5 {
            r.tick(t as f64 * 1000.0);
        }
        assert_eq!(r.current_index("a"), Some(1));
        assert_eq!(r.audible_card(), Some("a"));

        let cmds = r.drain_commands();
        let show = cmds
            .iter()
            .position(|c| matches!(c, RotatorCommand::Show { index: 1, .. }))
            .expect("second video shown");
        let unmute = cmds
            .iter()
            .rposition(|c| *c == RotatorCommand::Mute { slug: "a".into(), muted: false })
            .expect("unmute re-issued");
        assert!(unmute > show);
    }

    #[test]
    fn test_manual_step_to_image_releases_audio() {
        let mut r = rotator();
        r.set_media("a", vec!["1.mp4".into(), "2.png".into()]);
        r.set_visible("a", true);
        r.set_focused(Some("a"));
        r.set_user_unmuted(true);
        r.drain_commands();

        r.manual_step("a", true, 0.0);
        assert_eq!(r.audible_card(), None);
        let mutes: Vec<_> = r
            .drain_commands()
            .into_iter()
            .filter(|c| matches!(c, RotatorCommand::Mute { .. }))
            .collect();
        assert_eq!(mutes, vec![RotatorCommand::Mute { slug: "a".into(), muted: true }]);

        r.manual_step("a", false, 100.0);
        assert_eq!(r.audible_card(), Some("a"));
        assert!(r
            .drain_commands()
            .contains(&RotatorCommand::Mute { slug: "a".into(), muted: false }));
    }
}
