//! Background music state machine
//!
//! The player never touches an audio element. Every effect is queued as an
//! [`AudioCommand`] for the platform driver to apply, and the driver reports
//! element events back through the `on_*` methods.

use super::fade::{Fade, FadeThen};
use super::persist::{PlaybackScope, PlaybackSnapshot};
use super::shuffle::Shuffle;
use crate::prefs::SoundPref;
use crate::probe::FALLBACK_TRACK;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BgmPhase {
    Idle,
    /// Playing the bootstrap track while the pool is discovered
    Probing,
    Playing,
    Fading,
    Switching,
    Ended,
}

/// Why a `play()` was requested; reported back with the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPurpose {
    Bootstrap,
    TryUnmute,
    Track,
    Loop,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRequest {
    pub id: u32,
    pub purpose: PlayPurpose,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    Load { url: String, position: f64 },
    Seek(f64),
    Play(PlayRequest),
    Pause,
    SetVolume(f32),
    SetMuted(bool),
    /// Update the on/off toggle label
    ShowToggle { on: bool },
    /// Show the "tap to enable sound" hint
    ShowHint,
    /// Attach one-shot listeners for the first user gesture
    ListenForGesture,
    StopListeningForGesture,
}

#[derive(Debug, Clone)]
pub struct BgmConfig {
    pub scope: PlaybackScope,
    pub sound: SoundPref,
    /// Stored target volume; falls back to the tuning maximum
    pub volume: Option<f32>,
    pub mobile: bool,
    pub seed: u64,
}

pub struct BgmPlayer {
    scope: PlaybackScope,
    sound: SoundPref,
    target_volume: f32,
    max_volume: f32,
    fade_steps: u32,
    end_fade_secs: f64,
    end_fade_min_duration: f64,
    persist_interval_ms: f64,
    mobile: bool,

    phase: BgmPhase,
    tracks: Vec<String>,
    current: Option<String>,
    shuffle: Shuffle,
    fade: Option<Fade>,
    volume: f32,
    muted: bool,
    unlocked: bool,
    ducked: bool,
    end_fading: bool,
    hint_shown: bool,
    bootstrap_failed: bool,
    consecutive_errors: usize,
    position: f64,
    next_request: u32,
    last_persist_ms: Option<f64>,
    commands: Vec<AudioCommand>,
}

impl BgmPlayer {
    pub fn new(config: BgmConfig, tuning: &Tuning) -> Self {
        let max_volume = tuning.max_volume.clamp(0.0, 1.0);
        Self {
            scope: config.scope,
            sound: config.sound,
            target_volume: config.volume.unwrap_or(max_volume).clamp(0.0, max_volume),
            max_volume,
            fade_steps: tuning.fade_steps(),
            end_fade_secs: tuning.end_fade_secs,
            end_fade_min_duration: tuning.end_fade_min_duration_secs,
            persist_interval_ms: tuning.persist_interval_ms,
            mobile: config.mobile,
            phase: BgmPhase::Idle,
            tracks: Vec::new(),
            current: None,
            shuffle: Shuffle::new(config.seed),
            fade: None,
            volume: 0.0,
            muted: true,
            unlocked: false,
            ducked: false,
            end_fading: false,
            hint_shown: false,
            bootstrap_failed: false,
            consecutive_errors: 0,
            position: 0.0,
            next_request: 0,
            last_persist_ms: None,
            commands: Vec::new(),
        }
    }

    pub fn phase(&self) -> BgmPhase {
        self.phase
    }

    pub fn scope(&self) -> &PlaybackScope {
        &self.scope
    }

    pub fn sound(&self) -> SoundPref {
        self.sound
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn drain_commands(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Begin muted playback of the resumed or fallback track while the real
    /// pool is being discovered
    pub fn start(&mut self, resume: Option<PlaybackSnapshot>) {
        let (url, position) = match resume {
            Some(snapshot) => (snapshot.url, snapshot.position),
            None => (FALLBACK_TRACK.to_string(), 0.0),
        };
        log::debug!("Bootstrapping music with {} at {:.1}s", url, position);

        self.phase = BgmPhase::Probing;
        self.current = Some(url.clone());
        self.position = position;
        self.volume = 0.0;
        self.muted = true;
        self.commands.push(AudioCommand::Load { url, position });
        self.commands.push(AudioCommand::SetVolume(0.0));
        self.commands.push(AudioCommand::SetMuted(true));
        self.request_play(PlayPurpose::Bootstrap);
        if !self.unlocked {
            self.commands.push(AudioCommand::ListenForGesture);
        }
    }

    /// The discovered pool; an empty pool falls back to the known track
    pub fn on_tracks_discovered(&mut self, mut tracks: Vec<String>) {
        if tracks.is_empty() {
            tracks.push(FALLBACK_TRACK.to_string());
        }
        log::info!("Music pool ready with {} track(s)", tracks.len());
        self.tracks = tracks;
        self.consecutive_errors = 0;

        let keep = self
            .current
            .as_ref()
            .filter(|_| self.phase == BgmPhase::Probing && !self.bootstrap_failed)
            .and_then(|current| self.tracks.iter().position(|t| t == current));
        self.bootstrap_failed = false;
        match keep {
            Some(index) => {
                self.shuffle.note_played(index);
                self.phase = BgmPhase::Playing;
            }
            None => self.play_next(),
        }
    }

    pub fn on_play_result(&mut self, request: PlayRequest, ok: bool) {
        log::debug!("play() {:?} -> {}", request.purpose, ok);
        match (request.purpose, ok) {
            (PlayPurpose::Bootstrap, true) => self.try_unmute(),
            (PlayPurpose::TryUnmute, true) => {
                // An audible play() was allowed, so autoplay is unlocked
                self.unlock();
                self.fade_in();
                self.show_toggle();
            }
            (PlayPurpose::TryUnmute, false) => {
                self.muted = true;
                self.commands.push(AudioCommand::SetMuted(true));
                self.request_play(PlayPurpose::Resume);
                self.blocked();
            }
            (PlayPurpose::Track, true) => {
                self.consecutive_errors = 0;
                if self.phase == BgmPhase::Switching {
                    self.phase = BgmPhase::Playing;
                }
                if self.audible_allowed() {
                    self.fade_in();
                } else if self.sound.is_on() && !self.unlocked && !self.ducked {
                    self.try_unmute();
                }
                self.show_toggle();
            }
            (PlayPurpose::Bootstrap | PlayPurpose::Track, false) => {
                if !self.muted {
                    self.muted = true;
                    self.commands.push(AudioCommand::SetMuted(true));
                    self.request_play(PlayPurpose::Resume);
                }
                self.blocked();
            }
            (PlayPurpose::Loop, true) => {
                if self.audible_allowed() {
                    self.fade_in();
                }
            }
            (PlayPurpose::Loop | PlayPurpose::Resume, false) => self.blocked(),
            (PlayPurpose::Resume, true) => {}
        }
    }

    /// The element failed to load its source
    pub fn on_media_error(&mut self) {
        log::warn!("Music track failed to load: {:?}", self.current);
        if self.tracks.is_empty() {
            self.bootstrap_failed = true;
            return;
        }
        self.consecutive_errors += 1;
        if self.consecutive_errors >= self.tracks.len() {
            log::warn!("Every music track failed, giving up");
            self.phase = BgmPhase::Idle;
            self.fade = None;
            self.commands.push(AudioCommand::Pause);
            return;
        }
        self.play_next();
    }

    /// Track finished: loop a lone track in place, otherwise shuffle on
    pub fn on_ended(&mut self) {
        self.fade = None;
        self.end_fading = false;
        if self.tracks.len() <= 1 {
            self.phase = BgmPhase::Playing;
            self.position = 0.0;
            self.volume = 0.0;
            self.commands.push(AudioCommand::Seek(0.0));
            self.commands.push(AudioCommand::SetVolume(0.0));
            self.set_muted(!self.audible_allowed());
            self.request_play(PlayPurpose::Loop);
        } else {
            self.phase = BgmPhase::Ended;
            self.play_next();
        }
    }

    /// Starts the end-of-track fade once inside the final seconds
    pub fn on_time_update(&mut self, position: f64, duration: f64) {
        self.position = position;
        if self.end_fading || !duration.is_finite() || duration < self.end_fade_min_duration {
            return;
        }
        let remaining = duration - position;
        if remaining > 0.0 && remaining <= self.end_fade_secs && self.volume > 0.01 {
            self.end_fading = true;
            self.fade_to(0.0, FadeThen::Nothing);
        }
    }

    /// First user gesture; returns false if already unlocked
    pub fn on_gesture(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        log::debug!("Music unlocked by user gesture");
        self.unlock();
        if self.sound.is_on() && !self.ducked && self.phase != BgmPhase::Idle {
            self.fade_in();
            self.request_play(PlayPurpose::Resume);
        }
        self.show_toggle();
        true
    }

    /// Explicit on/off toggle; returns the new preference for the caller to persist
    pub fn toggle(&mut self) -> SoundPref {
        // The label shows on only when the preference is on and audio is unlocked
        let turning_on = !(self.sound.is_on() && self.unlocked);
        self.unlock();
        if turning_on {
            self.sound = SoundPref::On;
            if !self.ducked {
                self.fade_in();
            }
            self.request_play(PlayPurpose::Resume);
        } else {
            self.sound = SoundPref::Off;
            self.fade_to(0.0, FadeThen::Mute);
        }
        self.show_toggle();
        self.sound
    }

    /// Fade out while another audible source plays, back in afterwards
    pub fn set_ducked(&mut self, ducked: bool) {
        if self.ducked == ducked {
            return;
        }
        self.ducked = ducked;
        if ducked {
            if !self.muted {
                self.fade_to(0.0, FadeThen::Nothing);
            }
        } else if self.audible_allowed() && self.phase != BgmPhase::Idle {
            self.fade_in();
        }
    }

    /// Page became visible again; restart an element the browser paused
    pub fn on_page_shown(&mut self, paused: bool) {
        if paused && self.phase != BgmPhase::Idle {
            self.request_play(PlayPurpose::Resume);
        }
    }

    /// One fade interval; returns true while a fade is still running
    pub fn fade_tick(&mut self) -> bool {
        let cap = self.max_volume;
        let Some(fade) = self.fade.as_mut() else {
            return false;
        };
        let volume = fade.advance(cap);
        let finished = fade.is_done().then(|| fade.then());
        self.volume = volume;
        self.commands.push(AudioCommand::SetVolume(volume));

        match finished {
            Some(then) => {
                self.fade = None;
                self.apply(then);
                if self.phase == BgmPhase::Fading {
                    self.phase = BgmPhase::Playing;
                }
                false
            }
            None => true,
        }
    }

    /// Snapshot for persistence, throttled to the persist interval
    pub fn persist(&mut self, now_ms: f64) -> Option<PlaybackSnapshot> {
        if let Some(last) = self.last_persist_ms {
            if now_ms - last < self.persist_interval_ms {
                return None;
            }
        }
        self.last_persist_ms = Some(now_ms);
        self.snapshot()
    }

    /// Unthrottled snapshot, for page hide
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        self.current.as_ref().map(|url| PlaybackSnapshot {
            url: url.clone(),
            position: self.position,
        })
    }

    fn audible_allowed(&self) -> bool {
        self.sound.is_on() && self.unlocked && !self.ducked
    }

    fn unlock(&mut self) {
        if !self.unlocked {
            self.unlocked = true;
            self.commands.push(AudioCommand::StopListeningForGesture);
        }
    }

    fn request_play(&mut self, purpose: PlayPurpose) {
        self.next_request = self.next_request.wrapping_add(1);
        self.commands.push(AudioCommand::Play(PlayRequest {
            id: self.next_request,
            purpose,
        }));
    }

    fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            self.muted = muted;
            self.commands.push(AudioCommand::SetMuted(muted));
        }
    }

    /// Attempt audible playback without a gesture; the browser decides
    fn try_unmute(&mut self) {
        if !self.sound.is_on() || self.ducked || self.unlocked {
            return;
        }
        self.set_muted(false);
        self.volume = 0.0;
        self.commands.push(AudioCommand::SetVolume(0.0));
        self.request_play(PlayPurpose::TryUnmute);
    }

    fn blocked(&mut self) {
        if !self.unlocked {
            self.commands.push(AudioCommand::ListenForGesture);
            // A missing file is not an autoplay block
            if self.sound.is_on() && !self.hint_shown && !self.mobile && !self.bootstrap_failed {
                self.hint_shown = true;
                self.commands.push(AudioCommand::ShowHint);
            }
        }
        self.show_toggle();
    }

    fn show_toggle(&mut self) {
        if !self.mobile {
            let on = self.sound.is_on() && self.unlocked;
            self.commands.push(AudioCommand::ShowToggle { on });
        }
    }

    fn fade_in(&mut self) {
        self.set_muted(false);
        self.fade_to(self.target_volume, FadeThen::Nothing);
    }

    /// Replaces any running fade
    fn fade_to(&mut self, target: f32, then: FadeThen) {
        let fade = Fade::new(self.volume, target.clamp(0.0, self.max_volume), self.fade_steps, then);
        if fade.is_trivial() {
            self.fade = None;
            self.volume = fade.target();
            self.commands.push(AudioCommand::SetVolume(self.volume));
            self.apply(then);
            return;
        }
        self.fade = Some(fade);
        if self.phase == BgmPhase::Playing {
            self.phase = BgmPhase::Fading;
        }
    }

    fn apply(&mut self, then: FadeThen) {
        if then == FadeThen::Mute {
            self.set_muted(true);
        }
    }

    fn play_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        let index = self.shuffle.pick(self.tracks.len());
        let url = self.tracks[index].clone();
        log::debug!("Switching music to {}", url);

        self.phase = BgmPhase::Switching;
        self.current = Some(url.clone());
        self.position = 0.0;
        self.fade = None;
        self.end_fading = false;
        self.volume = 0.0;
        self.commands.push(AudioCommand::Load { url, position: 0.0 });
        self.commands.push(AudioCommand::SetVolume(0.0));
        self.set_muted(!self.audible_allowed());
        self.request_play(PlayPurpose::Track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(sound: SoundPref) -> BgmPlayer {
        BgmPlayer::new(
            BgmConfig {
                scope: PlaybackScope::Index,
                sound,
                volume: None,
                mobile: false,
                seed: 9,
            },
            &Tuning::default(),
        )
    }

    fn last_play(cmds: &[AudioCommand]) -> PlayRequest {
        cmds.iter()
            .rev()
            .find_map(|c| match c {
                AudioCommand::Play(req) => Some(*req),
                _ => None,
            })
            .expect("a play request")
    }

    fn loaded(cmds: &[AudioCommand]) -> Option<String> {
        cmds.iter().find_map(|c| match c {
            AudioCommand::Load { url, .. } => Some(url.clone()),
            _ => None,
        })
    }

    fn volumes(cmds: &[AudioCommand]) -> Vec<f32> {
        cmds.iter()
            .filter_map(|c| match c {
                AudioCommand::SetVolume(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    fn settle(p: &mut BgmPlayer) {
        while p.fade_tick() {}
        p.drain_commands();
    }

    /// Unlocked player already playing the first track of `tracks`
    fn playing(tracks: &[&str]) -> BgmPlayer {
        let mut p = player(SoundPref::On);
        p.start(None);
        p.on_gesture();
        p.on_tracks_discovered(tracks.iter().map(|t| t.to_string()).collect());
        let req = last_play(&p.drain_commands());
        p.on_play_result(req, true);
        settle(&mut p);
        p
    }

    #[test]
    fn test_start_is_muted_bootstrap() {
        let mut p = player(SoundPref::On);
        p.start(None);
        assert_eq!(p.phase(), BgmPhase::Probing);
        let cmds = p.drain_commands();
        assert_eq!(
            cmds,
            vec![
                AudioCommand::Load {
                    url: FALLBACK_TRACK.to_string(),
                    position: 0.0
                },
                AudioCommand::SetVolume(0.0),
                AudioCommand::SetMuted(true),
                AudioCommand::Play(PlayRequest {
                    id: 1,
                    purpose: PlayPurpose::Bootstrap
                }),
                AudioCommand::ListenForGesture,
            ]
        );
    }

    #[test]
    fn test_bootstrap_success_tries_unmute() {
        let mut p = player(SoundPref::On);
        p.start(None);
        let req = last_play(&p.drain_commands());
        p.on_play_result(req, true);
        let cmds = p.drain_commands();
        assert!(cmds.contains(&AudioCommand::SetMuted(false)));
        assert_eq!(last_play(&cmds).purpose, PlayPurpose::TryUnmute);

        // Browser refuses audible autoplay
        p.on_play_result(last_play(&cmds), false);
        let cmds = p.drain_commands();
        assert!(cmds.contains(&AudioCommand::SetMuted(true)));
        assert!(cmds.contains(&AudioCommand::ShowHint));
        assert!(p.is_muted());
        assert!(!p.is_unlocked());
    }

    #[test]
    fn test_sound_off_never_unmutes() {
        let mut p = player(SoundPref::Off);
        p.start(None);
        let req = last_play(&p.drain_commands());
        p.on_play_result(req, true);
        p.on_gesture();
        let cmds = p.drain_commands();
        assert!(!cmds.contains(&AudioCommand::SetMuted(false)));
        assert!(p.is_muted());
    }

    #[test]
    fn test_single_track_loops_with_fade_in() {
        let mut p = playing(&["a.mp3"]);
        assert_eq!(p.current(), Some("a.mp3"));

        p.on_ended();
        let cmds = p.drain_commands();
        assert_eq!(cmds[0], AudioCommand::Seek(0.0));
        assert_eq!(cmds[1], AudioCommand::SetVolume(0.0));
        assert!(loaded(&cmds).is_none());
        let req = last_play(&cmds);
        assert_eq!(req.purpose, PlayPurpose::Loop);

        p.on_play_result(req, true);
        let mut ramp = Vec::new();
        loop {
            let more = p.fade_tick();
            ramp.extend(volumes(&p.drain_commands()));
            if !more {
                break;
            }
        }
        assert_eq!(ramp.len(), 17);
        assert!(ramp.windows(2).all(|w| w[1] > w[0]));
        assert!((ramp[16] - 0.2).abs() < 1e-6);
        assert_eq!(p.phase(), BgmPhase::Playing);
    }

    #[test]
    fn test_shuffle_never_repeats() {
        let mut p = playing(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut prev = p.current().map(str::to_string);
        for _ in 0..30 {
            p.on_ended();
            let next = loaded(&p.drain_commands());
            assert!(next.is_some());
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn test_end_of_track_fade() {
        let mut p = playing(&["a.mp3", "b.mp3"]);
        p.on_time_update(50.0, 100.0);
        assert!(!p.is_fading());
        p.on_time_update(98.5, 100.0);
        assert!(p.is_fading());
        settle(&mut p);
        assert_eq!(p.volume(), 0.0);

        // Only once per track
        p.on_time_update(99.0, 100.0);
        assert!(!p.is_fading());
    }

    #[test]
    fn test_short_track_has_no_end_fade() {
        let mut p = playing(&["a.mp3"]);
        p.on_time_update(9.0, 10.0);
        assert!(!p.is_fading());
        p.on_time_update(9.0, f64::INFINITY);
        assert!(!p.is_fading());
    }

    #[test]
    fn test_toggle_off_fades_then_mutes() {
        let mut p = playing(&["a.mp3"]);
        assert_eq!(p.toggle(), SoundPref::Off);
        let cmds = p.drain_commands();
        assert!(cmds.contains(&AudioCommand::ShowToggle { on: false }));
        assert!(!p.is_muted());

        while p.fade_tick() {}
        let cmds = p.drain_commands();
        assert_eq!(cmds.last(), Some(&AudioCommand::SetMuted(true)));
        assert!(p.is_muted());

        assert_eq!(p.toggle(), SoundPref::On);
        let cmds = p.drain_commands();
        assert!(cmds.contains(&AudioCommand::SetMuted(false)));
        assert!(p.is_fading());
    }

    #[test]
    fn test_ducking() {
        let mut p = playing(&["a.mp3"]);
        p.set_ducked(true);
        settle(&mut p);
        assert_eq!(p.volume(), 0.0);
        assert!(!p.is_muted());

        p.set_ducked(false);
        settle(&mut p);
        assert!((p.volume() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_new_fade_replaces_running_one() {
        let mut p = playing(&["a.mp3"]);
        p.set_ducked(true);
        p.fade_tick();
        p.fade_tick();
        p.set_ducked(false);
        settle(&mut p);
        assert!((p.volume() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_resumed_track_kept_when_in_pool() {
        let mut p = player(SoundPref::On);
        p.start(Some(PlaybackSnapshot {
            url: "b.mp3".into(),
            position: 12.0,
        }));
        let cmds = p.drain_commands();
        assert_eq!(
            cmds[0],
            AudioCommand::Load {
                url: "b.mp3".into(),
                position: 12.0
            }
        );

        p.on_tracks_discovered(vec!["a.mp3".into(), "b.mp3".into()]);
        assert!(loaded(&p.drain_commands()).is_none());
        assert_eq!(p.phase(), BgmPhase::Playing);
        assert_eq!(p.current(), Some("b.mp3"));
    }

    #[test]
    fn test_stale_resume_switches_track() {
        let mut p = player(SoundPref::On);
        p.start(Some(PlaybackSnapshot {
            url: "gone.mp3".into(),
            position: 3.0,
        }));
        p.drain_commands();
        p.on_tracks_discovered(vec!["a.mp3".into()]);
        assert_eq!(loaded(&p.drain_commands()).as_deref(), Some("a.mp3"));
        assert_eq!(p.phase(), BgmPhase::Switching);
    }

    #[test]
    fn test_empty_pool_uses_fallback() {
        let mut p = player(SoundPref::On);
        p.on_tracks_discovered(Vec::new());
        assert_eq!(p.tracks(), &[FALLBACK_TRACK.to_string()]);
    }

    #[test]
    fn test_every_track_failing_stops() {
        let mut p = playing(&["a.mp3", "b.mp3"]);
        p.on_media_error();
        assert_eq!(p.phase(), BgmPhase::Switching);
        p.on_media_error();
        assert_eq!(p.phase(), BgmPhase::Idle);
        assert!(p.drain_commands().contains(&AudioCommand::Pause));
    }

    #[test]
    fn test_persist_throttled() {
        let mut p = playing(&["a.mp3"]);
        p.on_time_update(10.0, 100.0);
        assert_eq!(
            p.persist(0.0),
            Some(PlaybackSnapshot {
                url: "a.mp3".into(),
                position: 10.0
            })
        );
        assert!(p.persist(1000.0).is_none());
        assert!(p.persist(4000.0).is_some());
    }

    #[test]
    fn test_toggle_while_ducked_turns_off() {
        let mut p = playing(&["a.mp3"]);
        p.set_ducked(true);
        settle(&mut p);
        assert_eq!(p.volume(), 0.0);

        assert_eq!(p.toggle(), SoundPref::Off);
        let cmds = p.drain_commands();
        assert!(cmds.contains(&AudioCommand::ShowToggle { on: false }));
        assert!(p.is_muted());

        p.set_ducked(false);
        settle(&mut p);
        assert_eq!(p.volume(), 0.0);
        assert!(p.is_muted());
    }

    #[test]
    fn test_toggle_during_end_fade_turns_off() {
        let mut p = playing(&["a.mp3", "b.mp3"]);
        p.on_time_update(98.5, 100.0);
        settle(&mut p);
        assert_eq!(p.toggle(), SoundPref::Off);
        assert_eq!(p.sound(), SoundPref::Off);
    }

    #[test]
    fn test_missing_bootstrap_track_shows_no_hint() {
        let mut p = player(SoundPref::On);
        p.start(None);
        let req = last_play(&p.drain_commands());
        p.on_media_error();
        p.on_play_result(req, false);
        assert!(!p.drain_commands().contains(&AudioCommand::ShowHint));

        // A real autoplay block on the discovered track still hints
        p.on_tracks_discovered(vec!["a.mp3".into()]);
        let req = last_play(&p.drain_commands());
        assert_eq!(req.purpose, PlayPurpose::Track);
        p.on_play_result(req, false);
        assert!(p.drain_commands().contains(&AudioCommand::ShowHint));
    }

    #[test]
    fn test_gesture_only_once() {
        let mut p = player(SoundPref::On);
        p.start(None);
        assert!(p.on_gesture());
        assert!(!p.on_gesture());
        assert!(p.drain_commands().contains(&AudioCommand::StopListeningForGesture));
    }
}
