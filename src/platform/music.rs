//! Drives a hidden `<audio>` element from the background music state machine

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, Element, Event, HtmlAudioElement};

use super::dom;
use super::host::WebAssetHost;
use crate::bgm::{
    AudioCommand, BgmConfig, BgmPlayer, DuckSources, PlayRequest, PlaybackScope,
    PlaybackSnapshot, discover_pool,
};
use crate::events::EventBus;
use crate::prefs::{Preferences, SoundPref};
use crate::storage::KeyValueStore;
use crate::tuning::Tuning;

pub const TOGGLE_CLASS: &str = "music-toggle";
pub const HINT_CLASS: &str = "music-hint";
pub const HINT_TEXT: &str = "Click to enable sound";

/// Events that carry user activation
const GESTURES: [&str; 6] = [
    "click",
    "keydown",
    "pointerdown",
    "pointerup",
    "touchstart",
    "touchend",
];

pub struct MusicDriver {
    me: Weak<Self>,
    player: RefCell<BgmPlayer>,
    audio: HtmlAudioElement,
    scope: PlaybackScope,
    tuning: Rc<Tuning>,
    prefs: RefCell<Preferences>,
    local: Rc<dyn KeyValueStore>,
    duck: RefCell<DuckSources>,
    toggle: RefCell<Option<Element>>,
    hint: RefCell<Option<Element>>,
    pending_seek: Cell<Option<f64>>,
    gesture_armed: Cell<bool>,
    gesture_wired: Cell<bool>,
    fade_timer: Cell<Option<i32>>,
}

impl MusicDriver {
    #[allow(clippy::too_many_arguments)]
    pub fn mount(
        host: WebAssetHost,
        bus: &EventBus,
        tuning: Rc<Tuning>,
        prefs: Preferences,
        local: Rc<dyn KeyValueStore>,
        session: Rc<dyn KeyValueStore>,
        scope: PlaybackScope,
        mobile: bool,
    ) -> Option<Rc<Self>> {
        let body = dom::body()?;
        let audio: HtmlAudioElement = dom::create_as("audio", "bgm-audio")?;
        let _ = audio.set_attribute("preload", "auto");
        let _ = audio.set_attribute("playsinline", "");
        dom::set_style(&audio, "display", "none");
        let _ = body.append_child(&audio);

        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64 ^ dom::now_ms() as u64;
        let player = BgmPlayer::new(
            BgmConfig {
                scope: scope.clone(),
                sound: prefs.sound,
                volume: prefs.bgm_volume,
                mobile,
                seed,
            },
            &tuning,
        );
        log::info!("Music player for {:?} (seed {})", scope, seed);

        let driver = Rc::new_cyclic(|me| Self {
            me: me.clone(),
            player: RefCell::new(player),
            audio,
            scope,
            tuning,
            prefs: RefCell::new(prefs),
            local,
            duck: RefCell::new(DuckSources::new()),
            toggle: RefCell::new(None),
            hint: RefCell::new(None),
            pending_seek: Cell::new(None),
            gesture_armed: Cell::new(false),
            gesture_wired: Cell::new(false),
            fade_timer: Cell::new(None),
        });

        driver.wire_audio();
        driver.wire_page();
        {
            let weak = Rc::downgrade(&driver);
            bus.subscribe(move |event| {
                let Some(driver) = weak.upgrade() else {
                    return;
                };
                let changed = driver.duck.borrow_mut().observe(event);
                if let Some(ducked) = changed {
                    driver.with_player(|p| p.set_ducked(ducked));
                }
            });
        }

        let resume = PlaybackSnapshot::load(driver.local.as_ref(), &driver.scope);
        driver.with_player(|p| p.start(resume));

        let discovering = driver.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let pool = discover_pool(
                &host,
                session.as_ref(),
                &discovering.scope,
                &discovering.tuning,
                mobile,
            )
            .await;
            discovering.with_player(|p| p.on_tracks_discovered(pool));
        });

        Some(driver)
    }

    /// Run a player operation, then apply whatever it queued
    fn with_player<R>(&self, f: impl FnOnce(&mut BgmPlayer) -> R) -> R {
        let result = f(&mut self.player.borrow_mut());
        self.flush();
        result
    }

    fn flush(&self) {
        loop {
            let commands = self.player.borrow_mut().drain_commands();
            if commands.is_empty() {
                break;
            }
            for command in commands {
                self.apply(command);
            }
        }
        if self.player.borrow().is_fading() {
            self.ensure_fade_timer();
        }
    }

    fn apply(&self, command: AudioCommand) {
        match command {
            AudioCommand::Load { url, position } => {
                self.audio.set_src(&url);
                self.pending_seek.set((position > 0.0).then_some(position));
            }
            AudioCommand::Seek(position) => self.audio.set_current_time(position),
            AudioCommand::Play(request) => self.play(request),
            AudioCommand::Pause => {
                let _ = self.audio.pause();
            }
            AudioCommand::SetVolume(volume) => self.audio.set_volume(volume as f64),
            AudioCommand::SetMuted(muted) => self.audio.set_muted(muted),
            AudioCommand::ShowToggle { on } => self.render_toggle(on),
            AudioCommand::ShowHint => self.show_hint(),
            AudioCommand::ListenForGesture => self.arm_gesture(),
            AudioCommand::StopListeningForGesture => {
                self.gesture_armed.set(false);
                if let Some(hint) = self.hint.borrow_mut().take() {
                    hint.remove();
                }
            }
        }
    }

    /// `play()` settles asynchronously; the result goes back to the player
    fn play(&self, request: PlayRequest) {
        let weak = self.me.clone();
        match self.audio.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                let ok = match JsFuture::from(promise).await {
                    Ok(_) => true,
                    Err(e) => {
                        let name = e.dyn_ref::<DomException>().map(|d| d.name());
                        // Load failures and superseded plays arrive through the
                        // `error` event or the next request instead
                        if name.as_deref().is_some_and(|n| n != "NotAllowedError") {
                            log::debug!("play() rejected: {:?}", name);
                            return;
                        }
                        false
                    }
                };
                if let Some(driver) = weak.upgrade() {
                    driver.with_player(|p| p.on_play_result(request, ok));
                }
            }),
            Err(e) => {
                log::debug!("play() threw: {:?}", e);
                dom::set_timeout(0.0, move || {
                    if let Some(driver) = weak.upgrade() {
                        driver.with_player(|p| p.on_play_result(request, false));
                    }
                });
            }
        }
    }

    fn ensure_fade_timer(&self) {
        if self.fade_timer.get().is_some() {
            return;
        }
        let weak = self.me.clone();
        let id = dom::set_interval(self.tuning.fade_interval_ms, move || {
            let Some(driver) = weak.upgrade() else {
                return;
            };
            let running = driver.with_player(|p| p.fade_tick());
            if !running {
                if let Some(id) = driver.fade_timer.take() {
                    dom::clear_interval(id);
                }
            }
        });
        self.fade_timer.set(id);
    }

    fn wire_audio(&self) {
        let weak = self.me.clone();
        dom::listen(&self.audio, "loadedmetadata", move |_event: Event| {
            if let Some(driver) = weak.upgrade() {
                if let Some(position) = driver.pending_seek.take() {
                    let duration = driver.audio.duration();
                    if !duration.is_finite() || position < duration {
                        driver.audio.set_current_time(position);
                    }
                }
            }
        });

        let weak = self.me.clone();
        dom::listen(&self.audio, "ended", move |_event: Event| {
            if let Some(driver) = weak.upgrade() {
                driver.with_player(|p| p.on_ended());
            }
        });

        let weak = self.me.clone();
        dom::listen(&self.audio, "error", move |_event: Event| {
            if let Some(driver) = weak.upgrade() {
                driver.with_player(|p| p.on_media_error());
            }
        });

        let weak = self.me.clone();
        dom::listen(&self.audio, "timeupdate", move |_event: Event| {
            let Some(driver) = weak.upgrade() else {
                return;
            };
            let (position, duration) = (driver.audio.current_time(), driver.audio.duration());
            let snapshot = driver.with_player(|p| {
                p.on_time_update(position, duration);
                p.persist(dom::now_ms())
            });
            if let Some(snapshot) = snapshot {
                driver.save(&snapshot);
            }
        });
    }

    /// Page-lifetime listeners; these hold the driver alive
    fn wire_page(self: &Rc<Self>) {
        if let Some(window) = dom::window() {
            let driver = self.clone();
            dom::listen(&window, "pagehide", move |_event: Event| driver.save_now());
        }
        if let Some(document) = dom::document() {
            let driver = self.clone();
            let doc = document.clone();
            dom::listen(&document, "visibilitychange", move |_event: Event| {
                if doc.hidden() {
                    driver.save_now();
                } else {
                    let paused = driver.audio.paused();
                    driver.with_player(|p| p.on_page_shown(paused));
                }
            });
        }
    }

    fn save(&self, snapshot: &PlaybackSnapshot) {
        snapshot.save(self.local.as_ref(), &self.scope);
        self.prefs.borrow().save_bgm_volume(self.local.as_ref());
    }

    fn save_now(&self) {
        let snapshot = self.player.borrow().snapshot();
        if let Some(snapshot) = snapshot {
            self.save(&snapshot);
        }
    }

    /// Listeners are attached once and gated by a flag afterwards
    fn arm_gesture(&self) {
        self.gesture_armed.set(true);
        if self.gesture_wired.replace(true) {
            return;
        }
        let Some(document) = dom::document() else {
            return;
        };
        for name in GESTURES {
            let weak = self.me.clone();
            dom::listen(&document, name, move |event: Event| {
                let Some(driver) = weak.upgrade() else {
                    return;
                };
                if !driver.gesture_armed.get() || on_toggle(&event) {
                    return;
                }
                driver.gesture_armed.set(false);
                driver.with_player(|p| p.on_gesture());
            });
        }
    }

    fn render_toggle(&self, on: bool) {
        if self.toggle.borrow().is_none() {
            let Some(button) = dom::create("button", TOGGLE_CLASS) else {
                return;
            };
            let _ = button.set_attribute("type", "button");
            let weak = self.me.clone();
            dom::listen(&button, "click", move |event: Event| {
                event.prevent_default();
                if let Some(driver) = weak.upgrade() {
                    driver.toggle_sound();
                }
            });
            if let Some(body) = dom::body() {
                let _ = body.append_child(&button);
            }
            *self.toggle.borrow_mut() = Some(button);
        }
        if let Some(button) = self.toggle.borrow().as_ref() {
            button.set_text_content(Some(if on { "Sound: On" } else { "Sound: Off" }));
            let _ = button.set_attribute("aria-pressed", if on { "true" } else { "false" });
        }
    }

    fn toggle_sound(&self) {
        let sound: SoundPref = self.with_player(|p| p.toggle());
        let mut prefs = self.prefs.borrow_mut();
        prefs.sound = sound;
        prefs.save_sound(self.local.as_ref());
    }

    fn show_hint(&self) {
        let Some(hint) = dom::create("div", HINT_CLASS) else {
            return;
        };
        hint.set_text_content(Some(HINT_TEXT));
        let _ = hint.set_attribute("role", "status");
        if let Some(body) = dom::body() {
            let _ = body.append_child(&hint);
        }
        let weak = self.me.clone();
        dom::set_timeout(self.tuning.hint_duration_ms, move || {
            if let Some(driver) = weak.upgrade() {
                if let Some(hint) = driver.hint.borrow_mut().take() {
                    hint.remove();
                }
            }
        });
        *self.hint.borrow_mut() = Some(hint);
    }
}

fn on_toggle(event: &Event) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(&format!(".{}", TOGGLE_CLASS)).ok().flatten())
        .is_some()
}
