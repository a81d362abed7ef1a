use std::time::{Duration, Instant};

use devtype::config::Config;
use devtype::engine::PracticeEngine;
use devtype::keyboard::KeyCode;
use devtype::session::{KeystrokeOutcome, SessionSummary};
use devtype::store::{HistoryData, JsonStore};
use devtype::text::PassageSource;
use tracing::{info, warn};

use crate::input_map::PhysicalPress;
use crate::ui::components::stats_sidebar::Benchmarks;
use crate::ui::theme::Theme;

/// How long a key stays lit on the diagram without a release event.
pub const KEY_HIGHLIGHT: Duration = Duration::from_millis(150);

const RECENT_SESSIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Practice,
    SessionResult,
}

pub struct App {
    pub screen: AppScreen,
    pub engine: PracticeEngine,
    pub config: Config,
    pub theme: &'static Theme,
    pub passages: PassageSource,
    pub store: Option<JsonStore>,
    pub history: HistoryData,
    pub last_summary: Option<SessionSummary>,
    pub last_pressed: Option<KeyCode>,
    pub last_key_time: Option<Instant>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        engine: PracticeEngine,
        config: Config,
        theme: &'static Theme,
        passages: PassageSource,
        store: Option<JsonStore>,
    ) -> Self {
        let history = store
            .as_ref()
            .map(JsonStore::load_history)
            .unwrap_or_default();
        let mut app = Self {
            screen: AppScreen::Practice,
            engine,
            config,
            theme,
            passages,
            store,
            history,
            last_summary: None,
            last_pressed: None,
            last_key_time: None,
            should_quit: false,
        };
        app.next_passage();
        app
    }

    pub fn next_passage(&mut self) {
        let Some(text) = self.passages.next_passage().map(str::to_string) else {
            warn!("no practice passages available");
            return;
        };
        self.engine.start_text(&text);
        self.last_summary = None;
        self.screen = AppScreen::Practice;
    }

    pub fn retry(&mut self) {
        self.engine.reset();
        self.last_summary = None;
        self.screen = AppScreen::Practice;
    }

    pub fn handle_press(&mut self, press: PhysicalPress, now: Instant) {
        self.last_pressed = Some(press.key);
        self.last_key_time = Some(now);
        let outcome = self
            .engine
            .handle_key(&press.key.to_string(), &press.pressed, now);
        if let KeystrokeOutcome::Accepted {
            completed: Some(summary),
            ..
        } = outcome
        {
            self.finish(summary);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last_key_time
            && now.saturating_duration_since(last) > KEY_HIGHLIGHT
        {
            self.last_pressed = None;
            self.last_key_time = None;
        }
        if let Some(summary) = self.engine.tick(now) {
            self.finish(summary);
        }
    }

    fn finish(&mut self, summary: SessionSummary) {
        if let Some(store) = &self.store {
            match store.append_summary(&summary) {
                Ok(history) => self.history = history,
                Err(e) => warn!("failed to save session history: {e:#}"),
            }
        }
        self.last_summary = Some(summary);
        self.screen = AppScreen::SessionResult;
    }

    /// Switch to the next layout and remember it.
    pub fn cycle_layout(&mut self) {
        let id = self.engine.select_next_layout();
        self.config.keyboard_layout = id.clone();
        if let Err(e) = self.config.save() {
            warn!("failed to save config: {e:#}");
        }
        info!("switched to layout '{id}'");
    }

    /// Figures the sidebar compares the running session against.
    pub fn benchmarks(&self) -> Benchmarks {
        let layout_id = self.engine.registry().current_layout().id();
        Benchmarks {
            target_wpm: self.config.target_wpm,
            best_wpm: self.history.best_wpm(layout_id),
            recent_wpm: self.history.recent_wpm(layout_id, RECENT_SESSIONS),
        }
    }
}
