//! Session lifecycle
//!
//! `SessionController` owns one `SessionState` and drives it from two
//! external clocks: `frame` (display refresh, fed into a fixed-timestep
//! accumulator) and `countdown` (1 Hz). Observers hear about score, time and
//! the end of the session synchronously from inside those calls.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};
use crate::label::lane_for_label;
use crate::settings::Settings;
use crate::sim::{CollisionOutcome, Field, GameEvent, Lane, SessionPhase, SessionState, tick};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Countdown reached zero
    TimedOut,
    /// Catcher caught a hazard item
    Hazard,
    /// Embedding application called `stop`
    Stopped,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::TimedOut => "TimedOut",
            EndReason::Hazard => "Hazard",
            EndReason::Stopped => "Stopped",
        }
    }
}

/// Receives session notifications.
///
/// Called synchronously from `start`, `frame`, `countdown` and `stop`;
/// implementations must not call back into the controller.
pub trait SessionObserver {
    fn on_score_changed(&mut self, _score: i64, _level: u32) {}
    fn on_time_changed(&mut self, _seconds_remaining: u32) {}
    fn on_session_ended(&mut self, _final_score: i64, _final_level: u32, _reason: EndReason) {}
    /// Per-item gameplay events (spawns, catches, misses, level-ups).
    ///
    /// Delivered after each frame's steps, before `on_score_changed`.
    fn on_game_event(&mut self, _event: &GameEvent) {}
}

/// Drawable view of one item
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: u32,
    pub name: String,
    pub color: String,
    pub hazard: bool,
    pub lane: Lane,
    pub pos: Vec2,
}

/// Read-only view of the session for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub field: Field,
    pub phase: SessionPhase,
    pub catcher_lane: Lane,
    pub catcher_pos: Vec2,
    pub items: Vec<ItemView>,
    pub score: i64,
    pub level: u32,
    pub time_remaining: u32,
}

/// Owns and drives one game session at a time
pub struct SessionController<R: Rng = Pcg32> {
    settings: Settings,
    /// Set by `configure`; `start` refuses to run without it
    field: Option<Field>,
    state: SessionState,
    rng: R,
    observers: Vec<Box<dyn SessionObserver>>,
    end_reason: Option<EndReason>,
    accumulator_ms: f64,
    last_frame_ms: Option<f64>,
    events: Vec<GameEvent>,
}

impl SessionController<Pcg32> {
    /// Controller with a seeded PCG RNG
    pub fn new(
        settings: Settings,
        seed: u64,
        observers: Vec<Box<dyn SessionObserver>>,
    ) -> Result<Self> {
        Self::with_rng(settings, Pcg32::seed_from_u64(seed), observers)
    }
}

impl<R: Rng> SessionController<R> {
    /// Controller with a caller-supplied randomness source
    pub fn with_rng(
        settings: Settings,
        rng: R,
        observers: Vec<Box<dyn SessionObserver>>,
    ) -> Result<Self> {
        settings.validate()?;
        let state = SessionState::new(&settings, Field::default());
        Ok(Self {
            settings,
            field: None,
            state,
            rng,
            observers,
            end_reason: None,
            accumulator_ms: 0.0,
            last_frame_ms: None,
            events: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Set the play field size; lanes are its thirds.
    ///
    /// Non-positive or non-finite sizes are ignored.
    pub fn configure(&mut self, width: f32, height: f32) {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            log::warn!("Ignoring invalid field size {width}x{height}");
            return;
        }
        let field = Field::new(width, height);
        self.field = Some(field);
        self.state.field = field;
        log::info!("Field configured: {width}x{height}");
    }

    pub fn is_configured(&self) -> bool {
        self.field.is_some()
    }

    /// Begin a fresh session from `Idle` or `Ended`
    pub fn start(&mut self) -> Result<()> {
        let field = self.field.ok_or(GameError::NotInitialized)?;
        if self.state.is_active() {
            return Err(GameError::AlreadyActive);
        }

        self.state = SessionState::new(&self.settings, field);
        self.state.phase = SessionPhase::Active;
        self.end_reason = None;
        self.accumulator_ms = 0.0;
        self.last_frame_ms = None;
        self.events.clear();

        log::info!(
            "Session started ({} s, spawn every {} ms)",
            self.state.time_remaining,
            self.state.spawn_interval_ms
        );
        self.notify_score();
        self.notify_time();
        Ok(())
    }

    /// End the running session. No-op unless `Active`.
    pub fn stop(&mut self) {
        self.end(EndReason::Stopped);
    }

    fn end(&mut self, reason: EndReason) {
        if !self.state.is_active() {
            return;
        }
        self.state.phase = SessionPhase::Ended;
        self.end_reason = Some(reason);
        self.last_frame_ms = None;

        log::info!(
            "Session ended ({}): score {}, level {}",
            reason.as_str(),
            self.state.score,
            self.state.level
        );
        let (score, level) = (self.state.score, self.state.level);
        for observer in &mut self.observers {
            observer.on_session_ended(score, level, reason);
        }
    }

    /// Display-refresh callback with a monotonic timestamp in ms.
    ///
    /// Elapsed time is consumed in fixed `SIM_DT_MS` steps.
    pub fn frame(&mut self, now_ms: f64) {
        if !self.state.is_active() || !now_ms.is_finite() {
            return;
        }

        let dt = match self.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => SIM_DT_MS,
        };
        self.last_frame_ms = Some(now_ms);
        self.accumulator_ms += dt;

        let before = (self.state.score, self.state.level);
        let mut outcome = CollisionOutcome::Continue;
        let mut substeps = 0;
        while self.accumulator_ms >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            outcome = tick(&mut self.state, &self.settings, &mut self.rng, &mut self.events);
            self.accumulator_ms -= SIM_DT_MS;
            substeps += 1;
            if outcome == CollisionOutcome::Hazard {
                break;
            }
        }

        for event in self.events.drain(..) {
            log::debug!("{event:?}");
            for observer in &mut self.observers {
                observer.on_game_event(&event);
            }
        }
        if (self.state.score, self.state.level) != before {
            self.notify_score();
        }
        if outcome == CollisionOutcome::Hazard {
            self.end(EndReason::Hazard);
        }
    }

    /// 1 Hz timer callback
    pub fn countdown(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        self.notify_time();
        if self.state.time_remaining == 0 {
            self.end(EndReason::TimedOut);
        }
    }

    /// Move the catcher. Ignored unless `Active`.
    pub fn set_catcher_lane(&mut self, lane: Lane) {
        if self.state.is_active() {
            self.state.catcher_lane = lane;
        }
    }

    /// Feed a stabilized pose label; unknown labels are ignored
    pub fn on_label(&mut self, label: &str) {
        match lane_for_label(label) {
            Some(lane) => self.set_catcher_lane(lane),
            None => log::debug!("Ignoring unknown label {label:?}"),
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let field = self.state.field;
        let items = self
            .state
            .items
            .iter()
            .map(|item| ItemView {
                id: item.id,
                name: item.category.name.clone(),
                color: item.category.color.clone(),
                hazard: item.category.hazard,
                lane: item.lane,
                pos: Vec2::new(field.lane_x(item.lane), item.y),
            })
            .collect();

        RenderSnapshot {
            field,
            phase: self.state.phase,
            catcher_lane: self.state.catcher_lane,
            catcher_pos: Vec2::new(field.lane_x(self.state.catcher_lane), field.catcher_y()),
            items,
            score: self.state.score,
            level: self.state.level,
            time_remaining: self.state.time_remaining,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Reason the most recent session ended, if it has
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    fn notify_score(&mut self) {
        let (score, level) = (self.state.score, self.state.level);
        for observer in &mut self.observers {
            observer.on_score_changed(score, level);
        }
    }

    fn notify_time(&mut self) {
        let secs = self.state.time_remaining;
        for observer in &mut self.observers {
            observer.on_time_changed(secs);
        }
    }
}
