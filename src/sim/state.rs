//! Game state and core simulation types
//!
//! Everything a single session mutates lives in `SessionState`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Never started
    #[default]
    Idle,
    /// Ticks and countdown are running
    Active,
    /// Session over (timeout, hazard or explicit stop)
    Ended,
}

/// One of the three catch positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    /// Lanes in left-to-right order
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Center => 1,
            Lane::Right => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Left => "LEFT",
            Lane::Center => "CENTER",
            Lane::Right => "RIGHT",
        }
    }
}

/// Play field dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal center of a lane's band (field split into thirds)
    pub fn lane_x(&self, lane: Lane) -> f32 {
        let band = self.width / 3.0;
        band * lane.index() as f32 + band / 2.0
    }

    /// Fixed vertical position of the catcher
    pub fn catcher_y(&self) -> f32 {
        self.height - CATCHER_OFFSET
    }
}

/// Immutable item type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCategory {
    pub name: String,
    /// Points awarded on catch (ignored for hazards)
    pub score_value: i64,
    /// Share of spawns, in (0, 1]
    pub selection_weight: f64,
    /// Catching this ends the session
    #[serde(default)]
    pub hazard: bool,
    /// CSS color for the presentation layer
    #[serde(default)]
    pub color: String,
}

impl ItemCategory {
    pub fn new(name: &str, score_value: i64, selection_weight: f64, color: &str) -> Self {
        Self {
            name: name.to_string(),
            score_value,
            selection_weight,
            hazard: false,
            color: color.to_string(),
        }
    }

    pub fn hazard(mut self) -> Self {
        self.hazard = true;
        self
    }

    /// Apple, orange and bomb, in spawn-walk order
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("APPLE", 100, 0.5, "red"),
            Self::new("ORANGE", 200, 0.3, "orange"),
            Self::new("BOMB", -500, 0.2, "black").hazard(),
        ]
    }
}

/// A falling item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub category: ItemCategory,
    pub lane: Lane,
    /// Vertical position, growing downward
    pub y: f32,
}

/// Gameplay events produced by a simulation step
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned { id: u32, lane: Lane },
    Missed { id: u32 },
    Caught { id: u32, points: i64 },
    LevelUp { level: u32 },
    HazardCaught { id: u32 },
}

/// Complete per-session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: i64,
    /// Highest level reached this session, never below 1
    pub level: u32,
    pub time_remaining: u32,
    pub phase: SessionPhase,
    /// Units per simulation step
    pub fall_speed: f32,
    pub spawn_interval_ms: u32,
    /// Simulation clock of the most recent spawn
    pub last_spawn_ms: Option<f64>,
    /// Simulation clock, advanced by `SIM_DT_MS` per step
    pub clock_ms: f64,
    pub catcher_lane: Lane,
    /// Live items in insertion order
    pub items: Vec<Item>,
    pub field: Field,
    /// Next entity ID
    next_id: u32,
}

impl SessionState {
    /// Fresh session state (phase `Idle`) for the given balance and field
    pub fn new(settings: &Settings, field: Field) -> Self {
        Self {
            score: 0,
            level: 1,
            time_remaining: settings.time_limit_secs,
            phase: SessionPhase::Idle,
            fall_speed: settings.base_fall_speed,
            spawn_interval_ms: settings.base_spawn_interval_ms,
            last_spawn_ms: None,
            clock_ms: 0.0,
            catcher_lane: Lane::Center,
            items: Vec::new(),
            field,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }
}
