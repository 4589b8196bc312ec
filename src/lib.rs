//! Pose Catch - A three-lane falling-item catch game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, scoring)
//! - `session`: Session lifecycle, observers and render snapshots
//! - `label`: Pose label mapping and prediction stabilization
//! - `settings`: Data-driven game balance

pub mod error;
pub mod label;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use label::{Prediction, PredictionStabilizer};
pub use session::{EndReason, RenderSnapshot, SessionController, SessionObserver};
pub use settings::Settings;
pub use sim::{Lane, SessionPhase};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the reference display refresh)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap fed to the accumulator (tab switches, debugger stops)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Default play field dimensions
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 400.0;

    /// Catcher sits this far above the bottom edge
    pub const CATCHER_OFFSET: f32 = 50.0;
    /// Items catch when within this vertical distance of the catcher
    pub const CATCH_TOLERANCE: f32 = 30.0;
    /// Items spawn this far above the visible field
    pub const SPAWN_Y: f32 = -30.0;

    /// Draw radii used by the presentation layer
    pub const CATCHER_RADIUS: f32 = 20.0;
    pub const ITEM_RADIUS: f32 = 15.0;
}
