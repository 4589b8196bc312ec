//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected RNG only
//! - Stable iteration order (insertion order, resolved newest first)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

#[cfg(test)]
pub(crate) mod testing;

pub use collision::{CollisionOutcome, apply_score, level_for_score, resolve_collisions};
pub use spawn::{maybe_spawn, pick_category, pick_lane};
pub use state::{Field, GameEvent, Item, ItemCategory, Lane, SessionPhase, SessionState};
pub use tick::{advance, tick};
