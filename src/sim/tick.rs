//! Fixed timestep simulation tick
//!
//! One step = spawn, then move, then resolve catches.

use rand::Rng;

use super::collision::{CollisionOutcome, resolve_collisions};
use super::spawn::maybe_spawn;
use super::state::{GameEvent, Item, SessionState};
use crate::consts::SIM_DT_MS;
use crate::settings::Settings;

/// Move every item down by `fall_speed` and drop the ones below the field.
///
/// Dropped items are misses: they leave with no score effect.
pub fn advance(items: &mut Vec<Item>, fall_speed: f32, field_height: f32, events: &mut Vec<GameEvent>) {
    for item in items.iter_mut() {
        item.y += fall_speed;
    }
    items.retain(|item| {
        let inside = item.y <= field_height;
        if !inside {
            events.push(GameEvent::Missed { id: item.id });
        }
        inside
    });
}

/// Advance the session by one fixed timestep
pub fn tick<R: Rng>(
    state: &mut SessionState,
    settings: &Settings,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) -> CollisionOutcome {
    if !state.is_active() {
        return CollisionOutcome::Continue;
    }

    state.clock_ms += SIM_DT_MS;
    let now = state.clock_ms;

    if let Some(id) = maybe_spawn(state, &settings.categories, now, rng) {
        if let Some(item) = state.items.iter().find(|item| item.id == id) {
            events.push(GameEvent::Spawned { id, lane: item.lane });
        }
    }

    advance(&mut state.items, state.fall_speed, state.field.height, events);

    resolve_collisions(state, settings, events)
}
