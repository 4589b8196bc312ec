//! Idle/demo catcher control
//!
//! Chases the lowest catchable fruit and steps out from under hazards.

use super::state::{Item, Lane, SessionState};
use crate::consts::CATCH_TOLERANCE;

/// Items that can still reach the catcher
fn catchable(state: &SessionState) -> impl Iterator<Item = &Item> {
    let limit = state.field.catcher_y() + CATCH_TOLERANCE;
    state.items.iter().filter(move |item| item.y < limit)
}

/// A hazard sits below `y` in `lane`, so chasing there means catching it first
fn hazard_below(state: &SessionState, lane: Lane, y: f32) -> bool {
    catchable(state).any(|item| item.category.hazard && item.lane == lane && item.y > y)
}

/// Suggest a lane for the catcher, or `None` to stay put
pub fn suggest_lane(state: &SessionState) -> Option<Lane> {
    let target = catchable(state)
        .filter(|item| !item.category.hazard)
        .filter(|item| !hazard_below(state, item.lane, item.y))
        .max_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));

    if let Some(item) = target {
        return Some(item.lane);
    }

    let current = state.catcher_lane;
    if !hazard_below(state, current, f32::NEG_INFINITY) {
        return None;
    }

    // Nearest lane without an incoming hazard
    let mut lanes = Lane::ALL;
    lanes.sort_by_key(|lane| lane.index().abs_diff(current.index()));
    lanes
        .into_iter()
        .find(|lane| !hazard_below(state, *lane, f32::NEG_INFINITY))
}
