//! Catcher collision detection and scoring
//!
//! Catch rule: the item's lane matches the catcher lane and its vertical
//! position is strictly within `CATCH_TOLERANCE` of the catcher.

use super::state::{GameEvent, Item, Lane, SessionState};
use crate::consts::CATCH_TOLERANCE;
use crate::settings::Settings;

/// Result of one collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Play continues
    Continue,
    /// A hazard was caught; the session must end
    Hazard,
}

/// Whether an item overlaps the catcher
#[inline]
pub fn item_caught(item: &Item, catcher_lane: Lane, catcher_y: f32) -> bool {
    item.lane == catcher_lane && (item.y - catcher_y).abs() < CATCH_TOLERANCE
}

/// Level implied by a score: `floor(score / points_per_level) + 1`, never below 1
pub fn level_for_score(score: i64, points_per_level: i64) -> u32 {
    let level = score.div_euclid(points_per_level) + 1;
    level.clamp(1, u32::MAX as i64) as u32
}

/// Add points and ratchet difficulty if a new level was reached.
///
/// Returns the new level when it increased.
pub fn apply_score(state: &mut SessionState, points: i64, settings: &Settings) -> Option<u32> {
    state.score += points;

    let level = level_for_score(state.score, settings.points_per_level);
    if level <= state.level {
        return None;
    }

    state.level = level;
    let gained = level - 1;
    state.spawn_interval_ms = state
        .spawn_interval_ms
        .min(settings.spawn_interval_for(gained));
    // One speed step per level-up, however many levels the points crossed
    state.fall_speed += settings.fall_speed_step;
    log::info!(
        "Level {level}: spawn every {} ms, fall speed {}",
        state.spawn_interval_ms,
        state.fall_speed
    );
    Some(level)
}

/// Resolve catches against the current catcher lane.
///
/// Items are visited newest first and removed as they resolve, so each item
/// is scored at most once. A hazard stops the pass immediately.
pub fn resolve_collisions(
    state: &mut SessionState,
    settings: &Settings,
    events: &mut Vec<GameEvent>,
) -> CollisionOutcome {
    let catcher_lane = state.catcher_lane;
    let catcher_y = state.field.catcher_y();

    let mut i = state.items.len();
    while i > 0 {
        i -= 1;
        if !item_caught(&state.items[i], catcher_lane, catcher_y) {
            continue;
        }

        let item = state.items.remove(i);
        if item.category.hazard {
            log::info!("Hazard {} caught in {}", item.category.name, catcher_lane.as_str());
            events.push(GameEvent::HazardCaught { id: item.id });
            return CollisionOutcome::Hazard;
        }

        let points = item.category.score_value;
        events.push(GameEvent::Caught {
            id: item.id,
            points,
        });
        if let Some(level) = apply_score(state, points, settings) {
            events.push(GameEvent::LevelUp { level });
        }
    }

    CollisionOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Field, ItemCategory};
    use proptest::prelude::*;

    fn state() -> (SessionState, Settings) {
        let settings = Settings::default();
        (SessionState::new(&settings, Field::default()), settings)
    }

    fn push_item(state: &mut SessionState, category: ItemCategory, lane: Lane, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.items.push(Item { id, category, lane, y });
        id
    }

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_score(0, 500), 1);
        assert_eq!(level_for_score(499, 500), 1);
        assert_eq!(level_for_score(500, 500), 2);
        assert_eq!(level_for_score(1999, 500), 4);
        // Negative scores never report below level 1
        assert_eq!(level_for_score(-100, 500), 1);
    }

    #[test]
    fn test_award_500_levels_up() {
        let (mut state, settings) = state();
        let before_interval = state.spawn_interval_ms;
        let before_speed = state.fall_speed;

        assert_eq!(apply_score(&mut state, 500, &settings), Some(2));
        assert_eq!(state.level, 2);
        assert_eq!(state.spawn_interval_ms, before_interval - 200);
        assert_eq!(state.fall_speed, before_speed + 0.5);
    }

    #[test]
    fn test_level_never_decreases() {
        let (mut state, settings) = state();
        apply_score(&mut state, 1000, &settings);
        assert_eq!(state.level, 3);
        let interval = state.spawn_interval_ms;
        let speed = state.fall_speed;

        assert_eq!(apply_score(&mut state, -800, &settings), None);
        assert_eq!(state.score, 200);
        assert_eq!(state.level, 3);
        assert_eq!(state.spawn_interval_ms, interval);
        assert_eq!(state.fall_speed, speed);
    }

    #[test]
    fn test_multi_level_jump() {
        let (mut state, settings) = state();
        assert_eq!(apply_score(&mut state, 1500, &settings), Some(4));
        assert_eq!(state.spawn_interval_ms, 900);
        assert_eq!(state.fall_speed, 2.5);
    }

    #[test]
    fn test_each_level_up_adds_one_speed_step() {
        let (mut state, settings) = state();
        assert_eq!(apply_score(&mut state, 1000, &settings), Some(3));
        assert_eq!(state.fall_speed, 2.5);
        assert_eq!(apply_score(&mut state, 100, &settings), None);
        assert_eq!(state.fall_speed, 2.5);
        assert_eq!(apply_score(&mut state, 500, &settings), Some(4));
        assert_eq!(state.fall_speed, 3.0);
        assert_eq!(state.spawn_interval_ms, 900);
    }

    #[test]
    fn test_catch_in_matching_lane() {
        let (mut state, settings) = state();
        let catcher_y = state.field.catcher_y();
        let id = push_item(&mut state, ItemCategory::defaults()[1].clone(), Lane::Center, catcher_y + 10.0);

        let mut events = Vec::new();
        let outcome = resolve_collisions(&mut state, &settings, &mut events);

        assert_eq!(outcome, CollisionOutcome::Continue);
        assert!(state.items.is_empty());
        assert_eq!(state.score, 200);
        assert_eq!(events, vec![GameEvent::Caught { id, points: 200 }]);
    }

    #[test]
    fn test_other_lane_not_caught() {
        let (mut state, settings) = state();
        let catcher_y = state.field.catcher_y();
        push_item(&mut state, ItemCategory::defaults()[0].clone(), Lane::Left, catcher_y);

        let mut events = Vec::new();
        resolve_collisions(&mut state, &settings, &mut events);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.score, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_tolerance_is_strict() {
        let (mut state, settings) = state();
        let catcher_y = state.field.catcher_y();
        push_item(&mut state, ItemCategory::defaults()[0].clone(), Lane::Center, catcher_y - CATCH_TOLERANCE);

        let mut events = Vec::new();
        resolve_collisions(&mut state, &settings, &mut events);
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_hazard_stops_pass() {
        let (mut state, settings) = state();
        let catcher_y = state.field.catcher_y();
        let cats = ItemCategory::defaults();
        push_item(&mut state, cats[0].clone(), Lane::Center, catcher_y);
        let bomb = push_item(&mut state, cats[2].clone(), Lane::Center, catcher_y);

        let mut events = Vec::new();
        let outcome = resolve_collisions(&mut state, &settings, &mut events);

        assert_eq!(outcome, CollisionOutcome::Hazard);
        // Newest first: the bomb resolves before the apple is visited
        assert_eq!(events, vec![GameEvent::HazardCaught { id: bomb }]);
        assert_eq!(state.score, 0);
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_each_item_scored_once() {
        let (mut state, settings) = state();
        let catcher_y = state.field.catcher_y();
        let apple = ItemCategory::defaults()[0].clone();
        push_item(&mut state, apple.clone(), Lane::Center, catcher_y);
        push_item(&mut state, apple, Lane::Center, catcher_y + 5.0);

        let mut events = Vec::new();
        resolve_collisions(&mut state, &settings, &mut events);
        resolve_collisions(&mut state, &settings, &mut events);
        assert_eq!(state.score, 200);
        assert_eq!(events.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_level_matches_formula_and_never_drops(deltas in prop::collection::vec(-600i64..1200, 1..40)) {
            let (mut state, settings) = state();
            let mut prev_level = state.level;
            let mut peak = 0i64;
            for delta in deltas {
                apply_score(&mut state, delta, &settings);
                peak = peak.max(state.score);
                prop_assert!(state.level >= prev_level);
                prop_assert_eq!(state.level, level_for_score(peak, 500));
                prev_level = state.level;
            }
        }

        #[test]
        fn prop_spawn_interval_after_level_ups(levels in 0u32..20) {
            let (mut state, settings) = state();
            apply_score(&mut state, 500 * levels as i64, &settings);
            let expected = 1500i64 - 200 * levels as i64;
            prop_assert_eq!(state.spawn_interval_ms as i64, expected.max(500));
        }
    }
}
