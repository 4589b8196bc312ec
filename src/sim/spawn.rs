//! Item spawning
//!
//! Lane and category are drawn from the injected RNG so sessions replay
//! exactly under the same seed.

use rand::Rng;

use super::state::{Item, ItemCategory, Lane, SessionState};
use crate::consts::SPAWN_Y;

/// Walk categories in declaration order, returning the first whose
/// cumulative weight reaches `roll`. Falls back to the last category when
/// float rounding leaves the total just under the roll.
pub fn pick_category(categories: &[ItemCategory], roll: f64) -> Option<&ItemCategory> {
    let mut cumulative = 0.0;
    for category in categories {
        cumulative += category.selection_weight;
        if roll <= cumulative {
            return Some(category);
        }
    }
    categories.last()
}

/// Map a uniform roll in [0, 1) onto one of the three lanes
pub fn pick_lane(roll: f64) -> Lane {
    let index = (roll * Lane::ALL.len() as f64) as usize;
    Lane::from_index(index).unwrap_or(Lane::Right)
}

/// Spawn an item if the spawn interval has elapsed at simulation time `now`.
///
/// The first call of a session always spawns.
pub fn maybe_spawn<R: Rng>(
    state: &mut SessionState,
    categories: &[ItemCategory],
    now: f64,
    rng: &mut R,
) -> Option<u32> {
    let due = match state.last_spawn_ms {
        Some(last) => now - last > state.spawn_interval_ms as f64,
        None => true,
    };
    if !due {
        return None;
    }

    let lane = pick_lane(rng.random::<f64>());
    let category = pick_category(categories, rng.random::<f64>())?.clone();

    let id = state.next_entity_id();
    log::debug!("spawn #{id} {} in {}", category.name, lane.as_str());
    state.items.push(Item {
        id,
        category,
        lane,
        y: SPAWN_Y,
    });
    state.last_spawn_ms = Some(now);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::Field;
    use crate::sim::testing::ScriptedRng;

    fn categories() -> Vec<ItemCategory> {
        ItemCategory::defaults()
    }

    #[test]
    fn test_pick_category_cumulative_walk() {
        let cats = categories();
        assert_eq!(pick_category(&cats, 0.0).unwrap().name, "APPLE");
        assert_eq!(pick_category(&cats, 0.49).unwrap().name, "APPLE");
        assert_eq!(pick_category(&cats, 0.6).unwrap().name, "ORANGE");
        assert_eq!(pick_category(&cats, 0.95).unwrap().name, "BOMB");
    }

    #[test]
    fn test_pick_category_tie_goes_to_earlier() {
        let cats = categories();
        // Exactly on a boundary: the earlier category wins
        assert_eq!(pick_category(&cats, 0.5).unwrap().name, "APPLE");
    }

    #[test]
    fn test_pick_category_rounding_falls_back_to_last() {
        let cats = vec![
            ItemCategory::new("A", 1, 0.3, ""),
            ItemCategory::new("B", 1, 0.3, ""),
        ];
        assert_eq!(pick_category(&cats, 0.99).unwrap().name, "B");
        assert!(pick_category(&[], 0.5).is_none());
    }

    #[test]
    fn test_pick_lane_thirds() {
        assert_eq!(pick_lane(0.0), Lane::Left);
        assert_eq!(pick_lane(0.4), Lane::Center);
        assert_eq!(pick_lane(0.9), Lane::Right);
    }

    #[test]
    fn test_maybe_spawn_respects_interval() {
        let settings = Settings::default();
        let mut state = SessionState::new(&settings, Field::default());
        let mut rng = ScriptedRng::new(&[0.0, 0.0, 0.5, 0.7]);

        // First call always spawns
        assert!(maybe_spawn(&mut state, &settings.categories, 0.0, &mut rng).is_some());
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].lane, Lane::Left);
        assert_eq!(state.items[0].category.name, "APPLE");
        assert_eq!(state.items[0].y, SPAWN_Y);

        // Exactly one interval later is not enough (strictly greater)
        assert!(maybe_spawn(&mut state, &settings.categories, 1500.0, &mut rng).is_none());

        let id = maybe_spawn(&mut state, &settings.categories, 1501.0, &mut rng);
        assert!(id.is_some());
        assert_eq!(state.items[1].lane, Lane::Center);
        assert_eq!(state.items[1].category.name, "ORANGE");
        assert_eq!(state.last_spawn_ms, Some(1501.0));
    }
}
