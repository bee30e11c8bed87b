//! Domain-specific assertion macros for cdm harnesses.
//!
//! These wrap `pretty_assertions` and print the offending result list so a
//! failure shows which place broke the ordering, uniqueness or radius rule.

use cdm_core::Place;

/// `(id, distance)` pairs for failure messages.
pub fn describe(places: &[Place]) -> Vec<(String, Option<f64>)> {
    places
        .iter()
        .map(|p| (p.id.clone(), p.distance_meters.map(|d| d.round())))
        .collect()
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Assert the exact id sequence of a result list.
///
/// ```rust
/// assert_ids!(places, ["X", "Y"]);
/// ```
#[macro_export]
macro_rules! assert_ids {
    ($places:expr, [$($id:expr),* $(,)?]) => {{
        let places: &[cdm_core::Place] = &$places;
        let actual: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        let expected: Vec<&str> = vec![$($id),*];
        pretty_assertions::assert_eq!(actual, expected, "assert_ids! failed");
    }};
}

/// Assert that no id appears twice.
#[macro_export]
macro_rules! assert_unique_ids {
    ($places:expr) => {{
        let places: &[cdm_core::Place] = &$places;
        let mut seen = std::collections::HashSet::new();
        for p in places {
            if !seen.insert(p.id.as_str()) {
                panic!(
                    "assert_unique_ids! failed: {:?} appears more than once.\n  places: {:?}",
                    p.id,
                    $crate::common::assertions::describe(places)
                );
            }
        }
    }};
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// Assert non-decreasing distance, with unknown distances last.
#[macro_export]
macro_rules! assert_sorted_by_distance {
    ($places:expr) => {{
        let places: &[cdm_core::Place] = &$places;
        for pair in places.windows(2) {
            if pair[0].distance_key() > pair[1].distance_key() {
                panic!(
                    "assert_sorted_by_distance! failed: {:?} comes before nearer {:?}.\n  places: {:?}",
                    pair[0].id,
                    pair[1].id,
                    $crate::common::assertions::describe(places)
                );
            }
        }
    }};
}

/// Assert every place has a distance no greater than `radius` meters.
#[macro_export]
macro_rules! assert_within_radius {
    ($places:expr, $radius:expr) => {{
        let places: &[cdm_core::Place] = &$places;
        let radius: f64 = $radius;
        for p in places {
            match p.distance_meters {
                Some(d) if d <= radius => {}
                Some(d) => panic!(
                    "assert_within_radius! failed: {:?} is {:.1} m away, radius {:.1} m",
                    p.id, d, radius
                ),
                None => panic!(
                    "assert_within_radius! failed: {:?} has no distance",
                    p.id
                ),
            }
        }
    }};
}
