use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::models::{EstimatedPrice, Priority};
use crate::upstream::{parse_upstream_array, ReconcileError};

/// Stable handle for a recommendation, derived only from its name and category.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecId(pub i32);

impl fmt::Display for RecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(RecId)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCandidate {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_price: Option<EstimatedPrice>,
}

impl RecommendationCandidate {
    pub fn id(&self) -> RecId {
        compute_id(&self.name, &self.category)
    }
}

/// 32-bit rolling hash (`h = h * 31 + unit`, wrapping) over the UTF-16 code units
/// of `"{name}-{category}"`.
pub fn compute_id(name: &str, category: &str) -> RecId {
    let key = format!("{}-{}", name, category);
    let hash = key
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));
    RecId(hash)
}

pub fn parse_recommendations(payload: &Value) -> Result<Vec<RecommendationCandidate>, ReconcileError> {
    parse_upstream_array(payload, "equipment recommendations")
}

/// Drops dismissed recommendations and keeps only the first candidate per id.
pub fn merge(
    candidates: &[RecommendationCandidate],
    dismissed: &HashSet<RecId>,
) -> Vec<RecommendationCandidate> {
    let mut seen: HashSet<RecId> = HashSet::new();
    candidates
        .iter()
        .filter(|candidate| {
            let id = candidate.id();
            !dismissed.contains(&id) && seen.insert(id)
        })
        .cloned()
        .collect()
}

/// Per-user UI state keyed by [`RecId`]: what was dismissed and what is being added to a list.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationState {
    #[serde(default)]
    pub dismissed: BTreeSet<RecId>,
    /// Transient; never written to the cache.
    #[serde(skip)]
    pub adding_to_list: BTreeSet<RecId>,
}

impl RecommendationState {
    pub fn dismiss(&mut self, id: RecId) {
        self.dismissed.insert(id);
    }

    pub fn is_dismissed(&self, id: RecId) -> bool {
        self.dismissed.contains(&id)
    }

    pub fn dismissed_set(&self) -> HashSet<RecId> {
        self.dismissed.iter().copied().collect()
    }

    /// Marks `id` as in flight. Returns false when it already was.
    pub fn begin_adding(&mut self, id: RecId) -> bool {
        self.adding_to_list.insert(id)
    }

    pub fn finish_adding(&mut self, id: RecId) {
        self.adding_to_list.remove(&id);
    }

    pub fn visible(&self, candidates: &[RecommendationCandidate]) -> Vec<RecommendationCandidate> {
        merge(candidates, &self.dismissed_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(name: &str, category: &str) -> RecommendationCandidate {
        RecommendationCandidate {
            name: name.to_string(),
            category: category.to_string(),
            reason: format!("You cook a lot without a {}", name),
            priority: Priority::Medium,
            estimated_price: None,
        }
    }

    #[test]
    fn test_compute_id_matches_rolling_hash() {
        // "a-b": ((97 * 31) + 45) * 31 + 98
        assert_eq!(compute_id("a", "b"), RecId((97 * 31 + 45) * 31 + 98));
        assert_eq!(compute_id("", ""), RecId(45));
    }

    #[test]
    fn test_compute_id_is_deterministic_and_wraps() {
        let long_name = "Professional Grade Enameled Cast Iron Dutch Oven";
        let first = compute_id(long_name, "Kitchen Equipment");
        for _ in 0..10 {
            assert_eq!(compute_id(long_name, "Kitchen Equipment"), first);
        }
        assert_ne!(compute_id(long_name, "Cookware"), first);
    }

    #[test]
    fn test_compute_id_distinct_over_corpus() {
        let names = [
            "Kitchen Scale", "Stand Mixer", "Immersion Blender", "Dutch Oven", "Chef's Knife",
            "Cast Iron Skillet", "Food Processor", "Mandoline Slicer", "Instant-Read Thermometer",
            "Rice Cooker", "Sheet Pan", "Microplane Grater", "Salad Spinner", "Pressure Cooker",
            "Bench Scraper", "Wok", "Sous Vide Circulator", "Pasta Machine", "Mortar and Pestle",
        ];
        let categories = ["Kitchen Equipment", "Appliances", "Cookware", "Tools", "Bakeware"];

        let mut ids = HashSet::new();
        for name in names {
            for category in categories {
                ids.insert(compute_id(name, category));
            }
        }
        assert_eq!(ids.len(), names.len() * categories.len());
    }

    #[test]
    fn test_compute_id_uses_utf16_units() {
        let accented = compute_id("Crème", "Tools");
        let plain = compute_id("Creme", "Tools");
        assert_ne!(accented, plain);
        let expected = "Crème-Tools"
            .encode_utf16()
            .fold(0i32, |h, u| h.wrapping_mul(31).wrapping_add(u as i32));
        assert_eq!(accented, RecId(expected));
    }

    #[test]
    fn test_merge_filters_dismissed_and_duplicates() {
        let candidates = vec![
            rec("Kitchen Scale", "Kitchen Equipment"),
            rec("Stand Mixer", "Kitchen Equipment"),
            RecommendationCandidate {
                reason: "second copy".to_string(),
                ..rec("Kitchen Scale", "Kitchen Equipment")
            },
            rec("Kitchen Scale", "Baking"),
        ];
        let dismissed: HashSet<RecId> = [compute_id("Stand Mixer", "Kitchen Equipment")].into();

        let merged = merge(&candidates, &dismissed);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].reason, "You cook a lot without a Kitchen Scale");
        assert_eq!(merged[1].category, "Baking");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let candidates = vec![
            rec("Wok", "Cookware"),
            rec("Wok", "Cookware"),
            rec("Sheet Pan", "Bakeware"),
            rec("Rice Cooker", "Appliances"),
        ];
        let dismissed: HashSet<RecId> = [compute_id("Rice Cooker", "Appliances")].into();
        let once = merge(&candidates, &dismissed);
        let twice = merge(&once, &dismissed);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_recommendation_state_tracks_in_flight_adds() {
        let mut state = RecommendationState::default();
        let id = compute_id("Wok", "Cookware");
        assert!(state.begin_adding(id));
        assert!(!state.begin_adding(id));
        state.finish_adding(id);
        assert!(state.begin_adding(id));

        state.dismiss(id);
        assert!(state.is_dismissed(id));
        assert!(state.visible(&[rec("Wok", "Cookware")]).is_empty());
    }

    #[test]
    fn test_parse_recommendations_shape() {
        let payload = json!([
            {"name": "Kitchen Scale", "category": "Kitchen Equipment", "reason": "Baking precision",
             "priority": "high", "estimatedPrice": 25}
        ]);
        let parsed = parse_recommendations(&payload).unwrap();
        assert_eq!(parsed[0].priority, Priority::High);
        assert_eq!(parsed[0].estimated_price, Some(EstimatedPrice::Amount(25.0)));
        assert!(parse_recommendations(&json!("nope")).is_err());
    }
}
