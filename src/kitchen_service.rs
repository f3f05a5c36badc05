use anyhow::{anyhow, Context, Result};

use crate::advisor::{CookingPreferences, KitchenAdvisor};
use crate::cache::{
    KeyValueCache, MAINTENANCE_SCHEDULE_KEY, RECOMMENDATIONS_KEY, RECOMMENDATION_STATE_KEY,
};
use crate::equipment_registry::EquipmentRegistry;
use crate::maintenance_reconciler::{parse_candidates, reconcile, MaintenanceScheduleEntry};
use crate::recommendation_merger::{
    merge, parse_recommendations, RecId, RecommendationCandidate, RecommendationState,
};
use crate::shopping_sync::{add_recommendation_to_shopping_list, SyncResult};
use crate::storage::{self, EquipmentStore, GroceryListStore};

/// Runs the fetch → reconcile/merge/sync → persist sequences around the pure core.
///
/// Assumes a single writer per grocery list; the read-modify-write in
/// [`KitchenService::add_recommendation_to_shopping_list`] is not locked.
pub struct KitchenService<S, A, C> {
    store: S,
    advisor: A,
    cache: C,
    state: RecommendationState,
}

impl<S, A, C> KitchenService<S, A, C>
where
    S: EquipmentStore + GroceryListStore,
    A: KitchenAdvisor,
    C: KeyValueCache,
{
    pub fn new(store: S, advisor: A, cache: C) -> Self {
        let state = cache
            .get_as::<RecommendationState>(RECOMMENDATION_STATE_KEY)
            .unwrap_or_default();
        Self {
            store,
            advisor,
            cache,
            state,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn recommendation_state(&self) -> &RecommendationState {
        &self.state
    }

    pub fn load_registry(&self, user_id: i64) -> Result<EquipmentRegistry> {
        storage::load_registry(&self.store, user_id)
    }

    pub fn save_registry(&self, user_id: i64, registry: &EquipmentRegistry) -> Result<()> {
        storage::save_registry(&self.store, user_id, registry)
    }

    /// Asks the advisor for a fresh schedule and replaces the cached one.
    ///
    /// A malformed reply yields an empty schedule and leaves the cache alone.
    pub async fn refresh_maintenance_schedule(
        &mut self,
        user_id: i64,
        preferences: &CookingPreferences,
    ) -> Result<Vec<MaintenanceScheduleEntry>> {
        let registry = self.load_registry(user_id)?;
        let payload = self
            .advisor
            .generate_maintenance_schedule(registry.as_slice(), preferences)
            .await
            .context("Maintenance analysis failed")?;

        let candidates = match parse_candidates(&payload) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("{}; keeping the previous cached schedule", e);
                return Ok(Vec::new());
            }
        };

        let schedule = reconcile(registry.as_slice(), &candidates);
        log::info!(
            "Reconciled {} maintenance candidates into {} schedule entries",
            candidates.len(),
            schedule.len()
        );
        self.cache.put(MAINTENANCE_SCHEDULE_KEY, &schedule)?;
        Ok(schedule)
    }

    pub fn cached_maintenance_schedule(&self) -> Vec<MaintenanceScheduleEntry> {
        self.cache
            .get_as(MAINTENANCE_SCHEDULE_KEY)
            .unwrap_or_default()
    }

    pub async fn refresh_recommendations(
        &mut self,
        user_id: i64,
        preferences: &CookingPreferences,
        budget: Option<f64>,
    ) -> Result<Vec<RecommendationCandidate>> {
        let registry = self.load_registry(user_id)?;
        let payload = self
            .advisor
            .generate_equipment_recommendations(registry.as_slice(), preferences, budget)
            .await
            .context("Recommendation analysis failed")?;

        let candidates = match parse_recommendations(&payload) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("{}; keeping the previous cached recommendations", e);
                return Ok(Vec::new());
            }
        };

        let merged = merge(&candidates, &self.state.dismissed_set());
        log::info!(
            "Merged {} recommendation candidates into {} ({} dismissed)",
            candidates.len(),
            merged.len(),
            self.state.dismissed.len()
        );
        self.cache.put(RECOMMENDATIONS_KEY, &merged)?;
        Ok(merged)
    }

    pub fn visible_recommendations(&self) -> Vec<RecommendationCandidate> {
        let cached: Vec<RecommendationCandidate> =
            self.cache.get_as(RECOMMENDATIONS_KEY).unwrap_or_default();
        self.state.visible(&cached)
    }

    pub fn dismiss_recommendation(&mut self, id: RecId) -> Result<Vec<RecommendationCandidate>> {
        self.state.dismiss(id);
        self.cache.put(RECOMMENDATION_STATE_KEY, &self.state)?;
        Ok(self.visible_recommendations())
    }

    /// Adds a cached recommendation to the user's shopping list, creating the list if needed.
    ///
    /// The recommendation is marked in flight in [`RecommendationState::adding_to_list`]
    /// for the duration of the sync and unmarked afterwards, whether or not it succeeded.
    pub fn add_recommendation_to_shopping_list(&mut self, user_id: i64, id: RecId) -> Result<SyncResult> {
        let rec = self
            .visible_recommendations()
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| anyhow!("No recommendation with id {}", id))?;

        self.state.begin_adding(id);
        let result = self.sync_to_store(user_id, &rec);
        self.state.finish_adding(id);
        result
    }

    fn sync_to_store(&self, user_id: i64, rec: &RecommendationCandidate) -> Result<SyncResult> {
        let lists = self
            .store
            .get_grocery_lists(user_id)
            .with_context(|| format!("Failed to load grocery lists for user {}", user_id))?;

        let mut result = add_recommendation_to_shopping_list(rec, Some(&lists), user_id);
        if result.needs_save() {
            result.list = self
                .store
                .save_grocery_list(result.list)
                .context("Failed to save grocery list")?;
        }
        log::info!(
            "Shopping list sync for '{}': {:?} (list {:?})",
            rec.name,
            result.action,
            result.list.id
        );
        Ok(result)
    }
}
