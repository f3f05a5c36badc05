use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{EstimatedPrice, Priority};
use crate::recommendation_merger::RecommendationCandidate;

pub const SHOPPING_LIST_TITLE: &str = "Shopping";
pub const KITCHEN_EQUIPMENT_CATEGORY: &str = "Kitchen Equipment";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub id: String,
    pub name: String,
    pub quantity: String,
    #[serde(default)]
    pub completed: bool,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_price: Option<EstimatedPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    /// Assigned by the store on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: i64,
    pub title: String,
    /// Stored lists occasionally carry no items array; those are never picked as a target.
    #[serde(default)]
    pub items: Option<Vec<GroceryItem>>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    /// Appended to an existing list.
    Added,
    /// A new "Shopping" list was created for the item.
    Created,
    /// Already present; nothing changed.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult {
    pub action: SyncAction,
    pub list: GroceryList,
}

impl SyncResult {
    /// Whether `list` differs from what the store holds and has to be saved.
    pub fn needs_save(&self) -> bool {
        self.action != SyncAction::Duplicate
    }
}

fn select_target_list(lists: &[GroceryList]) -> Option<&GroceryList> {
    lists
        .iter()
        .find(|l| l.title == SHOPPING_LIST_TITLE && l.items.is_some())
        .or_else(|| lists.iter().find(|l| l.items.is_some()))
}

fn is_same_equipment_item(item: &GroceryItem, name: &str) -> bool {
    item.category == KITCHEN_EQUIPMENT_CATEGORY && item.name.to_lowercase() == name.to_lowercase()
}

fn item_from_recommendation(rec: &RecommendationCandidate, id: String) -> GroceryItem {
    GroceryItem {
        id,
        name: rec.name.clone(),
        quantity: "1".to_string(),
        completed: false,
        category: KITCHEN_EQUIPMENT_CATEGORY.to_string(),
        estimated_price: rec.estimated_price.clone(),
        priority: Some(rec.priority),
        description: if rec.reason.is_empty() {
            None
        } else {
            Some(rec.reason.clone())
        },
    }
}

/// Whether the list a recommendation would be added to already carries it.
pub fn is_already_listed(rec: &RecommendationCandidate, lists: Option<&[GroceryList]>) -> bool {
    select_target_list(lists.unwrap_or(&[]))
        .and_then(|l| l.items.as_ref())
        .map(|items| items.iter().any(|i| is_same_equipment_item(i, &rec.name)))
        .unwrap_or(false)
}

/// Find-or-create the shopping list and append `rec` unless it is already there.
///
/// Pure: the returned list is a modified copy and the caller persists it when
/// [`SyncResult::needs_save`] is true.
pub fn add_recommendation_to_shopping_list(
    rec: &RecommendationCandidate,
    lists: Option<&[GroceryList]>,
    user_id: i64,
) -> SyncResult {
    add_recommendation_with_id(rec, lists, user_id, || Uuid::new_v4().to_string())
}

pub fn add_recommendation_with_id(
    rec: &RecommendationCandidate,
    lists: Option<&[GroceryList]>,
    user_id: i64,
    new_item_id: impl FnOnce() -> String,
) -> SyncResult {
    let lists = lists.unwrap_or(&[]);

    let Some(target) = select_target_list(lists) else {
        log::info!("No usable grocery list for user {}, creating '{}'", user_id, SHOPPING_LIST_TITLE);
        return SyncResult {
            action: SyncAction::Created,
            list: GroceryList {
                id: None,
                user_id,
                title: SHOPPING_LIST_TITLE.to_string(),
                items: Some(vec![item_from_recommendation(rec, new_item_id())]),
                completed: false,
            },
        };
    };

    let items = target.items.as_deref().unwrap_or(&[]);
    if items.iter().any(|i| is_same_equipment_item(i, &rec.name)) {
        log::info!("'{}' is already on list '{}'", rec.name, target.title);
        return SyncResult {
            action: SyncAction::Duplicate,
            list: target.clone(),
        };
    }

    let mut updated = target.clone();
    updated
        .items
        .get_or_insert_with(Vec::new)
        .push(item_from_recommendation(rec, new_item_id()));
    SyncResult {
        action: SyncAction::Added,
        list: updated,
    }
}
