use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentCondition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    NeedsRepair,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub condition: EquipmentCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance_date: Option<NaiveDate>,
    /// Days between services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_interval: Option<u32>,
}

impl Equipment {
    /// Date the next service is due, when both the last service date and an interval are known.
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        let last = self.last_maintenance_date?;
        let interval = self.maintenance_interval?;
        last.checked_add_signed(Duration::days(i64::from(interval)))
    }
}

/// Fields accepted when registering a new piece of equipment. The registry assigns the id.
#[derive(Debug, Clone, Default)]
pub struct NewEquipment {
    pub user_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub condition: EquipmentCondition,
    pub purchase_date: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub maintenance_interval: Option<u32>,
}

/// Partial edit; `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct EquipmentUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub condition: Option<EquipmentCondition>,
    pub purchase_date: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub maintenance_interval: Option<u32>,
}

pub fn placeholder_name(equipment_id: i64) -> String {
    format!("Equipment #{}", equipment_id)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentRegistry {
    items: Vec<Equipment>,
}

impl EquipmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_equipment(items: Vec<Equipment>) -> Self {
        let mut registry = Self::new();
        for item in items {
            registry.upsert(item);
        }
        registry
    }

    pub fn add(&mut self, new: NewEquipment) -> &Equipment {
        let id = self.items.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.items.push(Equipment {
            id,
            user_id: new.user_id,
            name: new.name,
            category: new.category,
            condition: new.condition,
            purchase_date: new.purchase_date,
            last_maintenance_date: new.last_maintenance_date,
            maintenance_interval: new.maintenance_interval,
        });
        &self.items[self.items.len() - 1]
    }

    pub fn upsert(&mut self, equipment: Equipment) {
        match self.items.iter_mut().find(|e| e.id == equipment.id) {
            Some(existing) => *existing = equipment,
            None => self.items.push(equipment),
        }
    }

    pub fn update(&mut self, id: i64, update: EquipmentUpdate) -> Option<&Equipment> {
        let item = self.items.iter_mut().find(|e| e.id == id)?;
        if let Some(name) = update.name {
            item.name = name;
        }
        if let Some(category) = update.category {
            item.category = category;
        }
        if let Some(condition) = update.condition {
            item.condition = condition;
        }
        if update.purchase_date.is_some() {
            item.purchase_date = update.purchase_date;
        }
        if update.last_maintenance_date.is_some() {
            item.last_maintenance_date = update.last_maintenance_date;
        }
        if update.maintenance_interval.is_some() {
            item.maintenance_interval = update.maintenance_interval;
        }
        Some(item)
    }

    pub fn remove(&mut self, id: i64) -> Option<Equipment> {
        let index = self.items.iter().position(|e| e.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: i64) -> Option<&Equipment> {
        self.items.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Equipment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn id_to_name(&self) -> HashMap<i64, String> {
        self.items.iter().map(|e| (e.id, e.name.clone())).collect()
    }

    /// Registered name for `id`, or the `Equipment #<id>` placeholder.
    pub fn resolve_name(&self, id: i64) -> String {
        self.get(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| placeholder_name(id))
    }

    /// Equipment whose locally computed due date is on or before `today`, soonest first.
    pub fn due_for_maintenance(&self, today: NaiveDate) -> Vec<&Equipment> {
        let mut due: Vec<(NaiveDate, &Equipment)> = self
            .items
            .iter()
            .filter_map(|e| e.next_due_date().map(|d| (d, e)))
            .filter(|(d, _)| *d <= today)
            .collect();
        due.sort_by_key(|(d, _)| *d);
        due.into_iter().map(|(_, e)| e).collect()
    }
}
