use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::equipment_registry::{placeholder_name, Equipment};
use crate::models::Priority;
use crate::upstream::{parse_upstream_array, ReconcileError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceCandidate {
    pub equipment_id: i64,
    #[serde(deserialize_with = "lenient_date")]
    pub next_maintenance_date: NaiveDate,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub suggested_action: String,
    #[serde(default)]
    pub priority: Priority,
}

/// One line of the reconciled schedule: the surviving candidate plus the name it was deduplicated under.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceScheduleEntry {
    pub equipment_id: i64,
    pub equipment_name: String,
    pub next_maintenance_date: NaiveDate,
    pub recommendation: String,
    pub suggested_action: String,
    pub priority: Priority,
}

// Models reply with plain dates most of the time, but full timestamps show up too.
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid maintenance date '{}'", raw)))
}

/// Validates the shape of a raw maintenance payload.
pub fn parse_candidates(payload: &Value) -> Result<Vec<MaintenanceCandidate>, ReconcileError> {
    parse_upstream_array(payload, "maintenance schedule")
}

/// Collapses candidates to one entry per equipment name, soonest date first.
///
/// Candidates are stably sorted by `next_maintenance_date`, so for every name the
/// surviving entry is the earliest one (first in input order on ties). Ids missing
/// from `equipment` resolve to `Equipment #<id>`.
pub fn reconcile(
    equipment: &[Equipment],
    candidates: &[MaintenanceCandidate],
) -> Vec<MaintenanceScheduleEntry> {
    let id_to_name: HashMap<i64, &str> = equipment
        .iter()
        .map(|e| (e.id, e.name.as_str()))
        .collect();

    let mut sorted: Vec<&MaintenanceCandidate> = candidates.iter().collect();
    sorted.sort_by_key(|c| c.next_maintenance_date);

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut schedule = Vec::new();

    for candidate in sorted {
        let name = match id_to_name.get(&candidate.equipment_id) {
            Some(name) => name.to_string(),
            None => {
                log::debug!(
                    "Maintenance candidate references unknown equipment id {}",
                    candidate.equipment_id
                );
                placeholder_name(candidate.equipment_id)
            }
        };

        if !seen_names.insert(name.clone()) {
            continue;
        }

        schedule.push(MaintenanceScheduleEntry {
            equipment_id: candidate.equipment_id,
            equipment_name: name,
            next_maintenance_date: candidate.next_maintenance_date,
            recommendation: candidate.recommendation.clone(),
            suggested_action: candidate.suggested_action.clone(),
            priority: candidate.priority,
        });
    }

    schedule
}

/// Reconciles a raw upstream payload, degrading to an empty schedule when it is malformed.
pub fn reconcile_payload(equipment: &[Equipment], payload: &Value) -> Vec<MaintenanceScheduleEntry> {
    match parse_candidates(payload) {
        Ok(candidates) => reconcile(equipment, &candidates),
        Err(e) => {
            log::warn!("{}; using an empty schedule", e);
            Vec::new()
        }
    }
}
