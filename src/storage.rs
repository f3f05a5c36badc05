use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::equipment_registry::{Equipment, EquipmentRegistry};
use crate::shopping_sync::GroceryList;

const EQUIPMENT_FILE: &str = "equipment.json";
const GROCERY_LISTS_FILE: &str = "grocery_lists.json";

pub trait EquipmentStore {
    fn get_equipment(&self, user_id: i64) -> Result<Vec<Equipment>>;
    /// Replaces everything `get_equipment` shows the user with `equipment`.
    /// Unowned records saved back this way become owned by the user.
    fn save_equipment(&self, user_id: i64, equipment: &[Equipment]) -> Result<()>;
}

pub trait GroceryListStore {
    fn get_grocery_lists(&self, user_id: i64) -> Result<Vec<GroceryList>>;
    /// Creates the list when it has no id yet, otherwise replaces the stored copy.
    fn save_grocery_list(&self, list: GroceryList) -> Result<GroceryList>;
}

fn owned_by(equipment: &Equipment, user_id: i64) -> bool {
    // Records without an owner predate multi-user data and are visible to everyone.
    equipment.user_id.map_or(true, |owner| owner == user_id)
}

fn upsert_list(lists: &mut Vec<GroceryList>, mut list: GroceryList) -> GroceryList {
    match list.id {
        Some(id) => match lists.iter_mut().find(|l| l.id == Some(id)) {
            Some(existing) => *existing = list.clone(),
            None => lists.push(list.clone()),
        },
        None => {
            let next_id = lists.iter().filter_map(|l| l.id).max().unwrap_or(0) + 1;
            list.id = Some(next_id);
            lists.push(list.clone());
        }
    }
    list
}

fn replace_user_equipment(all: &mut Vec<Equipment>, user_id: i64, equipment: &[Equipment]) {
    all.retain(|e| !owned_by(e, user_id));
    all.extend(equipment.iter().cloned().map(|mut e| {
        e.user_id = Some(user_id);
        e
    }));
}

pub fn load_registry(store: &impl EquipmentStore, user_id: i64) -> Result<EquipmentRegistry> {
    let equipment = store
        .get_equipment(user_id)
        .with_context(|| format!("Failed to load equipment for user {}", user_id))?;
    Ok(EquipmentRegistry::from_equipment(equipment))
}

pub fn save_registry(store: &impl EquipmentStore, user_id: i64, registry: &EquipmentRegistry) -> Result<()> {
    store
        .save_equipment(user_id, registry.as_slice())
        .with_context(|| format!("Failed to save equipment for user {}", user_id))
}

/// Keeps equipment and grocery lists as JSON arrays in a data directory.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn read_all<T: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file_name);
        match read_if_found(&path)? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Error de-serialising {:?}", path)),
            None => Ok(Vec::new()),
        }
    }

    fn write_all<T: Serialize>(&self, file_name: &str, records: &[T]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Error ensuring path {:?} exists", self.data_dir))?;
        let path = self.data_dir.join(file_name);
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&path, content).with_context(|| format!("Error writing {:?}", path))
    }
}

pub(crate) fn read_if_found(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(c) => Ok(Some(c)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Error reading {:?}", path)),
    }
}

impl EquipmentStore for JsonFileStore {
    fn get_equipment(&self, user_id: i64) -> Result<Vec<Equipment>> {
        let all: Vec<Equipment> = self.read_all(EQUIPMENT_FILE)?;
        Ok(all.into_iter().filter(|e| owned_by(e, user_id)).collect())
    }

    fn save_equipment(&self, user_id: i64, equipment: &[Equipment]) -> Result<()> {
        let mut all: Vec<Equipment> = self.read_all(EQUIPMENT_FILE)?;
        replace_user_equipment(&mut all, user_id, equipment);
        self.write_all(EQUIPMENT_FILE, &all)
    }
}

impl GroceryListStore for JsonFileStore {
    fn get_grocery_lists(&self, user_id: i64) -> Result<Vec<GroceryList>> {
        let all: Vec<GroceryList> = self.read_all(GROCERY_LISTS_FILE)?;
        Ok(all.into_iter().filter(|l| l.user_id == user_id).collect())
    }

    fn save_grocery_list(&self, list: GroceryList) -> Result<GroceryList> {
        let mut all: Vec<GroceryList> = self.read_all(GROCERY_LISTS_FILE)?;
        let saved = upsert_list(&mut all, list);
        self.write_all(GROCERY_LISTS_FILE, &all)?;
        log::debug!("Saved grocery list {:?} '{}'", saved.id, saved.title);
        Ok(saved)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    equipment: Mutex<Vec<Equipment>>,
    lists: Mutex<Vec<GroceryList>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(equipment: Vec<Equipment>, lists: Vec<GroceryList>) -> Self {
        Self {
            equipment: Mutex::new(equipment),
            lists: Mutex::new(lists),
        }
    }

    pub fn all_lists(&self) -> Vec<GroceryList> {
        self.lists.lock().map(|l| l.to_vec()).unwrap_or_default()
    }
}

impl EquipmentStore for MemoryStore {
    fn get_equipment(&self, user_id: i64) -> Result<Vec<Equipment>> {
        let all = self
            .equipment
            .lock()
            .map_err(|_| anyhow::anyhow!("equipment store lock poisoned"))?;
        Ok(all.iter().filter(|e| owned_by(e, user_id)).cloned().collect())
    }

    fn save_equipment(&self, user_id: i64, equipment: &[Equipment]) -> Result<()> {
        let mut all = self
            .equipment
            .lock()
            .map_err(|_| anyhow::anyhow!("equipment store lock poisoned"))?;
        replace_user_equipment(&mut all, user_id, equipment);
        Ok(())
    }
}

impl GroceryListStore for MemoryStore {
    fn get_grocery_lists(&self, user_id: i64) -> Result<Vec<GroceryList>> {
        let all = self
            .lists
            .lock()
            .map_err(|_| anyhow::anyhow!("grocery list store lock poisoned"))?;
        Ok(all.iter().filter(|l| l.user_id == user_id).cloned().collect())
    }

    fn save_grocery_list(&self, list: GroceryList) -> Result<GroceryList> {
        let mut all = self
            .lists
            .lock()
            .map_err(|_| anyhow::anyhow!("grocery list store lock poisoned"))?;
        Ok(upsert_list(&mut all, list))
    }
}
