use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Settings, SettingsError};

use ron::value::{Map as RonMap, Value as RonValue};
use serde::Serialize;

/// Convert any serializable struct to `ron::Value`.
fn to_ron_value<T: Serialize>(value: &T) -> Result<RonValue, SettingsError> {
    let s = ron::to_string(value)?;
    Ok(ron::from_str(&s)?)
}

/// Merge default + delta recursively (maps only).
fn merge_maps(default: &RonMap, delta: &RonMap) -> RonMap {
    let mut merged = default.clone();
    for (k, v_delta) in delta.iter() {
        let value = match (merged.get(k), v_delta) {
            (Some(RonValue::Map(def_m)), RonValue::Map(delta_m)) => {
                RonValue::Map(merge_maps(def_m, delta_m))
            }
            _ => v_delta.clone(),
        };
        merged.insert(k.clone(), value);
    }
    merged
}

/// Compute recursive diff (new vs default). Returns None if identical.
fn diff_value(new_v: &RonValue, default_v: &RonValue) -> Option<RonValue> {
    match (new_v, default_v) {
        (RonValue::Map(new_m), RonValue::Map(def_m)) => {
            let diff_m = diff_map(new_m, def_m);
            (!diff_m.is_empty()).then_some(RonValue::Map(diff_m))
        }
        _ => (new_v != default_v).then(|| new_v.clone()),
    }
}

fn diff_map(new_m: &RonMap, def_m: &RonMap) -> RonMap {
    let mut out = RonMap::new();
    for (k, new_v) in new_m.iter() {
        match def_m.get(k) {
            Some(def_v) => {
                if let Some(d) = diff_value(new_v, def_v) {
                    out.insert(k.clone(), d);
                }
            }
            None => {
                out.insert(k.clone(), new_v.clone());
            }
        }
    }
    out
}

fn merged_section(default_map: &RonMap, delta: Option<&RonValue>) -> RonValue {
    match delta {
        Some(RonValue::Map(delta_m)) => RonValue::Map(merge_maps(default_map, delta_m)),
        // A scalar delta cannot be reconciled with a struct section.
        _ => RonValue::Map(default_map.clone()),
    }
}

fn read_deltas(path: &Path) -> Result<HashMap<String, RonValue>, SettingsError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    Ok(ron::from_str(&content)?)
}

/// Builder for `SettingsStore` (single delta file).
#[derive(Default)]
pub struct SettingsStoreBuilder {
    settings_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let file_path = self
            .settings_file
            .ok_or(SettingsError::Invalid("settings file not specified"))?;

        if let Some(dir) = file_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let deltas = read_deltas(&file_path)?;

        Ok(SettingsStore {
            file_path,
            deltas: RwLock::new(deltas),
            defaults: RwLock::new(HashMap::new()),
            values: RwLock::new(HashMap::new()),
        })
    }
}

/// Settings store (thread-safe).
///
/// Sections are registered by type. Reads deserialize the merged view of
/// default + file delta; updates persist only the recursive diff.
pub struct SettingsStore {
    file_path: PathBuf,
    deltas: RwLock<HashMap<String, RonValue>>, // section -> delta value (usually Map)
    defaults: RwLock<HashMap<&'static str, RonMap>>, // section -> full default map
    values: RwLock<HashMap<&'static str, RonValue>>, // section -> effective merged value
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, SettingsError> {
    lock.read().map_err(|_| SettingsError::Poisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, SettingsError> {
    lock.write().map_err(|_| SettingsError::Poisoned)
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn is_registered<T: Settings>(&self) -> bool {
        read(&self.values)
            .map(|values| values.contains_key(T::name()))
            .unwrap_or(false)
    }

    /// Register a section type (loads defaults and applies existing delta if present).
    pub fn register<T: Settings>(&self) -> Result<(), SettingsError> {
        let section = T::name();

        if read(&self.values)?.contains_key(section) {
            return Err(SettingsError::Invalid("section already registered"));
        }

        let RonValue::Map(default_map) = to_ron_value(&T::default())? else {
            return Err(SettingsError::Invalid("default must serialize to map"));
        };

        let merged_value = merged_section(&default_map, read(&self.deltas)?.get(section));

        write(&self.defaults)?.insert(section, default_map);
        write(&self.values)?.insert(section, merged_value);

        Ok(())
    }

    /// Snapshot get (Arc).
    pub fn get<T: Settings>(&self) -> Result<Arc<T>, SettingsError> {
        self.try_get::<T>()?.ok_or(SettingsError::NotRegistered)
    }

    /// Optional variant: None if not registered.
    pub fn try_get<T: Settings>(&self) -> Result<Option<Arc<T>>, SettingsError> {
        Ok(self.load::<T>()?.map(Arc::new))
    }

    fn load<T: Settings>(&self) -> Result<Option<T>, SettingsError> {
        let values = read(&self.values)?;
        let Some(value) = values.get(T::name()) else {
            return Ok(None);
        };
        Ok(Some(value.clone().into_rust()?))
    }

    /// Update via mutable closure. Only delta (recursive) is persisted.
    pub fn update<T, F>(&self, mutator: F) -> Result<(), SettingsError>
    where
        T: Settings,
        F: FnOnce(&mut T),
    {
        let section = T::name();

        let mut instance = self.load::<T>()?.ok_or(SettingsError::NotRegistered)?;
        mutator(&mut instance);

        let RonValue::Map(new_map) = to_ron_value(&instance)? else {
            return Err(SettingsError::Invalid("updated must serialize to map"));
        };

        let diff_root = {
            let defaults = read(&self.defaults)?;
            let default_map = defaults.get(section).ok_or(SettingsError::NotRegistered)?;
            diff_map(&new_map, default_map)
        };

        write(&self.values)?.insert(section, RonValue::Map(new_map));

        {
            let mut deltas = write(&self.deltas)?;
            if diff_root.is_empty() {
                deltas.remove(section);
            } else {
                deltas.insert(section.to_string(), RonValue::Map(diff_root));
            }
        }

        self.persist_deltas()
    }

    /// Reload deltas from disk and re-merge all registered sections.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let new_deltas = read_deltas(&self.file_path)?;

        let defaults = read(&self.defaults)?;
        let mut values = write(&self.values)?;
        for (section, default_map) in defaults.iter() {
            values.insert(*section, merged_section(default_map, new_deltas.get(*section)));
        }

        *write(&self.deltas)? = new_deltas;
        Ok(())
    }

    fn persist_deltas(&self) -> Result<(), SettingsError> {
        let clean: HashMap<String, RonValue> = read(&self.deltas)?
            .iter()
            .filter(|(_, v)| !matches!(v, RonValue::Map(m) if m.is_empty()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let pretty = ron::ser::PrettyConfig::default();
        let ron_string = ron::ser::to_string_pretty(&clean, pretty)?;

        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, ron_string)?;
        fs::rename(&tmp, &self.file_path)?;
        Ok(())
    }

    /// Remove stale / orphaned delta entries:
    /// * Sections not registered (no defaults) are dropped.
    /// * Keys inside a section that no longer exist in defaults are pruned recursively.
    /// * Empty sections after pruning are removed.
    pub fn prune_stale(&self) -> Result<(), SettingsError> {
        {
            let defaults = read(&self.defaults)?;
            let mut deltas = write(&self.deltas)?;

            deltas.retain(|section, delta| {
                let Some(default_map) = defaults.get(section.as_str()) else {
                    return false;
                };
                match delta {
                    RonValue::Map(delta_map) => {
                        Self::prune_map_recursive(default_map, delta_map);
                        !delta_map.is_empty()
                    }
                    _ => true,
                }
            });
        }

        self.persist_deltas()
    }

    /// Recursively prune keys in `candidate` that do not exist in `default_ref`.
    fn prune_map_recursive(default_ref: &RonMap, candidate: &mut RonMap) {
        let mut to_remove: Vec<RonValue> = Vec::new();

        for (k, v) in candidate.iter_mut() {
            match (default_ref.get(k), v) {
                (None, _) => to_remove.push(k.clone()),
                (Some(RonValue::Map(def_sub)), RonValue::Map(cand_sub)) => {
                    Self::prune_map_recursive(def_sub, cand_sub);
                    if cand_sub.is_empty() {
                        to_remove.push(k.clone());
                    }
                }
                _ => {}
            }
        }

        for k in to_remove {
            candidate.remove(&k);
        }
    }
}
