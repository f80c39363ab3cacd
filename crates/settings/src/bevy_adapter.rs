use bevy::{app::App, ecs::resource::Resource, ecs::world::World};
use std::ops::Deref;
use std::sync::Arc;

use crate::{Settings, SettingsError, SettingsStore};

#[derive(Resource, Clone)]
pub struct SettingsStoreRef(pub Arc<SettingsStore>);

/// Snapshot of one settings section, exposed as a Bevy resource.
#[derive(Resource, Clone, Debug)]
pub struct SettingsArc<T: Send + Sync + 'static>(pub Arc<T>);

impl<T: Send + Sync + 'static> Deref for SettingsArc<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

#[derive(Resource, Default)]
struct SettingsRegistry {
    updaters: Vec<fn(&SettingsStore, &mut World)>,
}

pub trait AppSettingsExt {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self;
    fn register_settings_section<S: Settings>(&mut self) -> Result<&mut Self, SettingsError>;
}

impl AppSettingsExt for App {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self {
        self.insert_resource(SettingsStoreRef(Arc::new(store)))
            .init_resource::<SettingsRegistry>()
    }

    fn register_settings_section<S: Settings>(&mut self) -> Result<&mut Self, SettingsError> {
        let store = self
            .world()
            .get_resource::<SettingsStoreRef>()
            .ok_or(SettingsError::Invalid("settings store not inserted"))?
            .0
            .clone();

        if !store.is_registered::<S>() {
            store.register::<S>()?;
        }
        self.insert_resource(SettingsArc::<S>(store.get::<S>()?));

        fn update_one<S: Settings>(store: &SettingsStore, world: &mut World) {
            match store.get::<S>() {
                Ok(value) => world.insert_resource(SettingsArc::<S>(value)),
                Err(err) => tracing::warn!("settings section {} not refreshed: {err}", S::name()),
            }
        }

        self.world_mut()
            .resource_mut::<SettingsRegistry>()
            .updaters
            .push(update_one::<S>);
        Ok(self)
    }
}

/// Re-reads the settings file and refreshes every registered `SettingsArc`.
pub fn reload_settings(world: &mut World) -> Result<(), SettingsError> {
    let Some(store) = world.get_resource::<SettingsStoreRef>().map(|s| s.0.clone()) else {
        return Err(SettingsError::Invalid("settings store not inserted"));
    };
    store.reload()?;

    let updaters = world
        .get_resource::<SettingsRegistry>()
        .map(|registry| registry.updaters.clone())
        .unwrap_or_default();
    for update in updaters {
        update(&store, world);
    }
    Ok(())
}

/// Writes a change to section `S` through to the settings file and refreshes
/// its `SettingsArc`. Orphaned entries in the file are pruned first.
pub fn update_settings<S: Settings>(
    world: &mut World,
    mutator: impl FnOnce(&mut S),
) -> Result<(), SettingsError> {
    let Some(store) = world.get_resource::<SettingsStoreRef>().map(|s| s.0.clone()) else {
        return Err(SettingsError::Invalid("settings store not inserted"));
    };
    store.prune_stale()?;
    store.update::<S, _>(mutator)?;
    world.insert_resource(SettingsArc::<S>(store.get::<S>()?));
    Ok(())
}
