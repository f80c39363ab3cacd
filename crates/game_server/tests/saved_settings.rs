//! Command line options written back to the server settings file.

use std::fs;

use game_server::settings::{Gameplay, Network, NetworkOverrides};
use settings::SettingsStore;

fn store_at(path: &std::path::Path) -> SettingsStore {
    let store = SettingsStore::builder()
        .with_settings_file(path)
        .build()
        .unwrap();
    store.register::<Network>().unwrap();
    store.register::<Gameplay>().unwrap();
    store
}

#[test]
fn saved_options_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollaball_server.settings.ron");
    fs::write(
        &path,
        r#"{
            "network": { "tick_rate": 30.0 },
            "lobby": { "size": 4 },
        }"#,
    )
    .unwrap();

    let overrides = NetworkOverrides {
        port: Some(6100),
        bind_address: Some("0.0.0.0".into()),
    };
    overrides.save(&store_at(&path)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("lobby"));
    assert!(!content.contains("tick_rate"));
    assert!(!content.contains("max_clients"));

    let network = store_at(&path).get::<Network>().unwrap();
    assert_eq!(network.port, 6100);
    assert_eq!(network.bind_address, "0.0.0.0");
    assert_eq!(network.max_clients, Network::default().max_clients);
}

#[test]
fn options_are_not_written_without_saving() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollaball_server.settings.ron");
    let store = store_at(&path);

    let mut network = (*store.get::<Network>().unwrap()).clone();
    NetworkOverrides {
        port: Some(6100),
        bind_address: None,
    }
    .apply(&mut network);

    assert_eq!(network.port, 6100);
    assert!(!path.exists());
    assert_eq!(store_at(&path).get::<Network>().unwrap().port, 5000);
}
