//! Session options written back to the client settings file.

use std::fs;

use bevy::prelude::*;
use game_server::settings::Gameplay;
use rollaball::settings::{ClientSettings, SessionOverrides};
use settings::{AppSettingsExt, SettingsArc, SettingsStore};

fn app_with_settings(path: &std::path::Path) -> App {
    let store = SettingsStore::builder()
        .with_settings_file(path)
        .build()
        .unwrap();
    let mut app = App::new();
    app.insert_settings_store(store)
        .register_settings_section::<ClientSettings>()
        .unwrap()
        .register_settings_section::<Gameplay>()
        .unwrap();
    app
}

#[test]
fn saved_session_is_live_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollaball.settings.ron");
    fs::write(&path, r#"{ "client": { "volume": 0.5 }, "audio": { "muted": true } }"#).unwrap();

    let mut app = app_with_settings(&path);
    SessionOverrides {
        connect: Some("192.168.1.20".into()),
        port: Some(7000),
        host: false,
    }
    .save(app.world_mut())
    .unwrap();

    let live = app.world().resource::<SettingsArc<ClientSettings>>();
    assert_eq!(live.server_address, "192.168.1.20");
    assert_eq!(live.port, 7000);
    assert!(!live.host_locally);

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("volume"));
    assert!(!content.contains("audio"));

    let restarted = app_with_settings(&path);
    let client = restarted.world().resource::<SettingsArc<ClientSettings>>();
    assert_eq!(client.server_address, "192.168.1.20");
    assert_eq!(client.port, 7000);
    assert_eq!(client.axes, ClientSettings::default().axes);
}

#[test]
fn saving_nothing_leaves_an_empty_delta() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollaball.settings.ron");

    let mut app = app_with_settings(&path);
    SessionOverrides::default().save(app.world_mut()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("client"));
    assert_eq!(
        **app.world().resource::<SettingsArc<ClientSettings>>(),
        ClientSettings::default()
    );
}
