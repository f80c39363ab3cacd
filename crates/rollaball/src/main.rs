use anyhow::anyhow;
use app::{AppBuilder, Application, LOG_MAIN};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;
use game_server::settings::Gameplay;
use rollaball::configure_client_app;
use rollaball::settings::{ClientSettings, SessionOverrides};
use settings::{AppSettingsExt, SettingsArc, SettingsStore};

#[derive(Parser)]
#[command(name = "rollaball", version, about = "Rollaball client")]
struct Args {
    /// Join the server at this address instead of hosting locally
    #[arg(short, long)]
    connect: Option<String>,

    /// Server port, or the first port tried when hosting
    #[arg(short, long)]
    port: Option<u16>,

    /// Host an embedded server and join it
    #[arg(long, conflicts_with = "connect")]
    host: bool,

    /// Keep the connection options above as the new settings
    #[arg(long)]
    save: bool,
}

struct Rollaball;

impl Application for Rollaball {
    const APP_ID: &'static str = "rollaball";
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut client = AppBuilder::<Rollaball>::new(env!("CARGO_PKG_VERSION"))
        .map_err(|e| anyhow!(e))?
        .build_with_bevy(|mut app, ctx| {
            app.add_plugins(
                DefaultPlugins
                    .build()
                    .disable::<LogPlugin>()
                    .set(WindowPlugin {
                        primary_window: Some(Window {
                            title: "Rollaball".to_string(),
                            ..default()
                        }),
                        ..default()
                    }),
            );

            let store = SettingsStore::builder()
                .with_settings_file(ctx.path_context().settings_file(None))
                .build()?;
            app.insert_settings_store(store)
                .register_settings_section::<ClientSettings>()?
                .register_settings_section::<Gameplay>()?;

            let overrides = SessionOverrides {
                connect: args.connect,
                port: args.port,
                host: args.host,
            };
            if args.save {
                overrides.save(app.world_mut())?;
            }
            let mut session = (**app.world().resource::<SettingsArc<ClientSettings>>()).clone();
            overrides.apply(&mut session);
            let gameplay = (**app.world().resource::<SettingsArc<Gameplay>>()).clone();

            configure_client_app(&mut app, &session, gameplay)?;
            Ok(app)
        })
        .map_err(|e| anyhow!(e))?;

    match client.run() {
        AppExit::Success => {
            tracing::info!(target: LOG_MAIN, "Client closed");
            Ok(())
        }
        AppExit::Error(code) => Err(anyhow!("client exited with code {code}")),
    }
}
