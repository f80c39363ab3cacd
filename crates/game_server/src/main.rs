use anyhow::anyhow;
use app::{AppBuilder, Application, LOG_MAIN};
use bevy::app::AppExit;
use clap::Parser;
use game_server::settings::{Gameplay, Network, NetworkOverrides};
use game_server::{ServerSignals, configure_server_app};
use settings::{AppSettingsExt, SettingsStore};

#[derive(Parser)]
#[command(name = "rollaball_server", version, about = "Rollaball dedicated server")]
struct Args {
    /// First UDP port to try, the next free one is used if it is taken
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind the server socket to
    #[arg(short, long)]
    bind: Option<String>,

    /// Keep the options above as the new settings
    #[arg(long)]
    save: bool,
}

struct DedicatedServer;

impl Application for DedicatedServer {
    const APP_ID: &'static str = "rollaball_server";
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server = AppBuilder::<DedicatedServer>::new(env!("CARGO_PKG_VERSION"))
        .map_err(|e| anyhow!(e))?
        .build_with_bevy(|mut app, ctx| {
            let store = SettingsStore::builder()
                .with_settings_file(ctx.path_context().settings_file(None))
                .build()?;
            store.register::<Network>()?;
            store.register::<Gameplay>()?;

            let overrides = NetworkOverrides {
                port: args.port,
                bind_address: args.bind,
            };
            if args.save {
                overrides.save(&store)?;
            }
            let mut network = (*store.get::<Network>()?).clone();
            overrides.apply(&mut network);
            let gameplay = (*store.get::<Gameplay>()?).clone();

            configure_server_app(&mut app, network, gameplay, ServerSignals::default());
            app.insert_settings_store(store);
            Ok(app)
        })
        .map_err(|e| anyhow!(e))?;

    match server.run() {
        AppExit::Success => {
            tracing::info!(target: LOG_MAIN, "Server stopped");
            Ok(())
        }
        AppExit::Error(code) => Err(anyhow!("server exited with code {code}")),
    }
}
