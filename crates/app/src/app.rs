//! Process bootstrap shared by the Rollaball binaries: paths, logging and the
//! Bevy app wrapper.

use paths::PathContext;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Log target for process-wide bootstrap messages.
pub const LOG_MAIN: &str = "main";
/// Log target for the authoritative server (dedicated or embedded).
pub const LOG_SERVER: &str = "server";
/// Log target for client-side gameplay and networking.
pub const LOG_CLIENT: &str = "client";

/// Paths and the log writer of a running binary.
pub struct AppContext {
    path_context: PathContext,
    version: &'static str,
    /// Flushes the log file when dropped.
    _log_guard: WorkerGuard,
}

impl AppContext {
    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }
}

/// Identity of a binary. Its files live below `<studio>/<project>/`.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "chicken105";
    const PROJECT_ID: &'static str = "rollaball";
}

pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Resolves the application paths and installs the global tracing subscriber.
    ///
    /// Debug builds keep their files in the workspace `.out` directory.
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        let path_context = if cfg!(debug_assertions) {
            let workspace = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
            PathContext::with_base_path(workspace.join(".out"), A::STUDIO, A::PROJECT_ID, A::APP_ID)
        } else {
            PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID)
        };
        path_context.ensure_directories()?;

        let (log_file, guard) = init_logging(&path_context)?;
        tracing::info!(
            target: LOG_MAIN,
            "{} {version} starting, logging to {}",
            A::APP_ID,
            log_file.display()
        );

        Ok(Self {
            context: AppContext {
                path_context,
                version,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    /// Lets `configure` set up a fresh Bevy `App`. Errors abort the build.
    ///
    /// ```ignore
    /// let mut app = AppBuilder::<MyApp>::new("1.0.0")?
    ///     .build_with_bevy(|mut app, ctx| {
    ///         app.add_plugins(MinimalPlugins);
    ///         Ok(app)
    ///     })?;
    /// app.run();
    /// ```
    #[cfg(feature = "bevy")]
    pub fn build_with_bevy(
        self,
        configure: impl FnOnce(bevy::app::App, &AppContext) -> Result<bevy::app::App, BoxError>,
    ) -> Result<BevyApp<A>, BoxError> {
        let app = configure(bevy::app::App::new(), &self.context)?;
        Ok(BevyApp {
            context: self.context,
            app,
            _marker: PhantomData,
        })
    }
}

/// INFO in debug builds, WARN in release builds. `RUST_LOG` overrides both.
fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Console plus a non-blocking file writer. Returns the log file path.
fn init_logging(paths: &PathContext) -> Result<(PathBuf, WorkerGuard), BoxError> {
    let log_file = paths.log_file_now();
    let file_name = log_file
        .file_name()
        .ok_or("log file path has no file name")?;

    let appender = tracing_appender::rolling::never(paths.logs_dir(), file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = || {
        EnvFilter::builder()
            .with_default_directive(default_level().into())
            .from_env_lossy()
    };

    tracing_subscriber::registry()
        .with(
            fmt::Layer::default()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter()),
        )
        .with(fmt::Layer::default().with_target(true).with_filter(filter()))
        .try_init()?;

    Ok((log_file, guard))
}

/// A configured Bevy app together with the context that keeps logging alive.
#[cfg(feature = "bevy")]
pub struct BevyApp<A: Application> {
    context: AppContext,
    app: bevy::app::App,
    _marker: PhantomData<A>,
}

#[cfg(feature = "bevy")]
impl<A: Application> BevyApp<A> {
    pub fn run(&mut self) -> bevy::app::AppExit {
        tracing::debug!(target: LOG_MAIN, "running {} {}", A::APP_ID, self.context.version());
        self.app.run()
    }
}
