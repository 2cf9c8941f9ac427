use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root logger: JSON on stderr behind an asynchronous drain,
/// tagged with the build information.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}

/// Routes `RUST_LOG`-filtered output through a global logger, returning the
/// guard that keeps it installed, or `None` if one is already installed.
#[cfg(feature = "env_logging")]
pub fn initialize_env_logger() -> Option<slog_scope::GlobalLoggerGuard> {
    slog_envlogger::init().ok()
}

/// A logger that drops everything, for tests and helpers.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
