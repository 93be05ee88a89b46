//! A tiny leveled console logger. There is one default logger and any number of named loggers,
//! each with its own enabled flag and minimum level. The `*_all` functions change every logger at
//! once, including the ones created afterwards.
//!
//! ```no_run
//! use loog::Level;
//!
//! loog::registry().info("Hello");
//!
//! let db = loog::get("db");
//! db.warn("Slow query");
//! loog::set_level_all(Level::Warn);
//! loog::info!(db, "This is filtered out: {}", 42);
//! ```

use once_cell::sync::OnceCell;
use std::sync::Arc;

mod binder;
mod builder;
mod logger;
mod profile;
mod registry;
mod severity;
pub mod sink;

pub use binder::{bind, Label, Method, MethodTable, Output};
pub use builder::{LoggerBuilder, OutputTarget, SetGlobalError, SetTargetError};
pub use log::SetLoggerError;
pub use logger::Logger;
pub use profile::{Detector, RuntimeProfile};
pub use registry::{LogBridge, Registry};
pub use severity::{InvalidLevel, Level, Severity, DEFAULT_LEVEL};

/// The process-wide registry. Initialized in [`LoggerBuilder::build_global()`], or with the default
/// configuration the first time [`registry()`] is called.
static LOGGER_INSTANCE: OnceCell<Registry> = OnceCell::new();

/// The process-wide registry. This also acts as the default logger.
pub fn registry() -> &'static Registry {
    LOGGER_INSTANCE.get_or_init(|| LoggerBuilder::new().build())
}

/// Get a named logger from the process-wide registry. See [`Registry::get()`].
pub fn get(name: &str) -> Arc<Logger> {
    registry().get(name)
}

pub fn enable_all() -> &'static Registry {
    registry().enable_all()
}

pub fn disable_all() -> &'static Registry {
    registry().disable_all()
}

pub fn set_level_all(level: Level) -> &'static Registry {
    registry().set_level_all(level)
}

pub fn delete_loggers() -> &'static Registry {
    registry().delete_loggers()
}

/// Log a formatted message through a logger's debug method.
///
/// ```no_run
/// loog::debug!(loog::get("net"), "{} bytes received", 512);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message through a logger's log method.
#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message through a logger's info method.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message through a logger's warn method.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message through a logger's error method.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}
