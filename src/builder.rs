//! A builder interface for the registry.

use log::{LevelFilter, SetLoggerError};
use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use crate::binder::Output;
use crate::profile::RuntimeProfile;
use crate::registry::Registry;
use crate::severity::{Level, DEFAULT_LEVEL};
use crate::sink::{ConsoleSink, FileSink, Sink};
use crate::LOGGER_INSTANCE;

/// Constructs a loog registry, either a standalone one or the process-wide instance.
pub struct LoggerBuilder {
    /// An explicitly set sink. When writing to a file this already contains the file to ensure
    /// that it can actually be written to when the registry is created.
    sink: Option<Arc<dyn Sink>>,
    /// Overrides the detected runtime profile.
    profile: Option<RuntimeProfile>,
    timestamps: bool,
    enabled: bool,
    level: Level,
    log_bridge: bool,
}

/// Determines where the log output goes. If no explicit target is chosen, then
/// [`OutputTarget::Console`] is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Debug, log and info output to STDOUT, warnings and errors to STDERR.
    Console,
    /// Write everything to STDERR.
    Stderr,
    /// Append the log output to a file.
    File(PathBuf),
}

/// An error raised when setting the builder's output target. This can be converted back to the
/// builder using `Into<LoggerBuilder>`.
#[derive(Debug)]
pub enum SetTargetError {
    FileOpenError {
        builder: LoggerBuilder,
        path: PathBuf,
        error: std::io::Error,
    },
}

/// An error raised when installing the process-wide registry.
#[derive(Debug)]
pub enum SetGlobalError {
    /// The global registry was already installed, or it was already used through
    /// [`crate::registry()`] which installs a default one.
    AlreadyInitialized,
    /// Another logger was already installed for the `log` crate.
    Log(SetLoggerError),
}

impl From<SetTargetError> for LoggerBuilder {
    fn from(value: SetTargetError) -> Self {
        match value {
            SetTargetError::FileOpenError { builder, .. } => builder,
        }
    }
}

impl Error for SetTargetError {}

impl Display for SetTargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetTargetError::FileOpenError {
                builder: _,
                path,
                error,
            } => {
                write!(f, "Could not open '{}' ({})", path.display(), error)
            }
        }
    }
}

impl From<SetLoggerError> for SetGlobalError {
    fn from(value: SetLoggerError) -> Self {
        SetGlobalError::Log(value)
    }
}

impl Error for SetGlobalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SetGlobalError::AlreadyInitialized => None,
            SetGlobalError::Log(error) => Some(error),
        }
    }
}

impl Display for SetGlobalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetGlobalError::AlreadyInitialized => {
                write!(f, "The global registry has already been initialized")
            }
            SetGlobalError::Log(error) => {
                write!(f, "Could not install the log crate bridge ({error})")
            }
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        LoggerBuilder {
            sink: None,
            profile: None,
            timestamps: false,
            enabled: true,
            level: DEFAULT_LEVEL,
            log_bridge: false,
        }
    }
}

impl std::fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("sink", &self.sink.as_ref().map(|_| "<dyn Sink>"))
            .field("profile", &self.profile)
            .field("timestamps", &self.timestamps)
            .field("enabled", &self.enabled)
            .field("level", &self.level)
            .field("log_bridge", &self.log_bridge)
            .finish()
    }
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a standalone registry. This does not touch the process-wide instance.
    pub fn build(self) -> Registry {
        // Picking a sink happens in two steps:
        // - If `with_output_target()` or `with_sink()` was called, that sink is used.
        // - Otherwise warnings and errors go to STDERR and everything else to STDOUT.
        let sink: Arc<dyn Sink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(ConsoleSink::new()),
        };
        let profile = self.profile.unwrap_or_else(RuntimeProfile::current);
        let output = Output::new(profile, sink).with_timestamps(self.timestamps);

        Registry::with_defaults(output, self.enabled, self.level)
    }

    /// Install the configured registry as the process-wide registry returned by
    /// [`crate::registry()`]. The global registry can only be set once, and it is implicitly set
    /// to a default registry the first time it is accessed.
    pub fn build_global(self) -> Result<&'static Registry, SetGlobalError> {
        let log_bridge = self.log_bridge;

        let mut installed = false;
        let registry = LOGGER_INSTANCE.get_or_init(|| {
            installed = true;
            self.build()
        });
        if !installed {
            return Err(SetGlobalError::AlreadyInitialized);
        }

        if log_bridge {
            log::set_boxed_logger(Box::new(registry.log_bridge()))?;
            log::set_max_level(LevelFilter::Trace);
        }

        Ok(registry)
    }

    /// Explicitly set the output target for the registry. Returns an error if the target could not
    /// be set.
    pub fn with_output_target(mut self, target: OutputTarget) -> Result<Self, SetTargetError> {
        let sink: Arc<dyn Sink> = match target {
            OutputTarget::Console => Arc::new(ConsoleSink::new()),
            OutputTarget::Stderr => Arc::new(ConsoleSink::stderr_only()),
            OutputTarget::File(path) => match FileSink::open(&path) {
                Ok(sink) => Arc::new(sink),
                Err(error) => {
                    return Err(SetTargetError::FileOpenError {
                        builder: self,
                        path,
                        error,
                    })
                }
            },
        };

        self.sink = Some(sink);
        Ok(self)
    }

    /// Write to a custom sink instead of one of the built-in output targets.
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Use a specific runtime profile instead of the one detected for this process.
    pub fn with_profile(mut self, profile: RuntimeProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Prepend the local time to every line.
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Whether the default logger and new named loggers start out enabled. Defaults to `true`.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The level the default logger and new named loggers start out with. Defaults to
    /// [`DEFAULT_LEVEL`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Also route the `log` crate's macros through the global registry when calling
    /// [`build_global()`][Self::build_global()]. Records are written through the logger named
    /// after the record's target.
    pub fn install_log_bridge(mut self) -> Self {
        self.log_bridge = true;
        self
    }
}
