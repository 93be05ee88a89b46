//! Severity levels and the static attributes of the five logging methods.

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;
use termcolor::Color;

/// The level used by loggers that have not been configured otherwise. Nothing is filtered.
pub const DEFAULT_LEVEL: Level = Level::All;

/// A minimum severity threshold. A logger only prints calls whose method's level is at least its
/// own level. [`Level::All`] sits below every method and is never used as a method itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    All = 0,
    Debug = 1,
    Log = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
}

/// One of the five logging methods available on every logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Log,
    Info,
    Warn,
    Error,
}

/// Raised when converting a raw integer or a string into a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidLevel {
    OutOfRange(u8),
    UnknownName(String),
}

impl Error for InvalidLevel {}

impl Display for InvalidLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidLevel::OutOfRange(value) => {
                write!(f, "{value} is not a log level, expected a value from 0 through 5")
            }
            InvalidLevel::UnknownName(name) => write!(f, "'{name}' is not a log level"),
        }
    }
}

impl Level {
    /// Every level in ascending order.
    pub const VALUES: [Level; 6] = [
        Level::All,
        Level::Debug,
        Level::Log,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::All => "all",
            Level::Debug => "debug",
            Level::Log => "log",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        DEFAULT_LEVEL
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for Level {
    type Error = InvalidLevel;

    fn try_from(value: u8) -> Result<Self, InvalidLevel> {
        Level::VALUES
            .get(usize::from(value))
            .copied()
            .ok_or(InvalidLevel::OutOfRange(value))
    }
}

impl FromStr for Level {
    type Err = InvalidLevel;

    /// Accepts either a level's name in any case, or its numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<u8>() {
            return Level::try_from(value);
        }

        Level::VALUES
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidLevel::UnknownName(s.to_owned()))
    }
}

impl Severity {
    /// The five methods, ordered from most to least verbose.
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Log,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    pub const COUNT: usize = Severity::ALL.len();

    /// The level this method is filtered at.
    pub fn level(self) -> Level {
        match self {
            Severity::Debug => Level::Debug,
            Severity::Log => Level::Log,
            Severity::Info => Level::Info,
            Severity::Warn => Level::Warn,
            Severity::Error => Level::Error,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Log => "log",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Debug => "\u{1F527}",
            Severity::Log => "\u{1F4DC}",
            Severity::Info => "\u{1F50D}",
            Severity::Warn => "\u{26A0}",
            Severity::Error => "\u{274C}",
        }
    }

    /// The terminal color for the message text.
    pub fn color(self) -> Color {
        match self {
            Severity::Debug => Color::Magenta,
            Severity::Log => Color::Black,
            Severity::Info => Color::Cyan,
            Severity::Warn => Color::Yellow,
            Severity::Error => Color::Red,
        }
    }

    /// The same color as [`color()`][Self::color()], as a CSS color name.
    pub fn css_color(self) -> &'static str {
        match self {
            Severity::Debug => "magenta",
            Severity::Log => "black",
            Severity::Info => "cyan",
            Severity::Warn => "yellow",
            Severity::Error => "red",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<log::Level> for Severity {
    /// There is no trace method, so trace records are treated as debug output.
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => Severity::Debug,
            log::Level::Info => Severity::Info,
            log::Level::Warn => Severity::Warn,
            log::Level::Error => Severity::Error,
        }
    }
}
