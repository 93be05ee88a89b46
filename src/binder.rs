//! Turns a logger's state into the functions its five logging methods call. Loggers rebind when
//! their state changes so a logging call never has to check whether it should print anything.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use std::fmt::{Debug, Display};
use std::sync::Arc;
use termcolor::{Ansi, ColorSpec, WriteColor};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::profile::RuntimeProfile;
use crate::severity::{Level, Severity};
use crate::sink::{Arg, Sink};

/// A bound logging method. Either writes the payload to a sink or does nothing at all.
pub type Method = Arc<dyn Fn(&dyn Display) + Send + Sync>;

/// Badge background and foreground colors for the browser console. One is picked at random for
/// every logger.
const BADGE_COLORS: [(&str, &str); 13] = [
    ("#007bff", "white"),
    ("#6610f2", "white"),
    ("#6f42c1", "white"),
    ("#e83e8c", "white"),
    ("#dc3545", "white"),
    ("#fd7e14", "white"),
    ("#ffc107", "#212529"),
    ("#28a745", "white"),
    ("#20c997", "white"),
    ("#17a2b8", "white"),
    ("#6c757d", "white"),
    ("#f8f9fa", "#212529"),
    ("#343a40", "white"),
];

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

static NOOP: Lazy<Method> = Lazy::new(new_noop);

/// The local UTC offset, resolved once. The offset can only be queried soundly while the process is
/// single threaded on some Unix platforms, so it is fixed when timestamps are first enabled and
/// falls back to UTC if it cannot be determined at that point.
static LOCAL_OFFSET: Lazy<UtcOffset> =
    Lazy::new(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC));

/// Everything that decides how an active method writes its output. Shared by all loggers in a
/// registry.
#[derive(Clone)]
pub struct Output {
    pub profile: RuntimeProfile,
    pub sink: Arc<dyn Sink>,
    /// Prepend the local time to every line.
    pub timestamps: bool,
}

/// The parts of a logger's decoration that are fixed when the logger is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    prefix: String,
    /// The CSS for the prefix badge in the browser console.
    badge: String,
}

/// The bound methods for a logger, indexed by severity.
#[derive(Clone)]
pub struct MethodTable {
    methods: [Method; Severity::COUNT],
    active: [bool; Severity::COUNT],
}

impl Output {
    pub fn new(profile: RuntimeProfile, sink: Arc<dyn Sink>) -> Self {
        Output {
            profile,
            sink,
            timestamps: false,
        }
    }

    /// Enabling timestamps also fixes the local UTC offset used for them, so this should be called
    /// before the program spawns any threads.
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        if timestamps {
            Lazy::force(&LOCAL_OFFSET);
        }
        self.timestamps = timestamps;
        self
    }
}

impl Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("profile", &self.profile)
            .field("sink", &"<dyn Sink>")
            .field("timestamps", &self.timestamps)
            .finish()
    }
}

impl Label {
    /// A label for `prefix` with a randomly chosen badge color.
    pub fn new(prefix: impl Into<String>) -> Self {
        let (background, foreground) = BADGE_COLORS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(BADGE_COLORS[0]);

        Self::with_badge(
            prefix,
            format!(
                "color: {foreground}; background-color: {background}; padding: 2px 6px; \
                 border-radius: 2px; font-size: 10px; margin-right: 5px;"
            ),
        )
    }

    pub fn with_badge(prefix: impl Into<String>, badge: impl Into<String>) -> Self {
        Label {
            prefix: prefix.into(),
            badge: badge.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn badge(&self) -> &str {
        &self.badge
    }
}

impl MethodTable {
    /// A table where every method is a no-op.
    pub fn disabled() -> Self {
        MethodTable {
            methods: Severity::ALL.map(|_| noop()),
            active: [false; Severity::COUNT],
        }
    }

    pub fn get(&self, severity: Severity) -> &Method {
        &self.methods[severity.index()]
    }

    /// Whether calls to this method reach the sink.
    pub fn is_active(&self, severity: Severity) -> bool {
        self.active[severity.index()]
    }
}

impl Debug for MethodTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                Severity::ALL
                    .iter()
                    .map(|severity| (severity.name(), self.is_active(*severity))),
            )
            .finish()
    }
}

/// Bind every method for a logger with the given label and state. A method is only active when
/// the logger is enabled and the method's level is at least `min_level`.
pub fn bind(output: &Output, label: &Label, enabled: bool, min_level: Level) -> MethodTable {
    if !enabled {
        return MethodTable::disabled();
    }

    let active = Severity::ALL.map(|severity| severity.level() >= min_level);
    let methods = Severity::ALL.map(|severity| {
        if !active[severity.index()] {
            return noop();
        }

        // Sinks without a dedicated method get the same line through their generic method
        let method = if output.sink.supports(severity) {
            severity
        } else {
            Severity::Log
        };

        let (template, styles) = match output.profile {
            RuntimeProfile::Terminal => (
                terminal_template(label, severity, output.sink.colors(method)),
                Vec::new(),
            ),
            RuntimeProfile::BrowserConsole => (
                browser_template(label, severity),
                vec![
                    label.badge.clone(),
                    format!("color: {};", severity.css_color()),
                ],
            ),
        };

        sink_call(output, method, template, styles)
    });

    MethodTable { methods, active }
}

fn noop() -> Method {
    Arc::clone(&NOOP)
}

fn new_noop() -> Method {
    Arc::new(|_: &dyn Display| {})
}

/// `{icon} {color}{prefix} - %s{reset}`, without the prefix part for the default logger.
fn terminal_template(label: &Label, severity: Severity, colors: bool) -> String {
    let mut template = format!("{} ", severity.icon());
    let (open, close) = if colors {
        ansi_codes(severity)
    } else {
        (String::new(), String::new())
    };

    template.push_str(&open);
    if !label.prefix.is_empty() {
        template.push_str(&escape(&label.prefix));
        template.push_str(" - ");
    }
    template.push_str("%s");
    template.push_str(&close);

    template
}

/// `%c{icon} {prefix}%c%O`, with the first style applying to the badge and the second one
/// resetting to the method's text color.
fn browser_template(label: &Label, severity: Severity) -> String {
    let spacer = if label.prefix.is_empty() { "" } else { " " };

    format!(
        "%c{}{spacer}{}%c%O",
        severity.icon(),
        escape(&label.prefix)
    )
}

/// The escape sequences for starting and ending the severity's color.
fn ansi_codes(severity: Severity) -> (String, String) {
    let mut open = Ansi::new(Vec::new());
    let mut close = Ansi::new(Vec::new());

    // Writing to a `Vec` cannot fail
    let _ = open.set_color(ColorSpec::new().set_fg(Some(severity.color())));
    let _ = close.reset();

    (
        String::from_utf8_lossy(&open.into_inner()).into_owned(),
        String::from_utf8_lossy(&close.into_inner()).into_owned(),
    )
}

/// Logger names end up in templates, so their percent signs need to be escaped.
fn escape(prefix: &str) -> String {
    prefix.replace('%', "%%")
}

fn sink_call(output: &Output, method: Severity, template: String, styles: Vec<String>) -> Method {
    let sink = Arc::clone(&output.sink);
    let timestamps = output.timestamps;
    let template = if timestamps {
        format!("%s {template}")
    } else {
        template
    };

    Arc::new(move |payload: &dyn Display| {
        let timestamp = timestamps.then(timestamp);

        let mut args = Vec::with_capacity(styles.len() + 2);
        if let Some(timestamp) = &timestamp {
            args.push(Arg::Text(timestamp));
        }
        args.extend(styles.iter().map(|style| Arg::Style(style)));
        args.push(Arg::Payload(payload));

        sink.write(method, &template, &args);
    })
}

/// The current time in the offset from [`LOCAL_OFFSET`].
fn timestamp() -> String {
    let now = OffsetDateTime::now_utc().to_offset(*LOCAL_OFFSET);

    now.format(TIMESTAMP_FORMAT).unwrap_or_default()
}
