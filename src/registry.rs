//! The registry of named loggers. The registry is the default logger itself, and the cascade
//! operations change the default logger, every registered logger, and the defaults for loggers
//! created later.

use log::Log;
use std::collections::HashMap;
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::binder::Output;
use crate::logger::Logger;
use crate::profile::RuntimeProfile;
use crate::severity::{Level, Severity, DEFAULT_LEVEL};

/// The default logger plus a catalog of named loggers. Dereferences to the default logger, so
/// `registry.info("...")` logs without a prefix.
pub struct Registry {
    /// Never stored in `globals.loggers`.
    default: Arc<Logger>,
    output: Arc<Output>,
    globals: Mutex<Globals>,
}

struct Globals {
    /// Whether newly created loggers start out enabled.
    enabled: bool,
    /// The level newly created loggers start out with.
    level: Level,
    loggers: HashMap<String, Arc<Logger>>,
}

impl Registry {
    /// A registry where every logger starts out enabled with [`DEFAULT_LEVEL`].
    pub fn new(output: Output) -> Self {
        Self::with_defaults(output, true, DEFAULT_LEVEL)
    }

    /// A registry whose default logger and future named loggers start out with `enabled` and
    /// `level`.
    pub fn with_defaults(output: Output, enabled: bool, level: Level) -> Self {
        let output = Arc::new(output);

        Registry {
            default: Arc::new(Logger::new(output.clone(), "", enabled, level)),
            output,
            globals: Mutex::new(Globals {
                enabled,
                level,
                loggers: HashMap::new(),
            }),
        }
    }

    /// The logger without a name.
    pub fn default_logger(&self) -> &Arc<Logger> {
        &self.default
    }

    /// Get the logger called `name`, creating it with the current global defaults if it does not
    /// exist yet. An empty name returns the default logger.
    pub fn get(&self, name: &str) -> Arc<Logger> {
        if name.is_empty() {
            return self.default.clone();
        }

        let mut globals = self.lock();
        let Globals {
            enabled,
            level,
            loggers,
        } = &mut *globals;

        loggers
            .entry(name.to_owned())
            .or_insert_with(|| {
                Arc::new(Logger::new(self.output.clone(), name, *enabled, *level))
            })
            .clone()
    }

    /// Whether a call to `severity` through the logger called `name` would reach the sink. Unlike
    /// [`get()`][Self::get()] this never registers a logger. Unknown names are answered from the
    /// defaults a new logger would start out with.
    pub fn would_log(&self, name: &str, severity: Severity) -> bool {
        if name.is_empty() {
            return self.default.is_active(severity);
        }

        let globals = self.lock();
        match globals.loggers.get(name) {
            Some(logger) => logger.is_active(severity),
            None => globals.enabled && severity.level() >= globals.level,
        }
    }

    /// Disable the default logger, every registered logger, and all loggers created from now on.
    pub fn disable_all(&self) -> &Self {
        let mut globals = self.lock();
        globals.enabled = false;

        self.default.disable();
        for logger in globals.loggers.values() {
            logger.disable();
        }

        self
    }

    /// Enable the default logger, every registered logger, and all loggers created from now on.
    pub fn enable_all(&self) -> &Self {
        let mut globals = self.lock();
        globals.enabled = true;

        self.default.enable();
        for logger in globals.loggers.values() {
            logger.enable();
        }

        self
    }

    pub fn set_level_all(&self, level: Level) -> &Self {
        let mut globals = self.lock();
        globals.level = level;

        self.default.set_level(level);
        for logger in globals.loggers.values() {
            logger.set_level(level);
        }

        self
    }

    /// Forget every named logger. Handles to those loggers keep working, but [`get()`][Self::get()]
    /// will create new loggers for their names.
    pub fn delete_loggers(&self) -> &Self {
        self.lock().loggers.clear();

        self
    }

    /// Whether loggers created from now on start out enabled.
    pub fn is_enabled_all(&self) -> bool {
        self.lock().enabled
    }

    /// The level loggers created from now on start out with.
    pub fn level_all(&self) -> Level {
        self.lock().level
    }

    /// Whether a logger called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().loggers.contains_key(name)
    }

    /// The number of registered named loggers. The default logger is not counted.
    pub fn len(&self) -> usize {
        self.lock().loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().loggers.is_empty()
    }

    pub fn profile(&self) -> RuntimeProfile {
        self.output.profile
    }

    fn lock(&self) -> MutexGuard<'_, Globals> {
        self.globals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Deref for Registry {
    type Target = Logger;

    fn deref(&self) -> &Self::Target {
        &self.default
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let globals = self.lock();
        let mut names: Vec<&str> = globals.loggers.keys().map(String::as_str).collect();
        names.sort_unstable();

        f.debug_struct("Registry")
            .field("default", &self.default)
            .field("output", &self.output)
            .field("enabled", &globals.enabled)
            .field("level", &globals.level)
            .field("loggers", &names)
            .finish()
    }
}

/// Routes records from the `log` crate's macros to the logger named after the record's target.
/// Created with [`Registry::log_bridge()`].
#[derive(Debug, Clone, Copy)]
pub struct LogBridge<'a> {
    registry: &'a Registry,
}

impl Registry {
    pub fn log_bridge(&self) -> LogBridge<'_> {
        LogBridge { registry: self }
    }
}

impl Log for LogBridge<'_> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.registry
            .would_log(metadata.target(), Severity::from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        self.registry
            .get(record.target())
            .severity(Severity::from(record.level()), record.args());
    }

    fn flush(&self) {
        self.registry.output.sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn registry() -> (Registry, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let registry = Registry::new(Output::new(RuntimeProfile::Terminal, sink.clone()));

        (registry, sink)
    }

    #[test]
    fn default_logger_is_not_registered() {
        let (registry, _) = registry();

        assert!(Arc::ptr_eq(&registry.get(""), registry.default_logger()));
        assert_eq!(registry.name(), "");
        assert!(registry.is_empty());
    }

    #[test]
    fn get_returns_the_same_logger() {
        let (registry, _) = registry();

        let first = registry.get("loggerA");
        let second = registry.get("loggerA");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &registry.get("loggerB")));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("loggerA"));
    }

    #[test]
    fn deleted_loggers_are_replaced() {
        let (registry, sink) = registry();

        let deleted = registry.get("LoggerA");
        registry.delete_loggers();
        let replacement = registry.get("LoggerA");
        assert!(!Arc::ptr_eq(&deleted, &replacement));

        // The deleted logger still works and is independent of the registry
        registry.disable_all();
        deleted.log("still here");
        replacement.log("born disabled");
        assert_eq!(sink.payloads(), ["still here"]);
    }

    #[test]
    fn disabling_the_default_logger_leaves_others_alone() {
        let (registry, sink) = registry();

        registry.log("msg_default");
        registry.disable();
        registry.log("msg_default_disabled");
        registry.get("CustomLogger").log("msg_custom");

        assert_eq!(sink.payloads(), ["msg_default", "msg_custom"]);
    }

    #[test]
    fn disable_all_applies_to_loggers_created_before_and_after() {
        let (registry, sink) = registry();

        let before = registry.get("LoggerBefore");
        registry.disable_all();
        let after = registry.get("LoggerAfter");

        registry.log("default");
        before.log("before");
        after.log("after");

        assert!(sink.is_empty());
        assert!(!after.is_enabled());
        assert!(!registry.is_enabled_all());
    }

    #[test]
    fn enable_all_applies_to_loggers_created_before_and_after() {
        let (registry, sink) = registry();

        registry.disable_all();
        let before = registry.get("LoggerBefore");
        before.log("before");
        assert!(sink.is_empty());

        registry.enable_all();
        let after = registry.get("LoggerAfter");

        registry.log("default");
        before.log("before");
        after.log("after");

        assert_eq!(sink.payloads(), ["default", "before", "after"]);
    }

    #[test]
    fn set_level_all_applies_to_loggers_created_before_and_after() {
        let (registry, sink) = registry();

        let before = registry.get("SetLevelAllBeforeLogger");
        before.log("custom_before_log1");
        registry.log("default_log1");

        registry.set_level_all(Level::Warn);
        let after = registry.get("SetLevelAllAfterLogger");
        assert_eq!(after.level(), Level::Warn);
        assert_eq!(registry.level_all(), Level::Warn);

        before.log("custom_before_log2");
        after.log("custom_after_log");
        registry.log("default_log2");

        registry.warn("default_warn");
        before.warn("custom_before_warn");
        after.warn("custom_after_warn");

        assert_eq!(
            sink.payloads_for(Severity::Log),
            ["custom_before_log1", "default_log1"]
        );
        assert_eq!(
            sink.payloads_for(Severity::Warn),
            ["default_warn", "custom_before_warn", "custom_after_warn"]
        );
    }

    #[test]
    fn enabling_a_custom_logger_leaves_the_default_alone() {
        let (registry, sink) = registry();
        let custom = registry.get("CustomLogger");

        registry.disable();
        custom.log("msg_custom_enabled1");
        custom.disable();
        custom.log("msg_custom_disabled");
        custom.enable();
        registry.log("default_log_disabled");
        custom.log("msg_custom_enabled2");

        assert_eq!(
            sink.payloads(),
            ["msg_custom_enabled1", "msg_custom_enabled2"]
        );
    }

    #[test]
    fn cascades_chain() {
        let (registry, _) = registry();
        let logger = registry.get("chained");

        registry
            .disable_all()
            .set_level_all(Level::Error)
            .enable_all()
            .delete_loggers();

        assert!(logger.is_enabled());
        assert_eq!(logger.level(), Level::Error);
        assert!(!registry.contains("chained"));
    }

    #[test]
    fn cascades_skip_deleted_loggers() {
        let (registry, _) = registry();
        let deleted = registry.get("chained");

        registry
            .delete_loggers()
            .disable_all()
            .set_level_all(Level::Error)
            .enable_all();

        assert!(deleted.is_enabled());
        assert_eq!(deleted.level(), Level::All);

        let fresh = registry.get("chained");
        assert!(!Arc::ptr_eq(&deleted, &fresh));
        assert_eq!(fresh.level(), Level::Error);
    }

    #[test]
    fn startup_defaults_apply_to_the_default_logger() {
        let sink = Arc::new(MemorySink::new());
        let registry = Registry::with_defaults(
            Output::new(RuntimeProfile::Terminal, sink.clone()),
            false,
            Level::Info,
        );

        assert!(!registry.is_enabled());
        assert_eq!(registry.level(), Level::Info);
        assert!(!registry.get("named").is_enabled());
    }

    #[test]
    fn log_records_are_routed_by_target() {
        let (registry, sink) = registry();
        registry.get("net").set_level(Level::Warn);

        let bridge = registry.log_bridge();
        let record = |target: &'static str, level: log::Level, message: &'static str| {
            bridge.log(
                &log::Record::builder()
                    .target(target)
                    .level(level)
                    .args(format_args!("{message}"))
                    .build(),
            );
        };

        record("net", log::Level::Info, "dropped");
        record("net", log::Level::Error, "timeout");
        record("db", log::Level::Trace, "query");

        assert_eq!(sink.payloads(), ["timeout", "query"]);
        assert_eq!(sink.payloads_for(Severity::Debug), ["query"]);
        assert!(registry.contains("db"));

        let metadata = log::Metadata::builder()
            .target("net")
            .level(log::Level::Info)
            .build();
        assert!(!bridge.enabled(&metadata));
    }

    #[test]
    fn enabled_queries_do_not_register_loggers() {
        let (registry, _) = registry();
        let bridge = registry.log_bridge();
        let metadata = |target: &'static str, level: log::Level| {
            log::Metadata::builder().target(target).level(level).build()
        };

        for target in ["a", "b", "c"] {
            assert!(bridge.enabled(&metadata(target, log::Level::Debug)));
        }
        assert!(registry.is_empty());

        // Unknown targets follow the defaults for new loggers
        registry.set_level_all(Level::Warn);
        assert!(!bridge.enabled(&metadata("d", log::Level::Info)));
        assert!(bridge.enabled(&metadata("d", log::Level::Error)));
        registry.disable_all();
        assert!(!bridge.enabled(&metadata("d", log::Level::Error)));
        assert!(registry.is_empty());

        // Registered loggers answer for themselves, including deleted names coming back
        registry.enable_all().set_level_all(Level::All);
        registry.get("known").set_level(Level::Error);
        assert!(!bridge.enabled(&metadata("known", log::Level::Warn)));
        registry.delete_loggers();
        assert!(bridge.enabled(&metadata("known", log::Level::Warn)));
        assert!(!registry.contains("known"));
        assert!(bridge.enabled(&metadata("", log::Level::Trace)));
    }
}
