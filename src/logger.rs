//! Individual loggers. Every logger keeps its own enabled flag and minimum level, and rebinds its
//! methods whenever either of those changes.

use std::fmt::{Debug, Display};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::binder::{self, Label, MethodTable, Output};
use crate::severity::{Level, Severity};

/// A named logger, or the default logger when the name is empty. Obtain one through
/// [`Registry::get()`][crate::Registry::get()].
pub struct Logger {
    name: String,
    label: Label,
    output: Arc<Output>,
    /// Held while rebinding so concurrent state changes cannot leave the table out of date.
    state: Mutex<State>,
    /// Replaced as a whole on every rebind. Logging calls only ever see a complete table.
    methods: RwLock<Arc<MethodTable>>,
}

#[derive(Debug, Clone, Copy)]
struct State {
    enabled: bool,
    level: Level,
}

impl Logger {
    /// Create a logger and bind its methods. The name doubles as the prefix for every line.
    pub fn new(output: Arc<Output>, name: impl Into<String>, enabled: bool, level: Level) -> Self {
        let name = name.into();
        let label = Label::new(name.clone());
        let methods = binder::bind(&output, &label, enabled, level);

        Logger {
            name,
            label,
            output,
            state: Mutex::new(State { enabled, level }),
            methods: RwLock::new(Arc::new(methods)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        self.label.prefix()
    }

    pub fn is_enabled(&self) -> bool {
        self.lock_state().enabled
    }

    pub fn level(&self) -> Level {
        self.lock_state().level
    }

    /// Whether calls to `severity`'s method currently reach the sink.
    pub fn is_active(&self, severity: Severity) -> bool {
        self.table().is_active(severity)
    }

    /// Turn every method into a no-op.
    pub fn disable(&self) -> &Self {
        let mut state = self.lock_state();
        state.enabled = false;
        self.swap(MethodTable::disabled());

        self
    }

    pub fn enable(&self) -> &Self {
        let mut state = self.lock_state();
        state.enabled = true;
        self.rebind(*state);

        self
    }

    /// Only let calls through whose method's level is at least `level`.
    pub fn set_level(&self, level: Level) -> &Self {
        let mut state = self.lock_state();
        state.level = level;
        self.rebind(*state);

        self
    }

    pub fn debug(&self, msg: impl Display) {
        self.call(Severity::Debug, &msg);
    }

    pub fn log(&self, msg: impl Display) {
        self.call(Severity::Log, &msg);
    }

    pub fn info(&self, msg: impl Display) {
        self.call(Severity::Info, &msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.call(Severity::Warn, &msg);
    }

    pub fn error(&self, msg: impl Display) {
        self.call(Severity::Error, &msg);
    }

    /// Call the method for `severity`. Equivalent to calling [`debug()`][Self::debug()],
    /// [`log()`][Self::log()] and so on directly.
    pub fn severity(&self, severity: Severity, msg: impl Display) {
        self.call(severity, &msg);
    }

    fn call(&self, severity: Severity, msg: &dyn Display) {
        // The lock is released before calling so a sink may log or reconfigure this logger
        let table = self.table();
        (table.get(severity))(msg);
    }

    fn rebind(&self, state: State) {
        self.swap(binder::bind(
            &self.output,
            &self.label,
            state.enabled,
            state.level,
        ));
    }

    fn swap(&self, table: MethodTable) {
        *self.methods.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
    }

    fn table(&self) -> Arc<MethodTable> {
        Arc::clone(&self.methods.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.lock_state();

        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("enabled", &state.enabled)
            .field("level", &state.level)
            .field("methods", &*self.table())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RuntimeProfile;
    use crate::sink::MemorySink;

    fn logger(name: &str) -> (Logger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let output = Arc::new(Output::new(RuntimeProfile::Terminal, sink.clone()));

        (Logger::new(output, name, true, Level::All), sink)
    }

    #[test]
    fn new_loggers_use_their_name_as_prefix() {
        let (logger, _) = logger("worker");
        assert_eq!(logger.name(), "worker");
        assert_eq!(logger.prefix(), "worker");
        assert!(logger.is_enabled());
        assert_eq!(logger.level(), Level::All);
    }

    #[test]
    fn disable_and_enable() {
        let (logger, sink) = logger("worker");

        logger.log("enabled1");
        logger.disable();
        logger.log("disabled");
        assert!(!logger.is_enabled());
        assert!(Severity::ALL.iter().all(|severity| !logger.is_active(*severity)));

        logger.enable();
        logger.log("enabled2");

        assert_eq!(sink.payloads(), ["enabled1", "enabled2"]);
    }

    #[test]
    fn set_level_filters_lower_methods() {
        let (logger, sink) = logger("worker");

        logger.log("log1");
        logger.set_level(Level::Warn);
        logger.log("log2");
        logger.info("info");
        logger.warn("warn");
        logger.error("error");

        assert_eq!(logger.level(), Level::Warn);
        assert_eq!(sink.payloads_for(Severity::Log), ["log1"]);
        assert_eq!(sink.payloads_for(Severity::Warn), ["warn"]);
        assert_eq!(sink.payloads_for(Severity::Error), ["error"]);
        assert!(sink.payloads_for(Severity::Info).is_empty());
    }

    #[test]
    fn level_is_kept_while_disabled() {
        let (logger, sink) = logger("worker");

        logger.set_level(Level::Error).disable().set_level(Level::Info);
        logger.error("hidden");
        logger.enable();
        logger.log("filtered");
        logger.info("shown");

        assert_eq!(sink.payloads(), ["shown"]);
    }

    #[test]
    fn repeated_state_changes_are_idempotent() {
        let (logger, sink) = logger("worker");

        logger.enable().enable();
        logger.set_level(Level::Info).set_level(Level::Info);
        for severity in Severity::ALL {
            logger.severity(severity, severity.name());
        }

        assert_eq!(sink.payloads(), ["info", "warn", "error"]);
        let templates: Vec<String> = sink.calls().into_iter().map(|call| call.template).collect();
        assert_eq!(templates[0], "\u{1F50D} worker - %s");
    }

    #[test]
    fn active_methods_follow_enabled_and_level() {
        let (logger, _) = logger("worker");

        for enabled in [true, false] {
            for level in Level::VALUES {
                if enabled {
                    logger.enable();
                } else {
                    logger.disable();
                }
                logger.set_level(level);

                for severity in Severity::ALL {
                    assert_eq!(
                        logger.is_active(severity),
                        enabled && severity.level() >= level,
                        "{severity} with enabled={enabled} and level={level}"
                    );
                }
            }
        }
    }

    #[test]
    fn logging_while_another_thread_rebinds() {
        let (logger, sink) = logger("worker");

        std::thread::scope(|scope| {
            for thread in 0..2 {
                let logger = &logger;
                scope.spawn(move || {
                    for i in 0..500 {
                        logger.log(format_args!("log {thread} {i}"));
                        logger.warn(format_args!("warn {thread} {i}"));
                    }
                });
            }

            scope.spawn(|| {
                for _ in 0..200 {
                    logger.disable().set_level(Level::Warn).enable();
                    logger.set_level(Level::All);
                }
                logger.set_level(Level::Warn);
            });
        });

        // Every line was written by a complete table, never a mix of two
        for call in sink.calls() {
            let payload = call.payload.clone().unwrap_or_default();
            let expected = match call.method {
                Severity::Log => "\u{1F4DC} worker - %s",
                Severity::Warn => "\u{26A0} worker - %s",
                other => panic!("Unexpected {other} call"),
            };
            assert_eq!(call.template, expected);
            assert!(payload.starts_with(call.method.name()), "{payload}");
        }

        assert!(logger.is_enabled());
        assert_eq!(logger.level(), Level::Warn);
        assert!(!logger.is_active(Severity::Log));
        assert!(logger.is_active(Severity::Warn));

        sink.clear();
        logger.log("filtered");
        logger.warn("shown");
        assert_eq!(sink.payloads(), ["shown"]);
    }

    #[test]
    fn debug_output_shows_state() {
        let (logger, _) = logger("worker");
        logger.set_level(Level::Warn);

        let debug = format!("{logger:?}");
        assert!(debug.contains("\"worker\""));
        assert!(debug.contains("Warn"));
    }
}
