//! An in-memory sink that records every call. Mostly useful for testing what reaches the output.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{render, Arg, Sink};
use crate::severity::Severity;

/// A single recorded [`Sink::write()`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkCall {
    /// The sink method that was called. This is [`Severity::Log`] when the logger's own method was
    /// missing.
    pub method: Severity,
    pub template: String,
    /// Every positional argument, stringified.
    pub args: Vec<String>,
    /// The stringified message, if the call carried one.
    pub payload: Option<String>,
    /// The fully rendered line.
    pub line: String,
}

/// Records all writes instead of outputting them.
#[derive(Debug, Default)]
pub struct MemorySink {
    calls: Mutex<Vec<SinkCall>>,
    /// Methods this sink pretends not to have.
    missing: Vec<Severity>,
    colors: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink without dedicated methods for `methods`, so those get written through
    /// [`Severity::Log`].
    pub fn without_methods(methods: &[Severity]) -> Self {
        MemorySink {
            missing: methods.to_vec(),
            ..Self::default()
        }
    }

    /// Whether the sink should claim to support terminal colors.
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().clone()
    }

    /// The payloads of every recorded call, in order.
    pub fn payloads(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|call| call.payload.clone())
            .collect()
    }

    /// The payloads of the calls made through a specific sink method.
    pub fn payloads_for(&self, method: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|call| call.method == method)
            .filter_map(|call| call.payload.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn supports(&self, severity: Severity) -> bool {
        !self.missing.contains(&severity)
    }

    fn colors(&self, _method: Severity) -> bool {
        self.colors
    }

    fn write(&self, method: Severity, template: &str, args: &[Arg<'_>]) {
        let payload = args.iter().rev().find_map(|arg| match arg {
            Arg::Payload(payload) => Some(payload.to_string()),
            _ => None,
        });

        let call = SinkCall {
            method,
            template: template.to_owned(),
            args: args.iter().map(ToString::to_string).collect(),
            payload,
            line: render(template, args),
        };

        self.lock().push(call);
    }
}
