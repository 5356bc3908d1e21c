//! Reporting of predicates the view refused.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;
use tracing_error::SpanTrace;

use crate::error::FilterError;

const GENERAL_MESSAGE: &str = "Invalid filter specified.";

/// Which parts of an error report a sink receives
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModes {
    #[serde(default)]
    pub general: bool,
    #[serde(default)]
    pub message: bool,
    #[serde(default)]
    pub trace: bool,
}

impl ErrorModes {
    pub const OFF: ErrorModes = ErrorModes {
        general: false,
        message: false,
        trace: false,
    };
    pub const GENERAL: ErrorModes = ErrorModes {
        general: true,
        message: false,
        trace: false,
    };
    pub const ALL: ErrorModes = ErrorModes {
        general: true,
        message: true,
        trace: true,
    };

    pub fn is_off(&self) -> bool {
        !(self.general || self.message || self.trace)
    }

    /// One line per enabled flag, in general / message / trace order
    pub fn format(&self, error: &FilterError) -> String {
        let mut out = String::new();
        if self.general {
            out.push_str(GENERAL_MESSAGE);
        }
        if self.message {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "{error}");
        }
        if self.trace {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "{}", SpanTrace::capture());
        }
        out
    }
}

/// User-facing destination for error reports
pub trait NotificationSink: Send {
    fn notify(&self, text: &str);
}

/// Writes notifications to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl NotificationSink for StderrSink {
    fn notify(&self, text: &str) {
        eprintln!("{text}");
    }
}

/// Collects notifications in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, text: &str) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
    }
}

/// Routes a refused predicate to the log and to the notification sink
pub struct ErrorReporter {
    log_modes: ErrorModes,
    notify_modes: ErrorModes,
    sink: Box<dyn NotificationSink>,
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("log_modes", &self.log_modes)
            .field("notify_modes", &self.notify_modes)
            .finish_non_exhaustive()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(ErrorModes::OFF, ErrorModes::GENERAL)
    }
}

impl ErrorReporter {
    pub fn new(log_modes: ErrorModes, notify_modes: ErrorModes) -> Self {
        Self {
            log_modes,
            notify_modes,
            sink: Box::new(StderrSink),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn set_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sink = sink;
    }

    pub fn log_modes(&self) -> ErrorModes {
        self.log_modes
    }

    pub fn notify_modes(&self) -> ErrorModes {
        self.notify_modes
    }

    pub fn set_log_modes(&mut self, modes: ErrorModes) {
        self.log_modes = modes;
    }

    pub fn set_notify_modes(&mut self, modes: ErrorModes) {
        self.notify_modes = modes;
    }

    pub fn report(&self, error: &FilterError) {
        if !self.log_modes.is_off() {
            warn!("{}", self.log_modes.format(error));
        }
        if !self.notify_modes.is_off() {
            self.sink.notify(&self.notify_modes.format(error));
        }
    }
}
