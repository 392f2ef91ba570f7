use crate::value::FieldValue;
use chrono::Utc;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};

/// One log event as seen by [`RestApiHandler::emit`](crate::handler::RestApiHandler::emit).
///
/// Records are normally built by [`RestApiLayer`](crate::layer::RestApiLayer)
/// from `tracing` events, but can be assembled by hand for direct use.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Logger name (the `tracing` target).
    pub name: String,
    /// Upper-case level name, e.g. `INFO` or `WARNING`.
    pub level: String,
    /// Fully formatted message.
    pub message: String,
    /// Creation time as seconds since the Unix epoch.
    pub created: f64,
    pub process: u32,
    pub thread: u64,
    pub func_name: String,
    pub line: u32,
    pub exception: Option<ExceptionInfo>,
    /// Caller-supplied extra fields.
    pub extra: BTreeMap<String, FieldValue>,
}

impl LogRecord {
    /// Create a record stamped with the current time, process and thread.
    pub fn new(name: impl Into<String>, level: impl Into<String>, message: impl Into<String>) -> Self {
        LogRecord {
            name: name.into(),
            level: level.into(),
            message: message.into(),
            created: now_epoch_secs(),
            process: std::process::id(),
            thread: current_thread_id(),
            func_name: "<module>".to_string(),
            line: 0,
            exception: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_call_site(mut self, func_name: impl Into<String>, line: u32) -> Self {
        self.func_name = func_name.into();
        self.line = line;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }
}

/// Exception information attached to a record logged while handling an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionInfo {
    /// Label of the error, usually the field name it was recorded under.
    pub kind: String,
    pub message: String,
    /// Messages of the `source()` chain, outermost first.
    pub causes: Vec<String>,
    /// Captured stack frames, if any.
    pub frames: Option<String>,
}

impl ExceptionInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ExceptionInfo {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
            frames: None,
        }
    }

    /// Capture an error, its cause chain and, when `RUST_BACKTRACE` enables
    /// it, a backtrace of the logging call site.
    pub fn from_error(kind: impl Into<String>, error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let backtrace = std::backtrace::Backtrace::capture();
        let frames = match backtrace.status() {
            std::backtrace::BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        ExceptionInfo {
            kind: kind.into(),
            message: error.to_string(),
            causes,
            frames,
        }
    }

    pub fn with_frames(mut self, frames: impl Into<String>) -> Self {
        self.frames = Some(frames.into());
        self
    }

    /// Render the traceback text carried in the payload. Always starts with
    /// `Traceback`.
    pub fn format_traceback(&self) -> String {
        let mut out = String::from("Traceback (most recent call last):\n");
        match &self.frames {
            Some(frames) => {
                for line in frames.lines() {
                    out.push_str("  ");
                    out.push_str(line.trim_start());
                    out.push('\n');
                }
            }
            None => out.push_str("  <no frames captured>\n"),
        }
        out.push_str(&format!("{}: {}", self.kind, self.message));
        for cause in &self.causes {
            out.push_str(&format!("\ncaused by: {}", cause));
        }
        out
    }
}

pub(crate) fn now_epoch_secs() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Stable numeric id of the calling thread, assigned on first use.
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}
