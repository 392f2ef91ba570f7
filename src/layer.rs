use crate::handler::RestApiHandler;
use crate::record::{ExceptionInfo, LogRecord};
use crate::value::FieldValue;
use std::collections::BTreeMap;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Targets whose events are never shipped. Posting a payload makes the HTTP
/// stack emit its own events, which must not be posted in turn.
const SUPPRESSED_TARGETS: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "h2",
    "rustls",
    "want",
    "mio",
    "tokio",
    env!("CARGO_CRATE_NAME"),
];

/// `tracing_subscriber` layer that turns every event at or above
/// `min_level` into a [`LogRecord`] and hands it to a [`RestApiHandler`].
///
/// Normalization happens inline on the thread that logged; only the POST
/// itself is asynchronous.
pub struct RestApiLayer {
    handler: RestApiHandler,
    min_level: Level,
    /// Total events seen by the layer (before filtering).
    pub total_events: Arc<AtomicU64>,
    /// Events that were normalized and submitted for delivery.
    pub dispatched_events: Arc<AtomicU64>,
}

impl RestApiLayer {
    pub fn new(handler: RestApiHandler, min_level: Level) -> Self {
        Self {
            handler,
            min_level,
            total_events: Arc::new(AtomicU64::new(0)),
            dispatched_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn handler(&self) -> &RestApiHandler {
        &self.handler
    }
}

fn is_suppressed(target: &str) -> bool {
    SUPPRESSED_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Level names as the receiving side expects them.
pub fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

impl<S> Layer<S> for RestApiLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.min_level || is_suppressed(meta.target()) {
            return;
        }

        let mut extra = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut exception: Option<ExceptionInfo> = None;

        let mut visitor = FieldVisitor {
            extra: &mut extra,
            message: &mut message,
            exception: &mut exception,
        };
        event.record(&mut visitor);

        // `None` options and `field::Empty` are declared but never visited.
        for field in event.fields() {
            let name = field.name();
            let is_exception = exception.as_ref().is_some_and(|e| e.kind == name);
            if name != "message" && !is_exception && !extra.contains_key(name) {
                extra.insert(name.to_string(), FieldValue::Null);
            }
        }

        // Innermost span, typically the `#[instrument]`ed function.
        let func_name = ctx
            .event_span(event)
            .map(|span| span.name().to_string())
            .or_else(|| meta.module_path().and_then(|m| m.rsplit("::").next()).map(str::to_string))
            .unwrap_or_else(|| "<module>".to_string());

        let mut record = LogRecord::new(meta.target(), level_name(meta.level()), message.unwrap_or_default())
            .with_call_site(func_name, meta.line().unwrap_or(0));
        record.extra = extra;
        record.exception = exception;

        // Fire and forget: dropping the handle detaches the POST.
        drop(self.handler.emit(&record));
        self.dispatched_events.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct FieldVisitor<'a> {
    pub extra: &'a mut BTreeMap<String, FieldValue>,
    pub message: &'a mut Option<String>,
    pub exception: &'a mut Option<ExceptionInfo>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.extra.insert(field.name().to_string(), FieldValue::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.extra.insert(field.name().to_string(), FieldValue::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.extra.insert(field.name().to_string(), FieldValue::UInt(value));
    }

    fn record_i128(&mut self, field: &Field, value: i128) {
        self.extra.insert(field.name().to_string(), FieldValue::from(value));
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        self.extra.insert(field.name().to_string(), FieldValue::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.extra.insert(field.name().to_string(), FieldValue::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.extra.insert(field.name().to_string(), FieldValue::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if self.exception.is_none() {
            *self.exception = Some(ExceptionInfo::from_error(field.name(), value));
        } else {
            self.extra.insert(field.name().to_string(), FieldValue::opaque(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let repr = format!("{:?}", value);
        if field.name() == "message" {
            *self.message = Some(repr);
        } else {
            self.extra.insert(field.name().to_string(), FieldValue::Opaque(repr));
        }
    }
}
