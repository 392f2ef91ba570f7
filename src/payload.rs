use crate::record::LogRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Standard record attributes that never appear under `details`.
pub const IGNORED_RECORD_KEYS: [&str; 17] = [
    "levelno",
    "pathname",
    "module",
    "filename",
    "funcName",
    "asctime",
    "msecs",
    "processName",
    "relativeCreated",
    "threadName",
    "stack_info",
    "exc_info",
    "exc_text",
    "args",
    "msg",
    "thread",
    "process",
];

/// Keys withheld from `details` because they are framework bookkeeping or
/// already surfaced at the top level of the payload or under `meta`.
pub const DETAIL_IGNORE_SET: [&str; 21] = [
    "levelno",
    "pathname",
    "module",
    "filename",
    "funcName",
    "asctime",
    "msecs",
    "processName",
    "relativeCreated",
    "threadName",
    "stack_info",
    "exc_info",
    "exc_text",
    "args",
    "msg",
    "created",
    "levelname",
    "process",
    "thread",
    "name",
    "lineno",
];

/// Where a record attribute lands in the [`Payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Framework bookkeeping, dropped.
    Ignored,
    /// Already represented by `log`, `level`, `pid`, `tid` or `meta`.
    Surfaced,
    /// Caller-supplied, goes to `details`.
    Detail,
}

pub fn classify(key: &str) -> KeyClass {
    if IGNORED_RECORD_KEYS.iter().any(|k| *k == key) {
        KeyClass::Ignored
    } else if DETAIL_IGNORE_SET.iter().any(|k| *k == key) {
        KeyClass::Surfaced
    } else {
        KeyClass::Detail
    }
}

/// Fixed metadata subset of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub created: f64,
    pub line: u32,
    #[serde(rename = "funcName")]
    pub func_name: String,
}

/// Normalized body POSTed for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub log: String,
    pub level: String,
    pub message: String,
    pub pid: String,
    pub tid: String,
    pub meta: Meta,
    /// Extra fields, each holding a JSON document rendered as a string.
    pub details: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl Payload {
    pub fn from_record(record: &LogRecord) -> Self {
        let details = record
            .extra
            .iter()
            .filter(|(key, _)| classify(key) == KeyClass::Detail)
            .map(|(key, value)| (key.clone(), value.encode_detail()))
            .collect();

        Payload {
            log: record.name.clone(),
            level: record.level.clone(),
            message: record.message.clone(),
            pid: format!("p-{}", record.process),
            tid: format!("t-{}", record.thread),
            meta: Meta {
                created: record.created,
                line: record.line,
                func_name: record.func_name.clone(),
            },
            details,
            traceback: record.exception.as_ref().map(|e| e.format_traceback()),
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
