pub mod error;
pub mod value;
pub mod record;
pub mod payload;
pub mod sink;
pub mod handler;
pub mod layer;

#[cfg(feature = "http")]
pub mod http;

pub mod env;
pub mod init;
pub mod noop_sink;

pub use handler::{DispatchHandle, RestApiHandler};
pub use layer::RestApiLayer;
pub use payload::Payload;
pub use record::{ExceptionInfo, LogRecord};
pub use value::FieldValue;
