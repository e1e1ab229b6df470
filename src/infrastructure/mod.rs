pub mod error;
pub mod logging;

pub use error::{ErrorCategory, PickError, PickResult};
pub use logging::{setup_logging, LogFormat, LogOutput, LoggingConfig, OperationTracker};
