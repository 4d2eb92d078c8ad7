// Common Module
//
// Shared identifiers, configuration and query-scoped logging.

pub mod types;
pub mod config;
pub mod logging;

pub use self::config::{EngineConfig, ExecutorConfig};
pub use self::logging::QueryLogger;
