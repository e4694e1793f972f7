//! Implementations - Resolver の参照実装と標準 behavior

pub mod error_behavior;
pub mod logging_behavior;
pub mod registry;

pub use error_behavior::{ErrorBehavior, ErrorObserver, TracingErrorObserver};
pub use logging_behavior::LoggingBehavior;
pub use registry::{RegistryScope, ServiceRegistry};
