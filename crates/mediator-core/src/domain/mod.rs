//! Domain model (messages, unit, errors, configuration, cancellation, ids).

pub mod cancel;
pub mod config;
pub mod errors;
pub mod ids;
pub mod message;
pub mod unit;

pub use self::cancel::{CancellationSource, CancellationToken};
pub use self::config::{DispatchStrategy, Lifetime, MediatorConfig};
pub use self::errors::{BoxError, ErrorKind, MediatorError, RegistryError};
pub use self::ids::DispatchId;
pub use self::message::{Notification, Request, type_name_of};
pub use self::unit::Unit;
