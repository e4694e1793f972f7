//! Message markers - Request と Notification の定義
//!
//! # 使用例
//! ```ignore
//! struct GetUser {
//!     id: u64,
//! }
//!
//! impl Request for GetUser {
//!     type Response = User;
//! }
//!
//! #[derive(Clone)]
//! struct UserCreated {
//!     id: u64,
//! }
//!
//! impl Notification for UserCreated {}
//! ```

/// A value that, when sent, yields exactly one `Response`.
///
/// Requests without a meaningful result use [`Unit`](super::Unit) as their
/// response type.
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

/// A value that may be broadcast to any number of independent handlers.
///
/// Each handler receives its own clone.
pub trait Notification: Clone + Send + Sync + 'static {}

/// Fully qualified type name used in logs and error messages.
pub fn type_name_of<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}
