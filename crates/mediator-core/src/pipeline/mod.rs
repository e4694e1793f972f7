//! Pipeline - 合成（compose）とキャッシュ（cache）
//!
//! Mediator のホットパスから毎回の解決・合成コストを取り除く部分です。

pub mod cache;
pub mod compose;

pub use self::cache::{DispatchCache, NotificationSlot, RequestKey};
pub use self::compose::{compose_notification, compose_request};
