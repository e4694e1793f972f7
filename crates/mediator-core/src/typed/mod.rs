//! Typed - 型付きハンドラ / behavior API
//!
//! このモジュールは Request と Handler の対応を型で保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `RequestHandler<R>`, `PipelineBehavior<R>` など - 型安全
//! - **内部（Erased）**: `RequestFn<R>` - 合成済みパイプライン。キャッシュには
//!   さらに `Arc<dyn Any>` に包んで格納する

pub mod behavior;
pub mod handler;

// 主要な trait/型 を再エクスポート
pub use self::behavior::{
    Next, NotificationBehavior, NotificationFn, NotificationNext, PipelineBehavior, RequestFn,
};
pub use self::handler::{
    FnNotificationHandler, FnRequestHandler, NotificationHandler, RequestHandler,
};
