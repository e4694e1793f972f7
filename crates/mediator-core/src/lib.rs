//! mediator-core
//!
//! In-process mediator: typed requests go to exactly one handler, notifications
//! fan out to any number of handlers, and pipeline behaviors wrap handler
//! execution without either side knowing.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Request / Notification marker, Unit, errors, config, cancel, ids）
//! - **ports**: 抽象化レイヤー（Resolver）
//! - **typed**: 型付きハンドラ / behavior API（RequestHandler, PipelineBehavior, Next）
//! - **pipeline**: behavior の合成と型キーのディスパッチキャッシュ
//! - **app**: Mediator（Sender / Publisher）と MediatorBuilder
//! - **impls**: 実装（ServiceRegistry, ErrorBehavior, LoggingBehavior）

pub mod app;
pub mod domain;
pub mod impls;
pub mod pipeline;
pub mod ports;
pub mod typed;

#[cfg(test)]
mod testing;

/// Everything a handler author or composition root usually needs.
pub mod prelude {
    pub use crate::app::{BuildError, Mediator, MediatorBuilder, Publisher, Sender};
    pub use crate::domain::{
        CancellationSource, CancellationToken, DispatchStrategy, Lifetime, MediatorConfig,
        MediatorError, Notification, Request, Unit,
    };
    pub use crate::impls::{ErrorBehavior, ErrorObserver, LoggingBehavior, ServiceRegistry};
    pub use crate::ports::{Resolver, ResolverExt};
    pub use crate::typed::{
        FnNotificationHandler, FnRequestHandler, Next, NotificationBehavior, NotificationHandler,
        NotificationNext, PipelineBehavior, RequestHandler,
    };
}
