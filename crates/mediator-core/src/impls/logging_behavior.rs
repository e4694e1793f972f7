//! LoggingBehavior - 処理開始・終了と所要時間をログに出す behavior
//!
//! Request 用・Notification 用の両方を実装しています。
//! 型ごとに `ServiceRegistry::add_behavior` / `add_notification_behavior` で登録します。

use std::time::Instant;

use async_trait::async_trait;

use crate::domain::{CancellationToken, MediatorError, Notification, Request, type_name_of};
use crate::typed::{Next, NotificationBehavior, NotificationNext, PipelineBehavior};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBehavior;

impl LoggingBehavior {
    pub fn new() -> Self {
        Self
    }
}

fn log_outcome<T>(kind: &'static str, name: &'static str, started: Instant, result: &Result<T, MediatorError>) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::info!(kind, name, elapsed_ms, "handled"),
        Err(error) => tracing::warn!(kind, name, elapsed_ms, error = %error, "handling failed"),
    }
}

#[async_trait]
impl<R: Request> PipelineBehavior<R> for LoggingBehavior {
    async fn handle(
        &self,
        request: R,
        next: Next<R>,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        let name = type_name_of::<R>();
        tracing::info!(kind = "request", name, "handling");
        let started = Instant::now();
        let result = next.run(request, cancel).await;
        log_outcome("request", name, started, &result);
        result
    }
}

#[async_trait]
impl<N: Notification> NotificationBehavior<N> for LoggingBehavior {
    async fn handle(
        &self,
        notification: N,
        next: NotificationNext<N>,
        cancel: CancellationToken,
    ) -> Result<(), MediatorError> {
        let name = type_name_of::<N>();
        tracing::info!(kind = "notification", name, "handling");
        let started = Instant::now();
        let result = next.run(notification, cancel).await;
        log_outcome("notification", name, started, &result);
        result
    }
}
