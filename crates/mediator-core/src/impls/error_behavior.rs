//! ErrorBehavior - Request パイプライン最外殻の例外観測ポイント
//!
//! `use_error_behavior = true` のとき、Mediator がすべての Request パイプラインの
//! 先頭（最外殻）に挿入します。
//!
//! # 方針
//! - 継続を呼び、失敗したら `ErrorObserver` に渡す
//! - 観測後は元のエラーをそのまま返す（握りつぶさない・別の値に変換しない）

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{CancellationToken, MediatorError, Request, type_name_of};
use crate::typed::{Next, PipelineBehavior};

/// Hook that sees every request failure passing through [`ErrorBehavior`].
pub trait ErrorObserver: Send + Sync {
    fn observe(&self, request: &'static str, error: &MediatorError);
}

/// Logs failures with `tracing`. Cancellations are logged at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorObserver;

impl ErrorObserver for TracingErrorObserver {
    fn observe(&self, request: &'static str, error: &MediatorError) {
        if error.is_cancelled() {
            tracing::debug!(request, "request cancelled");
        } else {
            tracing::error!(request, kind = ?error.kind(), error = %error, "request failed");
        }
    }
}

pub struct ErrorBehavior {
    observer: Arc<dyn ErrorObserver>,
}

impl ErrorBehavior {
    pub fn new(observer: Arc<dyn ErrorObserver>) -> Self {
        Self { observer }
    }
}

impl Default for ErrorBehavior {
    fn default() -> Self {
        Self::new(Arc::new(TracingErrorObserver))
    }
}

#[async_trait]
impl<R: Request> PipelineBehavior<R> for ErrorBehavior {
    async fn handle(
        &self,
        request: R,
        next: Next<R>,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        next.run(request, cancel).await.inspect_err(|error| {
            self.observer.observe(type_name_of::<R>(), error);
        })
    }
}
