//! Pipeline behaviors - ハンドラ実行を包む横断的関心事
//!
//! behavior は `next`（継続）を受け取り、次のどちらかを行います。
//! - `next.run(request, cancel)` を呼んで内側に処理を渡す（結果を加工してもよい）
//! - `next` を呼ばずに自分で Response を返す（short-circuit）
//!
//! # 学習ポイント
//! - 継続を `Arc<dyn Fn>` で表す（何度でも clone して共有できる）
//! - `BoxFuture<'static, _>` にすることで合成済みパイプラインを保存・再利用できる

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::domain::{CancellationToken, MediatorError, Notification, Request};

/// A composed request pipeline (or any step of one).
pub type RequestFn<R> = Arc<
    dyn Fn(
            R,
            CancellationToken,
        ) -> BoxFuture<'static, Result<<R as Request>::Response, MediatorError>>
        + Send
        + Sync,
>;

/// A composed notification pipeline for one handler.
pub type NotificationFn<N> =
    Arc<dyn Fn(N, CancellationToken) -> BoxFuture<'static, Result<(), MediatorError>> + Send + Sync>;

/// Continuation handed to a [`PipelineBehavior`]: everything nested inside it.
pub struct Next<R: Request> {
    step: RequestFn<R>,
}

impl<R: Request> Next<R> {
    pub(crate) fn new(step: RequestFn<R>) -> Self {
        Self { step }
    }

    pub fn run(
        self,
        request: R,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, Result<R::Response, MediatorError>> {
        (self.step)(request, cancel)
    }
}

/// Continuation handed to a [`NotificationBehavior`].
pub struct NotificationNext<N: Notification> {
    step: NotificationFn<N>,
}

impl<N: Notification> NotificationNext<N> {
    pub(crate) fn new(step: NotificationFn<N>) -> Self {
        Self { step }
    }

    pub fn run(
        self,
        notification: N,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, Result<(), MediatorError>> {
        (self.step)(notification, cancel)
    }
}

/// PipelineBehavior は Request パイプラインの 1 段
///
/// # 使用例
/// ```ignore
/// struct Timing;
///
/// #[async_trait]
/// impl<R: Request> PipelineBehavior<R> for Timing {
///     async fn handle(&self, request: R, next: Next<R>, cancel: CancellationToken)
///         -> Result<R::Response, MediatorError>
///     {
///         let started = Instant::now();
///         let response = next.run(request, cancel).await;
///         println!("took {:?}", started.elapsed());
///         response
///     }
/// }
/// ```
#[async_trait]
pub trait PipelineBehavior<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        next: Next<R>,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError>;
}

/// NotificationBehavior は Notification ハンドラ 1 つ分のパイプラインの 1 段
#[async_trait]
pub trait NotificationBehavior<N: Notification>: Send + Sync {
    async fn handle(
        &self,
        notification: N,
        next: NotificationNext<N>,
        cancel: CancellationToken,
    ) -> Result<(), MediatorError>;
}
