//! Handler traits - Request / Notification を処理する側の定義
//!
//! # 学習ポイント
//! - ジェネリック trait (RequestHandler<R>)
//! - 関連型 (`R::Response`) による戻り値型の静的保証
//! - クロージャを trait 実装に包む型消去パターン (FnRequestHandler<R, F>)

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::domain::{CancellationToken, MediatorError, Notification, Request};

/// RequestHandler は Request を 1 つの Response に変換する
///
/// # 使用例
/// ```ignore
/// struct EchoHandler;
///
/// #[async_trait]
/// impl RequestHandler<Echo> for EchoHandler {
///     async fn handle(&self, request: Echo, _cancel: CancellationToken) -> Result<String, MediatorError> {
///         Ok(request.payload)
///     }
/// }
/// ```
///
/// # ジェネリクスによる型安全性
/// - `RequestHandler<Echo>` は `Echo` しか受け取れない
/// - 戻り値は `Echo::Response` に固定される
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError>;
}

/// NotificationHandler は Notification に反応する（戻り値なし）
///
/// 同じ Notification 型に対して何個でも登録できます。
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync {
    async fn handle(&self, notification: N, cancel: CancellationToken)
    -> Result<(), MediatorError>;
}

/// Adapts an async closure into a [`RequestHandler`].
pub struct FnRequestHandler<R, F> {
    f: F,
    _marker: PhantomData<fn(R)>,
}

impl<R: Request, F> FnRequestHandler<R, F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(R, CancellationToken) -> Fut,
        Fut: Future<Output = Result<R::Response, MediatorError>>,
    {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<R, F, Fut> RequestHandler<R> for FnRequestHandler<R, F>
where
    R: Request,
    F: Fn(R, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R::Response, MediatorError>> + Send + 'static,
{
    async fn handle(
        &self,
        request: R,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        (self.f)(request, cancel).await
    }
}

/// Adapts an async closure into a [`NotificationHandler`].
pub struct FnNotificationHandler<N, F> {
    f: F,
    _marker: PhantomData<fn(N)>,
}

impl<N: Notification, F> FnNotificationHandler<N, F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(N, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), MediatorError>>,
    {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<N, F, Fut> NotificationHandler<N> for FnNotificationHandler<N, F>
where
    N: Notification,
    F: Fn(N, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), MediatorError>> + Send + 'static,
{
    async fn handle(
        &self,
        notification: N,
        cancel: CancellationToken,
    ) -> Result<(), MediatorError> {
        (self.f)(notification, cancel).await
    }
}
