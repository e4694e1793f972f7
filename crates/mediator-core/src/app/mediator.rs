//! Mediator - send / publish のファサード
//!
//! # フロー
//! ```text
//! send(request)
//!   → DispatchCache（ヒット: そのまま / ミス: Resolver で解決 → compose → 挿入）
//!   → 合成済みパイプライン（ErrorBehavior → 登録 behavior → ハンドラ）
//!   → Response
//!
//! publish(notification)
//!   → DispatchCache（Notification 型ごとのハンドラ別パイプライン一覧）
//!   → fan_out（Parallel / Sequential）
//! ```
//!
//! キャッシュは Mediator インスタンスが所有します。プロセス全体で共有する
//! グローバル状態はありません。
//!
//! # 学習ポイント
//! - ジェネリックメソッドを持つ async trait（Sender / Publisher）
//! - `tracing::Instrument` で 1 ディスパッチを 1 span にまとめる

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use super::publish::fan_out;
use crate::domain::{
    CancellationToken, DispatchId, MediatorConfig, MediatorError, Notification, Request, Unit,
    type_name_of,
};
use crate::impls::{ErrorBehavior, ErrorObserver, TracingErrorObserver};
use crate::pipeline::{DispatchCache, compose_notification, compose_request};
use crate::ports::{Resolver, ResolverExt};
use crate::typed::{
    NotificationBehavior, NotificationFn, NotificationHandler, PipelineBehavior, RequestFn,
    RequestHandler,
};

/// Sender は Request を唯一のハンドラに届けて Response を受け取る
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send<R: Request>(
        &self,
        request: R,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError>;

    /// `send` for requests without a meaningful response.
    async fn send_unit<R>(&self, request: R, cancel: CancellationToken) -> Result<Unit, MediatorError>
    where
        R: Request<Response = Unit>,
    {
        self.send(request, cancel).await
    }
}

/// Publisher は Notification を登録済みの全ハンドラに配る
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish<N: Notification>(
        &self,
        notification: N,
        cancel: CancellationToken,
    ) -> Result<(), MediatorError>;
}

pub struct Mediator {
    resolver: Arc<dyn Resolver>,
    config: MediatorConfig,
    cache: DispatchCache,
    error_observer: Arc<dyn ErrorObserver>,
}

impl Mediator {
    pub fn new(resolver: Arc<dyn Resolver>, config: MediatorConfig) -> Self {
        Self {
            resolver,
            config,
            cache: DispatchCache::new(),
            error_observer: Arc::new(TracingErrorObserver),
        }
    }

    /// Replace the observer used by the error behavior.
    ///
    /// Only affects pipelines built afterwards.
    pub fn with_observer(mut self, observer: Arc<dyn ErrorObserver>) -> Self {
        self.error_observer = observer;
        self
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &DispatchCache {
        &self.cache
    }

    /// Build and cache the pipeline for `R` ahead of the first `send`.
    pub fn warm_request<R: Request>(&self) -> Result<(), MediatorError> {
        self.request_pipeline::<R>().map(|_| ())
    }

    /// Build and cache the handler pipelines for `N`. Returns how many there are.
    pub fn warm_notification<N: Notification>(&self) -> usize {
        self.notification_pipelines::<N>().len()
    }

    /// Add a handler for `N` at runtime, wrapped in the registered notification behaviors.
    pub fn subscribe<N, H>(&self, handler: H)
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let pipeline = compose_notification::<N>(Arc::new(handler), self.notification_behaviors::<N>());
        self.cache
            .accumulate_notification::<N, _>(|| self.build_notification_pipelines::<N>(), pipeline);
        tracing::debug!(notification = type_name_of::<N>(), "handler subscribed");
    }

    fn request_pipeline<R: Request>(&self) -> Result<RequestFn<R>, MediatorError> {
        self.cache
            .get_or_build_request::<R, _>(|| self.build_request_pipeline::<R>())
    }

    fn build_request_pipeline<R: Request>(&self) -> Result<RequestFn<R>, MediatorError> {
        let handler = self
            .resolver
            .resolve_one::<dyn RequestHandler<R>>()
            .ok_or_else(|| MediatorError::HandlerNotFound {
                request: type_name_of::<R>(),
                response: type_name_of::<R::Response>(),
            })?;

        let mut behaviors: Vec<Arc<dyn PipelineBehavior<R>>> = Vec::new();
        if self.config.use_error_behavior {
            behaviors.push(Arc::new(ErrorBehavior::new(Arc::clone(&self.error_observer))));
        }
        behaviors.extend(
            self.resolver
                .resolve_many::<dyn PipelineBehavior<R>>()
                .unwrap_or_default(),
        );

        Ok(compose_request(handler, behaviors))
    }

    fn notification_pipelines<N: Notification>(&self) -> Vec<NotificationFn<N>> {
        self.cache
            .get_or_build_notification::<N, _>(|| self.build_notification_pipelines::<N>())
    }

    fn notification_behaviors<N: Notification>(&self) -> Vec<Arc<dyn NotificationBehavior<N>>> {
        self.resolver
            .resolve_many::<dyn NotificationBehavior<N>>()
            .unwrap_or_default()
    }

    fn build_notification_pipelines<N: Notification>(&self) -> Vec<NotificationFn<N>> {
        let handlers = self
            .resolver
            .resolve_many::<dyn NotificationHandler<N>>()
            .unwrap_or_default();
        if handlers.is_empty() {
            return Vec::new();
        }

        let behaviors = self.notification_behaviors::<N>();
        handlers
            .into_iter()
            .map(|handler| compose_notification(handler, behaviors.clone()))
            .collect()
    }
}

#[async_trait]
impl Sender for Mediator {
    async fn send<R: Request>(
        &self,
        request: R,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        let span = tracing::debug_span!(
            "send",
            request = type_name_of::<R>(),
            dispatch_id = %DispatchId::new()
        );
        async move {
            let pipeline = self.request_pipeline::<R>()?;
            pipeline(request, cancel).await
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl Publisher for Mediator {
    async fn publish<N: Notification>(
        &self,
        notification: N,
        cancel: CancellationToken,
    ) -> Result<(), MediatorError> {
        let span = tracing::debug_span!(
            "publish",
            notification = type_name_of::<N>(),
            dispatch_id = %DispatchId::new(),
            strategy = %self.config.dispatch_strategy
        );
        async move {
            let pipelines = self.notification_pipelines::<N>();
            tracing::trace!(handlers = pipelines.len(), "fanning out");
            fan_out(self.config.dispatch_strategy, pipelines, notification, cancel).await
        }
        .instrument(span)
        .await
    }
}
