//! MediatorBuilder - Mediator の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use crate::domain::{
    DispatchStrategy, Lifetime, MediatorConfig, Notification, RegistryError, Request, type_name_of,
};
use crate::impls::{ErrorObserver, ServiceRegistry};
use crate::ports::ServiceKey;
use crate::typed::{NotificationBehavior, NotificationHandler, PipelineBehavior, RequestHandler};

use super::mediator::Mediator;

/// MediatorBuilder は ServiceRegistry と設定から Mediator を組み立てる
///
/// # 使用例
/// ```ignore
/// let mediator = MediatorBuilder::new()
///     .register_request_handler::<Echo, _>(EchoHandler)?
///     .register_behavior::<Echo, _>(LoggingBehavior::new())
///     .expect_request::<Echo>()
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_request() で必ず必要な Request 型を宣言する
/// - build() 時に、宣言した全 Request 型にハンドラが登録済みかをチェック
/// - 不足があれば BuildError を返す（最初の send まで待たない）
pub struct MediatorBuilder {
    registry: ServiceRegistry,
    config: MediatorConfig,
    expected: Vec<(ServiceKey, &'static str)>,
    error_observer: Option<Arc<dyn ErrorObserver>>,
}

/// BuildError は Mediator 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing request handlers: {0:?}. These requests were expected but not registered.")]
    MissingHandlers(Vec<&'static str>),
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::from_config(MediatorConfig::default())
    }

    /// Builder with an empty registry whose factory lifetime follows `config`.
    pub fn from_config(config: MediatorConfig) -> Self {
        Self {
            registry: ServiceRegistry::from_config(&config),
            config,
            expected: Vec::new(),
            error_observer: None,
        }
    }

    /// Start from a registry populated elsewhere.
    pub fn with_registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn register_request_handler<R, H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        self.registry.add_request_handler::<R, H>(handler)?;
        Ok(self)
    }

    pub fn register_request_handler_factory<R, H, F>(
        mut self,
        factory: F,
    ) -> Result<Self, RegistryError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.registry
            .add_request_handler_factory::<R, H, F>(factory)?;
        Ok(self)
    }

    pub fn register_notification_handler<N, H>(mut self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        self.registry.add_notification_handler::<N, H>(handler);
        self
    }

    pub fn register_behavior<R, B>(mut self, behavior: B) -> Self
    where
        R: Request,
        B: PipelineBehavior<R> + 'static,
    {
        self.registry.add_behavior::<R, B>(behavior);
        self
    }

    pub fn register_notification_behavior<N, B>(mut self, behavior: B) -> Self
    where
        N: Notification,
        B: NotificationBehavior<N> + 'static,
    {
        self.registry.add_notification_behavior::<N, B>(behavior);
        self
    }

    /// Declare that `R` must have a handler by the time `build()` runs.
    pub fn expect_request<R: Request>(mut self) -> Self {
        self.expected
            .push((ServiceKey::of::<dyn RequestHandler<R>>(), type_name_of::<R>()));
        self
    }

    pub fn dispatch_strategy(mut self, strategy: DispatchStrategy) -> Self {
        self.config.dispatch_strategy = strategy;
        self
    }

    pub fn use_error_behavior(mut self, enabled: bool) -> Self {
        self.config.use_error_behavior = enabled;
        self
    }

    /// Default lifetime for factory registrations made after this call.
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.config.lifetime = lifetime;
        self.registry = self.registry.with_default_lifetime(lifetime);
        self
    }

    pub fn error_observer(mut self, observer: Arc<dyn ErrorObserver>) -> Self {
        self.error_observer = Some(observer);
        self
    }

    /// # 検証
    /// - expect_request() で宣言した Request 型すべてにハンドラがあるかチェック
    /// - 不足があれば BuildError::MissingHandlers を返す
    pub fn build(self) -> Result<Mediator, BuildError> {
        let missing: Vec<&'static str> = self
            .expected
            .iter()
            .filter(|(key, _)| !self.registry.contains(*key))
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingHandlers(missing));
        }

        tracing::debug!(
            strategy = %self.config.dispatch_strategy,
            error_behavior = self.config.use_error_behavior,
            "mediator built"
        );
        let mediator = Mediator::new(Arc::new(self.registry), self.config);
        Ok(match self.error_observer {
            Some(observer) => mediator.with_observer(observer),
            None => mediator,
        })
    }
}

impl Default for MediatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
