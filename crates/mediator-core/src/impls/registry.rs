//! ServiceRegistry - Resolver の参照実装（インメモリ DI コンテナ）
//!
//! # 設計
//! - 初期化時に構築する（mutable）
//! - 実行時は `Arc<ServiceRegistry>` として共有する（immutable）
//!
//! # ライフタイム
//! - Singleton: 最初の解決で生成し、以後同じインスタンス
//! - Transient: 解決のたびに factory を呼ぶ
//! - Scoped: `RegistryScope` ごとに 1 インスタンス。スコープ外で解決した場合は
//!   ルートスコープ扱い（Singleton と同じ）
//!
//! 解決回数を数えているので、テストでキャッシュヒットを観測できます。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::domain::{Lifetime, MediatorConfig, Notification, RegistryError, Request, type_name_of};
use crate::ports::{ErasedService, Resolver, ServiceKey, erase};
use crate::typed::{NotificationBehavior, NotificationHandler, PipelineBehavior, RequestHandler};

type Factory = Arc<dyn Fn() -> ErasedService + Send + Sync>;

struct Registration {
    id: usize,
    lifetime: Lifetime,
    factory: Factory,
    singleton: OnceLock<ErasedService>,
}

impl Registration {
    fn root_instance(&self) -> ErasedService {
        self.singleton.get_or_init(|| (self.factory)()).clone()
    }
}

/// ServiceRegistry はハンドラと behavior を登録・解決する
///
/// # 使用例
/// ```ignore
/// let mut registry = ServiceRegistry::new();
/// registry.add_request_handler::<Echo, _>(EchoHandler)?;
/// registry.add_behavior::<Echo, _>(LoggingBehavior::new());
/// registry.add_notification_handler::<Greeted, _>(AuditHandler);
///
/// let mediator = Mediator::new(Arc::new(registry), MediatorConfig::default());
/// ```
pub struct ServiceRegistry {
    services: HashMap<ServiceKey, Vec<Arc<Registration>>>,
    default_lifetime: Lifetime,
    next_id: usize,
    resolutions: AtomicUsize,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            default_lifetime: Lifetime::Transient,
            next_id: 0,
            resolutions: AtomicUsize::new(0),
        }
    }

    /// Registry whose factory registrations use `config.lifetime`.
    pub fn from_config(config: &MediatorConfig) -> Self {
        Self::new().with_default_lifetime(config.lifetime)
    }

    pub fn with_default_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.default_lifetime = lifetime;
        self
    }

    pub fn default_lifetime(&self) -> Lifetime {
        self.default_lifetime
    }

    fn insert<T>(&mut self, lifetime: Lifetime, factory: impl Fn() -> Arc<T> + Send + Sync + 'static)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let registration = Registration {
            id: self.next_id,
            lifetime,
            factory: Arc::new(move || erase(factory())),
            singleton: OnceLock::new(),
        };
        self.next_id += 1;
        self.services
            .entry(ServiceKey::of::<T>())
            .or_default()
            .push(Arc::new(registration));
    }

    fn ensure_no_request_handler<R: Request>(&self) -> Result<(), RegistryError> {
        if self.is_registered::<dyn RequestHandler<R>>() {
            return Err(RegistryError::DuplicateRequestHandler(type_name_of::<R>()));
        }
        Ok(())
    }

    /// Register the single handler for `R` as a singleton instance.
    pub fn add_request_handler<R, H>(&mut self, handler: H) -> Result<&mut Self, RegistryError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        self.ensure_no_request_handler::<R>()?;
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        self.insert(Lifetime::Singleton, move || Arc::clone(&handler));
        Ok(self)
    }

    /// Register the single handler for `R` through a factory using the default lifetime.
    pub fn add_request_handler_factory<R, H, F>(
        &mut self,
        factory: F,
    ) -> Result<&mut Self, RegistryError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.ensure_no_request_handler::<R>()?;
        let lifetime = self.default_lifetime;
        self.insert(lifetime, move || -> Arc<dyn RequestHandler<R>> { Arc::new(factory()) });
        Ok(self)
    }

    pub fn add_notification_handler<N, H>(&mut self, handler: H) -> &mut Self
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let handler: Arc<dyn NotificationHandler<N>> = Arc::new(handler);
        self.insert(Lifetime::Singleton, move || Arc::clone(&handler));
        self
    }

    pub fn add_notification_handler_factory<N, H, F>(&mut self, factory: F) -> &mut Self
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let lifetime = self.default_lifetime;
        self.insert(lifetime, move || -> Arc<dyn NotificationHandler<N>> {
            Arc::new(factory())
        });
        self
    }

    /// Behaviors run outer-to-inner in registration order.
    pub fn add_behavior<R, B>(&mut self, behavior: B) -> &mut Self
    where
        R: Request,
        B: PipelineBehavior<R> + 'static,
    {
        let behavior: Arc<dyn PipelineBehavior<R>> = Arc::new(behavior);
        self.insert(Lifetime::Singleton, move || Arc::clone(&behavior));
        self
    }

    pub fn add_behavior_factory<R, B, F>(&mut self, factory: F) -> &mut Self
    where
        R: Request,
        B: PipelineBehavior<R> + 'static,
        F: Fn() -> B + Send + Sync + 'static,
    {
        let lifetime = self.default_lifetime;
        self.insert(lifetime, move || -> Arc<dyn PipelineBehavior<R>> {
            Arc::new(factory())
        });
        self
    }

    pub fn add_notification_behavior<N, B>(&mut self, behavior: B) -> &mut Self
    where
        N: Notification,
        B: NotificationBehavior<N> + 'static,
    {
        let behavior: Arc<dyn NotificationBehavior<N>> = Arc::new(behavior);
        self.insert(Lifetime::Singleton, move || Arc::clone(&behavior));
        self
    }

    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.contains(ServiceKey::of::<T>())
    }

    pub fn contains(&self, key: ServiceKey) -> bool {
        self.services.get(&key).is_some_and(|regs| !regs.is_empty())
    }

    /// Number of resolver calls served so far, scopes included.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    /// Open a scope for `Lifetime::Scoped` registrations.
    pub fn scope(self: &Arc<Self>) -> RegistryScope {
        RegistryScope {
            registry: Arc::clone(self),
            instances: Mutex::new(HashMap::new()),
        }
    }

    fn registrations(&self, key: ServiceKey) -> Option<&[Arc<Registration>]> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        self.services.get(&key).map(Vec::as_slice)
    }

    fn instance(&self, registration: &Registration, scope: Option<&RegistryScope>) -> ErasedService {
        match (registration.lifetime, scope) {
            (Lifetime::Transient, _) => (registration.factory)(),
            (Lifetime::Scoped, Some(scope)) => scope
                .instances
                .lock()
                .entry(registration.id)
                .or_insert_with(|| (registration.factory)())
                .clone(),
            (Lifetime::Singleton, _) | (Lifetime::Scoped, None) => registration.root_instance(),
        }
    }

    fn resolve_one_in(&self, key: ServiceKey, scope: Option<&RegistryScope>) -> Option<ErasedService> {
        let registration = self.registrations(key)?.first()?;
        Some(self.instance(registration, scope))
    }

    fn resolve_many_in(
        &self,
        key: ServiceKey,
        scope: Option<&RegistryScope>,
    ) -> Option<Vec<ErasedService>> {
        let registrations = self.registrations(key)?;
        Some(
            registrations
                .iter()
                .map(|registration| self.instance(registration, scope))
                .collect(),
        )
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for ServiceRegistry {
    fn resolve_one_erased(&self, key: ServiceKey) -> Option<ErasedService> {
        self.resolve_one_in(key, None)
    }

    fn resolve_many_erased(&self, key: ServiceKey) -> Option<Vec<ErasedService>> {
        self.resolve_many_in(key, None)
    }
}

/// A resolution scope: `Scoped` registrations yield one instance per scope.
pub struct RegistryScope {
    registry: Arc<ServiceRegistry>,
    instances: Mutex<HashMap<usize, ErasedService>>,
}

impl RegistryScope {
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }
}

impl Resolver for RegistryScope {
    fn resolve_one_erased(&self, key: ServiceKey) -> Option<ErasedService> {
        self.registry.resolve_one_in(key, Some(self))
    }

    fn resolve_many_erased(&self, key: ServiceKey) -> Option<Vec<ErasedService>> {
        self.registry.resolve_many_in(key, Some(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ResolverExt;
    use crate::testing::{
        Echo, EchoHandler, Greeted, Journal, Ping, RecordingBehavior,
        RecordingNotificationHandler,
    };

    #[test]
    fn register_and_resolve_request_handler() {
        let mut registry = ServiceRegistry::new();
        registry
            .add_request_handler::<Echo, _>(EchoHandler::default())
            .unwrap();

        assert!(registry.resolve_one::<dyn RequestHandler<Echo>>().is_some());
        assert!(registry.resolve_one::<dyn RequestHandler<Ping>>().is_none());
        assert!(registry.is_registered::<dyn RequestHandler<Echo>>());
    }

    #[test]
    fn double_request_handler_registration_fails() {
        let mut registry = ServiceRegistry::new();
        registry
            .add_request_handler::<Echo, _>(EchoHandler::default())
            .unwrap();
        let result = registry.add_request_handler_factory::<Echo, _, _>(EchoHandler::default);
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateRequestHandler(name)) if name.contains("Echo")
        ));
    }

    #[test]
    fn resolve_many_keeps_registration_order() {
        let journal = Journal::default();
        let mut registry = ServiceRegistry::new();
        for name in ["first", "second", "third"] {
            registry.add_behavior::<Echo, _>(RecordingBehavior::new(name, journal.clone()));
        }
        let behaviors = registry.resolve_many::<dyn PipelineBehavior<Echo>>().unwrap();
        assert_eq!(behaviors.len(), 3);
        assert!(registry.resolve_many::<dyn PipelineBehavior<Ping>>().is_none());
    }

    #[test]
    fn singleton_instance_is_shared() {
        let mut registry = ServiceRegistry::new();
        registry
            .add_request_handler::<Echo, _>(EchoHandler::default())
            .unwrap();
        let a = registry.resolve_one::<dyn RequestHandler<Echo>>().unwrap();
        let b = registry.resolve_one::<dyn RequestHandler<Echo>>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn transient_factory_runs_per_resolution() {
        let mut registry = ServiceRegistry::new().with_default_lifetime(Lifetime::Transient);
        registry.add_notification_handler_factory::<Greeted, _, _>(|| {
            RecordingNotificationHandler::new("t", Journal::default())
        });
        let a = registry.resolve_many::<dyn NotificationHandler<Greeted>>().unwrap();
        let b = registry.resolve_many::<dyn NotificationHandler<Greeted>>().unwrap();
        assert!(!Arc::ptr_eq(&a[0], &b[0]));
    }

    #[test]
    fn scoped_instance_is_shared_within_a_scope_only() {
        let mut registry = ServiceRegistry::from_config(
            &MediatorConfig::default().with_lifetime(Lifetime::Scoped),
        );
        registry
            .add_request_handler_factory::<Echo, _, _>(EchoHandler::default)
            .unwrap();
        let registry = Arc::new(registry);

        let scope_a = registry.scope();
        let scope_b = registry.scope();
        let a1 = scope_a.resolve_one::<dyn RequestHandler<Echo>>().unwrap();
        let a2 = scope_a.resolve_one::<dyn RequestHandler<Echo>>().unwrap();
        let b1 = scope_b.resolve_one::<dyn RequestHandler<Echo>>().unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b1));
    }

    #[test]
    fn counts_every_resolution() {
        let registry = ServiceRegistry::new();
        assert_eq!(registry.resolutions(), 0);
        let _ = registry.resolve_one::<dyn RequestHandler<Echo>>();
        let _ = registry.resolve_many::<dyn PipelineBehavior<Echo>>();
        assert_eq!(registry.resolutions(), 2);
    }
}
