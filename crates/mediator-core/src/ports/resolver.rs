//! Resolver port - 外部コンテナとの境界
//!
//! Mediator がコンテナに要求するのは「1 つ取得」と「全件取得」の 2 操作だけです。
//! 登録・ライフタイム管理・破棄はコンテナ側の責務で、Mediator は関知しません。
//!
//! # 二層構造
//! - **内部（Erased）**: `Resolver` trait - object-safe。`ServiceKey`（TypeId）で引き、
//!   `Arc<dyn Any>` に包んだサービスを返す
//! - **表層（Typed）**: `ResolverExt` - `resolve_one::<dyn RequestHandler<R>>()` のように
//!   型で引き、`Arc<T>` にダウンキャストして返す
//!
//! 型消去された値の中身は常に `Arc<T>` です（`T` は `dyn Trait` でもよい）。

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased service instance. Always wraps an `Arc<T>` for the `T` named by its key.
pub type ErasedService = Arc<dyn Any + Send + Sync>;

/// Type tag of a service capability, e.g. `dyn RequestHandler<Echo>`.
#[derive(Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Narrow contract the mediator consumes from a dependency container.
///
/// Implementations own lifetimes. Results of `resolve_many_erased` should follow
/// registration order.
pub trait Resolver: Send + Sync {
    fn resolve_one_erased(&self, key: ServiceKey) -> Option<ErasedService>;

    fn resolve_many_erased(&self, key: ServiceKey) -> Option<Vec<ErasedService>>;
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve_one_erased(&self, key: ServiceKey) -> Option<ErasedService> {
        (**self).resolve_one_erased(key)
    }

    fn resolve_many_erased(&self, key: ServiceKey) -> Option<Vec<ErasedService>> {
        (**self).resolve_many_erased(key)
    }
}

/// Typed resolution on top of [`Resolver`].
pub trait ResolverExt: Resolver {
    fn resolve_one<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_one_erased(ServiceKey::of::<T>())
            .and_then(|service| downcast_service::<Arc<T>>(&service))
    }

    /// All instances for `T`. A service that fails to downcast is skipped.
    fn resolve_many<T>(&self) -> Option<Vec<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_many_erased(ServiceKey::of::<T>()).map(|services| {
            services
                .iter()
                .filter_map(downcast_service::<Arc<T>>)
                .collect()
        })
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// Wrap a typed instance the way [`Resolver`] implementations must return it.
pub fn erase<T>(service: Arc<T>) -> ErasedService
where
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(service)
}

pub(crate) fn downcast_service<T: Clone + 'static>(service: &ErasedService) -> Option<T> {
    let any: &(dyn Any + Send + Sync) = service.as_ref();
    any.downcast_ref::<T>().cloned()
}
