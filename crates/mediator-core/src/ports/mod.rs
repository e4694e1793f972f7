//! Ports - 抽象化レイヤー
//!
//! Mediator が外部に要求する境界を定義します。
//! いまは依存解決コンテナ（Resolver）のみです。
//! 参照実装は `impls::registry::ServiceRegistry` にあります。

pub mod resolver;

pub use self::resolver::{ErasedService, Resolver, ResolverExt, ServiceKey, erase};
