//! App - アプリケーション層
//!
//! このモジュールは、ports と pipeline を組み合わせて Mediator を実装します。
//!
//! # 主要コンポーネント
//! - **Mediator**: send / publish のファサード（Sender / Publisher を実装）
//! - **MediatorBuilder**: 登録・設定・起動時検証
//! - **publish**: Notification の fan-out（Parallel / Sequential）

pub mod builder;
pub mod mediator;
mod publish;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, MediatorBuilder};
pub use self::mediator::{Mediator, Publisher, Sender};
