//! Unit - 「意味のある戻り値がない」ことを表す単一値型
//!
//! `Request<Response = Unit>` とすることで、値を返さないリクエストも
//! 値を返すリクエストと同じジェネリックな経路（キャッシュ・パイプライン）に乗せられます。
//!
//! # 学習ポイント
//! - フィールドを持たない unit struct は derive だけで全順序・等価性を満たす
//! - `From<()>` で Rust 組み込みの `()` と相互変換できる

use std::fmt;

use serde::{Deserialize, Serialize};

/// The single "no response" value.
///
/// Every `Unit` compares equal to every other `Unit`; ordering always yields
/// `Ordering::Equal`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Unit;

impl Unit {
    /// The one and only value.
    pub const VALUE: Unit = Unit;
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("()")
    }
}

impl From<()> for Unit {
    fn from(_: ()) -> Self {
        Unit
    }
}

impl From<Unit> for () {
    fn from(_: Unit) -> Self {}
}
