//! Cancellation - パイプライン全体に通すキャンセル信号
//!
//! `tokio::sync::watch` の bool チャネルで実装します。
//! - `CancellationSource` が送信側（cancel() で true を流す）
//! - `CancellationToken` が受信側（clone してハンドラ・behavior に渡す）
//!
//! Mediator 自身がトークンを確認するのは Sequential な publish の
//! ハンドラ間だけです。それ以外は実行中のハンドラ / behavior の責務です。

use tokio::sync::watch;

use super::errors::MediatorError;

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        // send_replace succeeds even when no token is alive
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    /// A token that never fires.
    pub fn none() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// `Err(MediatorError::Cancelled)` once the signal fired.
    pub fn check(&self) -> Result<(), MediatorError> {
        if self.is_cancelled() {
            Err(MediatorError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves when the signal fires. Pends forever if the source was dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::none()
    }
}
