//! Errors - エラー型と分類
//!
//! ディスパッチで起こりうる失敗を 1 つの enum にまとめます。
//!
//! # 分類
//! - Configuration: ハンドラ未登録・設定不正（呼び出し側では回復できない）
//! - Cancellation: キャンセル信号（通常の失敗とは区別する）
//! - Failure: ハンドラ / behavior が返した失敗

use thiserror::Error;

/// Boxed error accepted from handler and behavior authors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// ErrorKind は MediatorError の運用分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Cancellation,
    Failure,
}

#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("no handler registered for request {request} (response {response})")]
    HandlerNotFound {
        request: &'static str,
        response: &'static str,
    },

    #[error("dispatch cancelled")]
    Cancelled,

    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    #[error("{} notification handler(s) failed: {}", .0.len(), join_messages(.0))]
    Aggregate(Vec<MediatorError>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl MediatorError {
    /// Wrap any error raised inside a handler or behavior.
    pub fn failed<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Handler(error.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HandlerNotFound { .. } | Self::Config(_) | Self::Registry(_) => {
                ErrorKind::Configuration
            }
            Self::Cancelled => ErrorKind::Cancellation,
            Self::Aggregate(_) if self.is_cancelled() => ErrorKind::Cancellation,
            Self::Handler(_) | Self::Aggregate(_) => ErrorKind::Failure,
        }
    }

    /// True for `Cancelled`, and for an aggregate made only of cancellations.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Aggregate(errors) => {
                !errors.is_empty() && errors.iter().all(MediatorError::is_cancelled)
            }
            _ => false,
        }
    }
}

fn join_messages(errors: &[MediatorError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// RegistryError は ServiceRegistry への登録エラー
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a request handler for '{0}' is already registered")]
    DuplicateRequestHandler(&'static str),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct DiskOnFire;

    #[rstest]
    #[case(MediatorError::Cancelled, ErrorKind::Cancellation)]
    #[case(MediatorError::Config("bad".into()), ErrorKind::Configuration)]
    #[case(MediatorError::failed(DiskOnFire), ErrorKind::Failure)]
    #[case(
        MediatorError::HandlerNotFound { request: "Ping", response: "Unit" },
        ErrorKind::Configuration
    )]
    #[case(
        MediatorError::Aggregate(vec![MediatorError::Cancelled, MediatorError::Cancelled]),
        ErrorKind::Cancellation
    )]
    #[case(
        MediatorError::Aggregate(vec![MediatorError::Cancelled, MediatorError::failed(DiskOnFire)]),
        ErrorKind::Failure
    )]
    fn classifies_errors(#[case] error: MediatorError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn handler_not_found_names_both_types() {
        let err = MediatorError::HandlerNotFound {
            request: "app::Echo",
            response: "alloc::string::String",
        };
        let msg = err.to_string();
        assert!(msg.contains("app::Echo"));
        assert!(msg.contains("alloc::string::String"));
    }

    #[test]
    fn handler_failure_keeps_source() {
        let err = MediatorError::failed(DiskOnFire);
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<DiskOnFire>().is_some());
    }

    #[test]
    fn aggregate_lists_every_failure() {
        let err = MediatorError::Aggregate(vec![
            MediatorError::failed(DiskOnFire),
            MediatorError::Cancelled,
        ]);
        assert_eq!(
            err.to_string(),
            "2 notification handler(s) failed: handler failed: disk on fire; dispatch cancelled"
        );
    }
}
