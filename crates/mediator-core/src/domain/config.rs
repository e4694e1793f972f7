//! MediatorConfig - Mediator 構築時に読む設定
//!
//! # 設定項目
//! - `dispatch_strategy`: Notification の配送方式（既定: Parallel）
//! - `use_error_behavior`: ErrorBehavior を最外殻に挿入するか（既定: true）
//! - `lifetime`: ServiceRegistry の factory 登録で使う既定ライフタイム（既定: Transient）
//!
//! JSON から読み込めます。省略した項目は既定値になります。
//! ```json
//! { "dispatch_strategy": "sequential", "use_error_behavior": false }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::MediatorError;

/// How notification handlers are driven. Requests always have a single handler
/// and ignore this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStrategy {
    /// All handlers run concurrently; publish completes once every one settled.
    #[default]
    Parallel,
    /// Handlers run one at a time in resolution order; the first failure stops the rest.
    Sequential,
}

impl FromStr for DispatchStrategy {
    type Err = MediatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(Self::Parallel),
            "sequential" => Ok(Self::Sequential),
            other => Err(MediatorError::Config(format!(
                "unknown dispatch strategy '{other}' (expected 'parallel' or 'sequential')"
            ))),
        }
    }
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => f.write_str("parallel"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// Instance lifetime of a registered service.
///
/// Owned by the resolver; the mediator never relies on instance identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    Singleton,
    Scoped,
    #[default]
    Transient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    pub dispatch_strategy: DispatchStrategy,
    pub use_error_behavior: bool,
    pub lifetime: Lifetime,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            dispatch_strategy: DispatchStrategy::Parallel,
            use_error_behavior: true,
            lifetime: Lifetime::Transient,
        }
    }
}

impl MediatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, MediatorError> {
        serde_json::from_str(json).map_err(|e| MediatorError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MediatorError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| MediatorError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn with_dispatch_strategy(mut self, strategy: DispatchStrategy) -> Self {
        self.dispatch_strategy = strategy;
        self
    }

    pub fn with_error_behavior(mut self, enabled: bool) -> Self {
        self.use_error_behavior = enabled;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MediatorConfig::default();
        assert_eq!(config.dispatch_strategy, DispatchStrategy::Parallel);
        assert!(config.use_error_behavior);
        assert_eq!(config.lifetime, Lifetime::Transient);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MediatorConfig::from_json_str(r#"{ "dispatch_strategy": "sequential" }"#)
            .unwrap();
        assert_eq!(config.dispatch_strategy, DispatchStrategy::Sequential);
        assert!(config.use_error_behavior);
        assert_eq!(config.lifetime, Lifetime::Transient);
    }

    #[test]
    fn full_json_overrides_everything() {
        let config = MediatorConfig::from_json_str(
            r#"{ "dispatch_strategy": "parallel", "use_error_behavior": false, "lifetime": "scoped" }"#,
        )
        .unwrap();
        assert!(!config.use_error_behavior);
        assert_eq!(config.lifetime, Lifetime::Scoped);
    }

    #[test]
    fn unknown_strategy_is_a_config_error() {
        let err = MediatorConfig::from_json_str(r#"{ "dispatch_strategy": "random" }"#)
            .unwrap_err();
        assert!(matches!(err, MediatorError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = MediatorConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MediatorError::Config(msg) if msg.contains("not/here.json")));
    }

    #[rstest]
    #[case("parallel", DispatchStrategy::Parallel)]
    #[case("Sequential", DispatchStrategy::Sequential)]
    #[case("  SEQUENTIAL ", DispatchStrategy::Sequential)]
    fn parses_strategy_names(#[case] input: &str, #[case] expected: DispatchStrategy) {
        assert_eq!(input.parse::<DispatchStrategy>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_strategy_name() {
        assert!("fastest".parse::<DispatchStrategy>().is_err());
    }
}
