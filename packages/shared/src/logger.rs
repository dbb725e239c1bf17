//! Logging setup utilities for Collabix binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the given crate targets.
///
/// Every target gets the same level, e.g. `collabix_client=info,collabix=info`.
pub fn default_filter(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level applies to every crate listed in `targets` and can be overridden
/// with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `targets` - Crate or binary names to enable (e.g. `["collabix-client", "collabix"]`)
/// * `default_log_level` - The default log level (e.g. "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use collabix_shared::logger::setup_logger;
///
/// setup_logger(&["collabix-client", env!("CARGO_PKG_NAME")], "info");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_joins_targets() {
        // テスト項目: 複数のターゲットが同じレベルでカンマ区切りに連結される
        // given (前提条件):
        let targets = ["collabix-client", "collabix"];

        // when (操作):
        let filter = default_filter(&targets, "debug");

        // then (期待する結果):
        assert_eq!(filter, "collabix_client=debug,collabix=debug");
    }

    #[test]
    fn test_default_filter_with_no_targets() {
        // テスト項目: ターゲットが空の場合は空文字列になる
        // given (前提条件):
        let targets: [&str; 0] = [];

        // when (操作):
        let filter = default_filter(&targets, "info");

        // then (期待する結果):
        assert!(filter.is_empty());
    }
}
