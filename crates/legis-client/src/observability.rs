use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "legis-client.logs.jsonl";

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn observability_enabled(lookup: impl Fn(&str) -> Option<String>) -> bool {
    match lookup("LEGIS_OBSERVABILITY_ENABLED") {
        Some(value) => parse_bool_env(&value).unwrap_or(true),
        None => true,
    }
}

fn resolve_env_filter() -> tracing_subscriber::EnvFilter {
    if let Ok(level) = std::env::var("LEGIS_LOG_LEVEL")
        && let Ok(filter) = tracing_subscriber::EnvFilter::try_new(level)
    {
        return filter;
    }
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

fn split_log_path(path: &std::path::Path) -> (std::path::PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file_name)
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `LEGIS_OBSERVABILITY_ENABLED`: optional enable/disable flag (default enabled).
/// - `LEGIS_LOG_LEVEL`: optional level/filter override (`info`, `legis_client=debug`, etc.).
/// - `LEGIS_JSON_LOG_PATH`: optional log file path. If set, logs are JSONL in that file.
///   If unset, logs are emitted to stdout in a compact console format.
/// - `RUST_LOG`: fallback filter when `LEGIS_LOG_LEVEL` is unset.
///
/// Later calls, and calls after another global subscriber was installed, are no-ops.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !observability_enabled(|key| std::env::var(key).ok()) {
            return;
        }

        let env_filter = resolve_env_filter();
        if let Ok(path_raw) = std::env::var("LEGIS_JSON_LOG_PATH") {
            let (dir, file_name) = split_log_path(std::path::Path::new(&path_raw));
            let _ = std::fs::create_dir_all(&dir);
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stdout);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_flags_accept_common_spellings() {
        for value in ["1", "true", " YES ", "on", "Enabled"] {
            assert_eq!(parse_bool_env(value), Some(true), "{value}");
        }
        for value in ["0", "false", "No", "off", "disabled"] {
            assert_eq!(parse_bool_env(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool_env("maybe"), None);
    }

    #[test]
    fn observability_defaults_to_enabled() {
        assert!(observability_enabled(|_| None));
        assert!(observability_enabled(|_| Some("garbage".into())));
        assert!(!observability_enabled(|_| Some("off".into())));
    }

    #[test]
    fn log_path_splits_into_dir_and_file() {
        let (dir, file) = split_log_path(std::path::Path::new("logs/legis.jsonl"));
        assert_eq!(dir, std::path::PathBuf::from("logs"));
        assert_eq!(file, "legis.jsonl");

        let (dir, file) = split_log_path(std::path::Path::new("bare.jsonl"));
        assert_eq!(dir, std::path::PathBuf::from("."));
        assert_eq!(file, "bare.jsonl");
    }
}
