#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_STORAGE_DIR: &str = ".tagvote";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ServerConfig {
    pub(crate) storage_dir: PathBuf,
    pub(crate) busy_timeout: Duration,
    pub(crate) log_json: bool,
}

impl ServerConfig {
    pub(crate) fn from_env() -> Self {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Flags win over environment variables, which win over defaults.
    pub(crate) fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let storage_dir = flag_value(args, "--storage-dir")
            .or_else(|| env("TAGVOTE_STORAGE_DIR"))
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let busy_timeout_ms = flag_value(args, "--busy-timeout-ms")
            .or_else(|| env("TAGVOTE_BUSY_TIMEOUT_MS"))
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);

        let log_json = args.iter().any(|arg| arg.as_str() == "--log-json")
            || env("TAGVOTE_LOG_JSON").is_some_and(|value| parse_bool(&value));

        Self {
            storage_dir,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
            log_json,
        }
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let mut iter = args.iter();
    let mut found = None;
    while let Some(arg) = iter.next() {
        if arg.as_str() == flag
            && let Some(value) = iter.next()
        {
            found = Some(value.clone());
        }
    }
    found
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
