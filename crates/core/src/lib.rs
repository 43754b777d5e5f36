pub mod client;
pub mod dashboard;
pub mod domain;
pub mod form;
pub mod present;
pub mod report;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_HISTORY_LIMIT: usize = 20;
    pub const MAX_HISTORY_LIMIT: usize = 1000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub api_timeout_secs: u64,
        pub history_limit: usize,
        pub report_dir: PathBuf,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_vars(|key| std::env::var(key).ok())
        }

        pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

            let api_timeout_secs = match var("API_TIMEOUT_SECS") {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("API_TIMEOUT_SECS must be a whole number of seconds, got {v:?}"))?,
                None => DEFAULT_API_TIMEOUT_SECS,
            };

            let history_limit = match var("HISTORY_LIMIT") {
                Some(v) => v
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("HISTORY_LIMIT must be a positive integer, got {v:?}"))?,
                None => DEFAULT_HISTORY_LIMIT,
            };
            validate_history_limit(history_limit)?;

            Ok(Self {
                api_base_url: var("API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                api_timeout_secs,
                history_limit,
                report_dir: var("REPORT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
                sentry_dsn: var("SENTRY_DSN"),
            })
        }
    }

    pub fn validate_history_limit(limit: usize) -> anyhow::Result<usize> {
        anyhow::ensure!(
            (1..=MAX_HISTORY_LIMIT).contains(&limit),
            "history limit must be between 1 and {MAX_HISTORY_LIMIT}, got {limit}"
        );
        Ok(limit)
    }

}
