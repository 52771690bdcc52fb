use std::env;
use std::path::PathBuf;

/// Default rule file, relative to the working directory.
pub const DEFAULT_RULES_PATH: &str = "infix.toml";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

// ── Process settings ──────────────────────────────────────────

/// Process-level settings resolved from the environment.
///
/// Command-line flags take precedence over these values; see the
/// `infix-rules` binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Rule file to load (`INFIX_CONFIG`).
    pub rules_path: PathBuf,
    /// `tracing` env-filter directive (`INFIX_LOG`).
    pub log_filter: String,
}

impl Settings {
    /// Build settings from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            rules_path: PathBuf::from(env_or("INFIX_CONFIG", DEFAULT_RULES_PATH)),
            log_filter: env_or("INFIX_LOG", "info"),
        }
    }

    /// Log the resolved settings at startup.
    pub fn log_summary(&self) {
        tracing::info!(
            rules_path = %self.rules_path.display(),
            log_filter = %self.log_filter,
            "settings loaded"
        );
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from(DEFAULT_RULES_PATH),
            log_filter: "info".to_string(),
        }
    }
}
