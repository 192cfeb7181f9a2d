use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const APP_DIR: &str = "lafe_score";
const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Local,
}

impl BackendMode {
    pub fn label(self) -> &'static str {
        match self {
            BackendMode::Remote => "API",
            BackendMode::Local => "OFFLINE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub backend: BackendMode,
    pub max_score: u32,
    pub scores_poll: Duration,
    pub cache_db: Option<PathBuf>,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            backend: BackendMode::Remote,
            max_score: 999,
            scores_poll: Duration::from_secs(5),
            cache_db: None,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_url = opt_env("SCORE_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let backend = match opt_env("SCORE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "local" | "offline" => BackendMode::Local,
            _ => BackendMode::Remote,
        };
        let max_score = env::var("SCORE_MAX")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(defaults.max_score)
            .max(1);
        let poll_secs = env::var("SCORES_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(5)
            .max(1);
        let timeout_secs = env::var("SCORE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(10)
            .max(1);
        Self {
            api_url,
            backend,
            max_score,
            scores_poll: Duration::from_secs(poll_secs),
            cache_db: opt_env("SCORE_CACHE_DB").map(PathBuf::from),
            http_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn cache_db_path(&self) -> Option<PathBuf> {
        self.cache_db
            .clone()
            .or_else(|| app_cache_dir().map(|dir| dir.join("sections.sqlite")))
    }
}

/// `.env.local` wins over `.env`; missing files are fine.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Some(base) = opt_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = opt_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}
