use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_DB_FILE: &str = "pub_pos.db";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_file: String,
    pub log_dir: PathBuf,
    pub bcrypt_cost: u32,
    remote: Option<RemoteConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Config {
            log_dir: data_dir.join("logs"),
            data_dir,
            db_file: DEFAULT_DB_FILE.to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            remote: None,
        }
    }
}

impl Config {
    /// Read configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let data_dir = non_empty_var("POS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let log_dir = non_empty_var("POS_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));
        let db_file = non_empty_var("POS_DB_FILE").unwrap_or(defaults.db_file);
        let bcrypt_cost = non_empty_var("POS_BCRYPT_COST")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.bcrypt_cost);

        let timeout = non_empty_var("POS_REMOTE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS);
        let remote = match (non_empty_var("POS_REMOTE_URL"), non_empty_var("POS_REMOTE_KEY")) {
            (Some(url), Some(api_key)) => Some(RemoteConfig {
                url,
                api_key,
                timeout: Duration::from_secs(timeout),
            }),
            _ => None,
        };

        Config {
            data_dir,
            db_file,
            log_dir,
            bcrypt_cost,
            remote,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self.log_dir = self.data_dir.join("logs");
        self
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
