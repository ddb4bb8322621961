use std::{env, path::PathBuf, time::Duration};

use lazy_regex::regex_is_match;

use crate::{Error, Result};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_DEDUP_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_REGISTER_PATH: &str = "/auth/register";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub dedup_window: Duration,
    pub request_timeout: Option<Duration>,
    pub session_file: Option<PathBuf>,
    pub login_path: String,
    pub register_path: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            dedup_window: Duration::from_millis(DEFAULT_DEDUP_INTERVAL_MS),
            request_timeout: Some(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)),
            session_file: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            register_path: DEFAULT_REGISTER_PATH.to_string(),
        })
    }

    /// Loads `.env` (if any) and reads the client settings from the environment.
    ///
    /// Only `API_BASE_URL` is required; malformed numeric values fall back to defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::new(&env::var("API_BASE_URL")?)?;

        config.poll_interval = Duration::from_millis(parse_millis(
            env::var("POLL_INTERVAL_MS").ok(),
            DEFAULT_POLL_INTERVAL_MS,
        ));
        config.dedup_window = Duration::from_millis(parse_millis(
            env::var("DEDUP_INTERVAL_MS").ok(),
            DEFAULT_DEDUP_INTERVAL_MS,
        ));
        // 0 disables the timeout.
        config.request_timeout = match parse_millis(
            env::var("REQUEST_TIMEOUT_MS").ok(),
            DEFAULT_REQUEST_TIMEOUT_MS,
        ) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        };
        config.session_file = env::var("SESSION_FILE").ok().map(PathBuf::from);

        if let Ok(path) = env::var("LOGIN_PATH") {
            config.login_path = path;
        }
        if let Ok(path) = env::var("REGISTER_PATH") {
            config.register_path = path;
        }

        Ok(config)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Joins a resource path onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn validate_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');

    if !regex_is_match!(r"^https?://[^\s/]+(/\S*)?$", url) {
        return Err(Error::InvalidBaseUrl {
            url: url.to_string(),
        });
    }

    Ok(url.to_string())
}

fn parse_millis(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
