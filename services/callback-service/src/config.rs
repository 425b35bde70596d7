use std::path::PathBuf;

use callback_common::{env_or, env_string};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_PATH: &str = "data/callbacks.json";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Shared secret for protected routes; `None` disables the check.
    pub auth_token: Option<String>,
    pub store_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", DEFAULT_PORT),
            auth_token: env_string("AUTH_TOKEN"),
            store_path: env_string("CALLBACK_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
        }
    }
}
