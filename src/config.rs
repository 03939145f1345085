use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_file_size: usize,
    pub preset_data_path: PathBuf,
    pub dataset_cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_file_size: default_max_file_size(),
            preset_data_path: PathBuf::from("data/preset-data.csv"),
            dataset_cache_capacity: 64,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let defaults = Config::default();
        Ok(Config {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr)?,
            max_file_size: env_or("MAX_FILE_SIZE", defaults.max_file_size)?,
            preset_data_path: std::env::var("PRESET_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preset_data_path),
            dataset_cache_capacity: env_or("DATASET_CACHE_CAPACITY", defaults.dataset_cache_capacity)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {}={}", key, raw)),
        Err(_) => Ok(default),
    }
}
