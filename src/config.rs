use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub max_file_size: usize,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let max_file_size = match std::env::var("MAX_FILE_SIZE") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_FILE_SIZE: {}", e))?,
            Err(_) => 10 * 1024 * 1024, // 10MB
        };

        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT: {}", e))?,
            Err(_) => 3000,
        };

        Ok(Config {
            max_file_size,
            port,
        })
    }
}
