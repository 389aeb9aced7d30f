use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,

    /// Single base address of the salary backend, e.g. `https://salarygen.example.com`.
    /// Every view resolves its endpoints against this value.
    pub api_base_url: String,

    // Local storage (session + theme)
    pub storage_path: PathBuf,
    pub log_dir: String,

    // Payslip header
    pub company_name: String,
    pub logo_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL").context("API_BASE_URL must be set")?;
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            bail!("API_BASE_URL must be an http(s) address, got {api_base_url:?}");
        }

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:5173".to_string()),
            api_base_url,
            storage_path: lookup("STORAGE_PATH")
                .unwrap_or_else(|| "storage/local_storage.json".to_string())
                .into(),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            company_name: lookup("COMPANY_NAME")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "SalaryGen".to_string()),
            logo_path: lookup("LOGO_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
