//! Runtime configuration read from the environment (and `.env` if present).

use std::time::Duration;

use anyhow::{bail, Context};

use crate::error::Error;

pub const DEFAULT_CENSUS_URL: &str = "https://api.census.gov/data/2019/pep/population";
pub const DEFAULT_STATE_FIPS: &str = "06";
pub const DEFAULT_CASES_URL: &str = "https://data.ca.gov/api/3/action/datastore_search_sql";
pub const DEFAULT_CASES_RESOURCE: &str = "926fd08f-cc91-4828-af38-bd45de97f8c3";
pub const DEFAULT_WINDOW_DAYS: i64 = 14;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub census_url: String,
    pub state_fips: String,
    pub census_key: Option<String>,
    pub cases_url: String,
    pub cases_resource: String,
    pub window_days: i64,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            census_url: DEFAULT_CENSUS_URL.to_string(),
            state_fips: DEFAULT_STATE_FIPS.to_string(),
            census_key: None,
            cases_url: DEFAULT_CASES_URL.to_string(),
            cases_resource: DEFAULT_CASES_RESOURCE.to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Config::default();

        if let Some(url) = read("COVID_RISK_CENSUS_URL") {
            config.census_url = url;
        }
        if let Some(fips) = read("COVID_RISK_STATE_FIPS") {
            config.state_fips = fips;
        }
        config.census_key = read("COVID_RISK_CENSUS_KEY");
        if let Some(url) = read("COVID_RISK_CASES_URL") {
            config.cases_url = url;
        }
        if let Some(resource) = read("COVID_RISK_CASES_RESOURCE") {
            config.cases_resource = resource;
        }
        if let Some(raw) = read("COVID_RISK_WINDOW_DAYS") {
            config.window_days = parse_positive(&raw, "COVID_RISK_WINDOW_DAYS")? as i64;
        }
        if let Some(raw) = read("COVID_RISK_HTTP_TIMEOUT_SECS") {
            let secs = parse_positive(&raw, "COVID_RISK_HTTP_TIMEOUT_SECS")?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn http_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .user_agent(concat!("covid-gathering-risk/", env!("CARGO_PKG_VERSION")))
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| Error::DataSource(format!("failed to build HTTP client: {e}")))
    }
}

fn parse_positive(raw: &str, name: &str) -> anyhow::Result<u64> {
    let value = raw
        .parse::<u64>()
        .with_context(|| format!("{name} must be a positive integer"))?;
    if value == 0 {
        bail!("{name} must be > 0");
    }
    Ok(value)
}
