use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_BITQUERY_ENDPOINT: &str = "https://streaming.bitquery.io/graphql";
pub const DEFAULT_TOKENS: &[&str] = &["ETH", "USDT", "USDC", "WBTC", "DAI"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Where live transactions come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Bitquery {
        endpoint: String,
        api_key: String,
        network: String,
        min_amount: f64,
        limit: u32,
    },
    Rest {
        url: String,
    },
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrdering {
    /// Keep whatever order the provider returned.
    Source,
    AmountDesc,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Live data
    pub source: SourceConfig,
    pub request_timeout: Duration,

    // Refresh loop
    pub refresh_interval: Duration,
    pub ordering: RecordOrdering,

    // Token selector
    pub tokens: Vec<String>,
    pub default_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Self::parse_environment(var("ENVIRONMENT"))?;

        let source = if let Some(api_key) = var("BITQUERY_API_KEY") {
            SourceConfig::Bitquery {
                endpoint: var("BITQUERY_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_BITQUERY_ENDPOINT.to_string()),
                api_key,
                network: var("BITQUERY_NETWORK").unwrap_or_else(|| "eth".to_string()),
                min_amount: var("WHALE_MIN_AMOUNT")
                    .unwrap_or_else(|| "100".to_string())
                    .parse()
                    .context("Invalid WHALE_MIN_AMOUNT")?,
                limit: var("WHALE_RESULT_LIMIT")
                    .unwrap_or_else(|| "20".to_string())
                    .parse()
                    .context("Invalid WHALE_RESULT_LIMIT")?,
            }
        } else if let Some(url) = var("WHALE_API_URL") {
            SourceConfig::Rest { url }
        } else {
            SourceConfig::Offline
        };

        // GraphQL results are ranked by amount; REST keeps provider order
        let sort_default = matches!(source, SourceConfig::Bitquery { .. });
        let sort_by_amount = match var("SORT_BY_AMOUNT") {
            Some(raw) => parse_bool(&raw).context("Invalid SORT_BY_AMOUNT")?,
            None => sort_default,
        };

        let tokens: Vec<String> = match var("WATCH_TOKENS") {
            Some(raw) => raw
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
            None => DEFAULT_TOKENS.iter().map(|t| t.to_string()).collect(),
        };

        let config = Self {
            environment,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            source,
            request_timeout: Duration::from_secs(
                var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse()
                    .context("Invalid REQUEST_TIMEOUT_SECS")?,
            ),

            refresh_interval: Duration::from_secs(
                var("REFRESH_INTERVAL_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("Invalid REFRESH_INTERVAL_SECS")?,
            ),
            ordering: if sort_by_amount {
                RecordOrdering::AmountDesc
            } else {
                RecordOrdering::Source
            },

            tokens,
            default_token: var("DEFAULT_TOKEN").map(|t| t.trim().to_uppercase()),
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(raw: Option<String>) -> Result<Environment> {
        let env = raw.unwrap_or_else(|| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn validate(&self) -> Result<()> {
        match &self.source {
            SourceConfig::Bitquery {
                endpoint,
                network,
                min_amount,
                limit,
                ..
            } => {
                if !endpoint.starts_with("http") {
                    bail!("BITQUERY_ENDPOINT must be HTTP(S) URL");
                }
                // Interpolated into the query text
                if network.is_empty()
                    || !network.chars().all(|c| c.is_ascii_lowercase() || c == '_')
                {
                    bail!("BITQUERY_NETWORK must match [a-z_]+, got {}", network);
                }
                if !min_amount.is_finite() || *min_amount < 0.0 {
                    bail!("WHALE_MIN_AMOUNT must be a finite non-negative number");
                }
                if *limit == 0 {
                    bail!("WHALE_RESULT_LIMIT must be greater than zero");
                }
            }
            SourceConfig::Rest { url } => {
                if !url.starts_with("http") {
                    bail!("WHALE_API_URL must be HTTP(S) URL");
                }
            }
            SourceConfig::Offline => {}
        }

        if self.refresh_interval.is_zero() {
            bail!("REFRESH_INTERVAL_SECS must be greater than zero");
        }

        if self.request_timeout.is_zero() {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        if self.tokens.is_empty() {
            bail!("WATCH_TOKENS must name at least one token");
        }

        if let Some(token) = &self.default_token {
            if !self.tokens.contains(token) {
                bail!("DEFAULT_TOKEN {} is not in WATCH_TOKENS", token);
            }
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {}", other),
    }
}
