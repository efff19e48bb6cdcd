use std::time::Duration;

use error_stack::{ResultExt, report};
use orderbook_models::constants::chains::Network;

use crate::error::{Error, TrackerResult};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_ORDERS_PAGE_SIZE: u32 = 4;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub page_size: u32,
    pub include_pending: bool,
    pub network: Network,
    /// `None` fetches block numbers once; `Some` also re-fetches on this interval
    pub block_numbers_refresh: Option<Duration>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            page_size: DEFAULT_ORDERS_PAGE_SIZE,
            include_pending: false,
            network: Network::Testnet,
            block_numbers_refresh: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub orderbook_url: String,
    pub quote_url: String,
    pub data_url: String,
    pub initiate_url: Option<String>,
    /// Applied to every HTTP request the tracker makes
    pub request_timeout: Duration,
    pub poller: PollerConfig,
}

impl TrackerConfig {
    pub fn from_env() -> TrackerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// HTTP client shared by all collaborators, bounded by `request_timeout`.
    pub fn http_client(&self) -> TrackerResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .change_context(Error::ConfigError("HTTP client".to_string()))
    }

    fn from_lookup<F>(lookup: F) -> TrackerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| report!(Error::ConfigError(format!("{key} is not set"))))
        };

        let network = match lookup("NETWORK") {
            Some(value) => Network::try_from(value.as_str())
                .change_context(Error::ConfigError("NETWORK".to_string()))?,
            None => Network::Testnet,
        };

        let poll_interval = match lookup("POLL_INTERVAL_SECS") {
            Some(value) => Duration::from_secs(parse_positive(&value, "POLL_INTERVAL_SECS")?),
            None => DEFAULT_POLL_INTERVAL,
        };

        let page_size = match lookup("ORDERS_PAGE_SIZE") {
            Some(value) => u32::try_from(parse_positive(&value, "ORDERS_PAGE_SIZE")?)
                .change_context(Error::ConfigError("ORDERS_PAGE_SIZE".to_string()))?,
            None => DEFAULT_ORDERS_PAGE_SIZE,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_positive(&value, "REQUEST_TIMEOUT_SECS")?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let block_numbers_refresh = lookup("BLOCK_NUMBERS_REFRESH_SECS")
            .map(|value| parse_positive(&value, "BLOCK_NUMBERS_REFRESH_SECS"))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            orderbook_url: required("ORDERBOOK_URL")?,
            quote_url: required("QUOTE_URL")?,
            data_url: required("DATA_URL")?,
            initiate_url: lookup("INITIATE_URL").filter(|value| !value.trim().is_empty()),
            request_timeout,
            poller: PollerConfig {
                poll_interval,
                page_size,
                include_pending: false,
                network,
                block_numbers_refresh,
            },
        })
    }
}

fn parse_positive(value: &str, key: &str) -> TrackerResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(report!(Error::ConfigError(key.to_string()))
            .attach_printable(format!("Expected a positive integer, got {value:?}"))),
    }
}
