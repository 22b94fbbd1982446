//! Risk oracle adapters
//!
//! - `BlocklistRiskOracle`: static list of blocked owners (from settings)
//! - `HttpRiskOracle`: remote risk service over HTTP
//! - `RiskOracleChain`: blocked if any member says so

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::ports::RiskOracle;

/// Default timeout for remote risk queries
pub const DEFAULT_RISK_TIMEOUT: Duration = Duration::from_secs(5);

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Fixed set of blocked owners, compared case-insensitively
#[derive(Debug, Default, Clone)]
pub struct BlocklistRiskOracle {
    blocked: HashSet<String>,
}

impl BlocklistRiskOracle {
    pub fn new<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocked: owners.into_iter().map(|o| normalize(o.as_ref())).collect(),
        }
    }
}

impl RiskOracle for BlocklistRiskOracle {
    fn is_blocked(&self, email: &str) -> Result<bool> {
        Ok(self.blocked.contains(&normalize(email)))
    }
}

/// Remote risk service response
#[derive(Debug, Deserialize)]
struct RiskResponse {
    blocked: bool,
}

/// Risk service client
///
/// Queries `GET {base}/risk?email=<email>` and expects `{ "blocked": bool }`.
#[derive(Debug)]
pub struct HttpRiskOracle {
    client: Client,
    endpoint: Url,
}

impl HttpRiskOracle {
    /// Create a client for the risk service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid risk service URL: {}", e)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "risk service URL must use http or https, got {}",
                base.scheme()
            )));
        }

        // Keep any path prefix when joining the endpoint
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("risk")
            .map_err(|e| Error::Config(format!("invalid risk service URL: {}", e)))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RiskOracle for HttpRiskOracle {
    fn is_blocked(&self, email: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("email", email)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::risk(format!("risk service returned {}", status)));
        }

        let body: RiskResponse = response
            .json()
            .map_err(|e| Error::risk(format!("unexpected risk service response: {}", e)))?;
        Ok(body.blocked)
    }
}

/// Consults each oracle in order; the first "blocked" wins
#[derive(Default)]
pub struct RiskOracleChain {
    oracles: Vec<Arc<dyn RiskOracle>>,
}

impl RiskOracleChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, oracle: Arc<dyn RiskOracle>) -> Self {
        self.oracles.push(oracle);
        self
    }
}

impl RiskOracle for RiskOracleChain {
    fn is_blocked(&self, email: &str) -> Result<bool> {
        for oracle in &self.oracles {
            if oracle.is_blocked(email)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockRiskConfig, MockRiskOracle, MockRiskServer};

    #[test]
    fn test_blocklist_is_case_insensitive() {
        let oracle = BlocklistRiskOracle::new(["Fraud@Example.com"]);

        assert!(oracle.is_blocked("fraud@example.com").unwrap());
        assert!(oracle.is_blocked("FRAUD@EXAMPLE.COM").unwrap());
        assert!(!oracle.is_blocked("karen@espe.edu.ec").unwrap());
    }

    #[test]
    fn test_http_oracle_rejects_bad_urls() {
        assert!(matches!(
            HttpRiskOracle::new("not a url", DEFAULT_RISK_TIMEOUT),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            HttpRiskOracle::new("ftp://risk.example.com", DEFAULT_RISK_TIMEOUT),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_http_oracle_keeps_path_prefix() {
        let oracle = HttpRiskOracle::new("https://risk.example.com/api/v1", DEFAULT_RISK_TIMEOUT).unwrap();
        assert_eq!(oracle.endpoint().as_str(), "https://risk.example.com/api/v1/risk");
    }

    #[test]
    fn test_http_oracle_reads_blocked_flag() {
        let config = MockRiskConfig {
            blocked: ["fraud+1@example.com".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let server = MockRiskServer::start(config).unwrap();
        let oracle = HttpRiskOracle::new(&server.base_url(), DEFAULT_RISK_TIMEOUT).unwrap();

        assert!(oracle.is_blocked("fraud+1@example.com").unwrap());
        assert!(!oracle.is_blocked("karen@espe.edu.ec").unwrap());
    }

    #[test]
    fn test_http_oracle_surfaces_service_errors() {
        let server = MockRiskServer::start(MockRiskConfig {
            unavailable: true,
            ..Default::default()
        })
        .unwrap();
        let oracle = HttpRiskOracle::new(&server.base_url(), DEFAULT_RISK_TIMEOUT).unwrap();

        let err = oracle.is_blocked("karen@espe.edu.ec").unwrap_err();
        assert!(matches!(err, Error::Risk(_)));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_http_oracle_rejects_malformed_body() {
        let server = MockRiskServer::start(MockRiskConfig {
            malformed: true,
            ..Default::default()
        })
        .unwrap();
        let oracle = HttpRiskOracle::new(&server.base_url(), DEFAULT_RISK_TIMEOUT).unwrap();

        assert!(matches!(oracle.is_blocked("a@b.c"), Err(Error::Risk(_))));
    }

    #[test]
    fn test_chain_stops_at_first_block() {
        let first = Arc::new(MockRiskOracle::new(true));
        let second = Arc::new(MockRiskOracle::new(false));
        let chain = RiskOracleChain::new()
            .with(first.clone())
            .with(second.clone());

        assert!(chain.is_blocked("a@b.c").unwrap());
        assert_eq!(first.calls().len(), 1);
        assert!(second.calls().is_empty());
    }

    #[test]
    fn test_empty_chain_blocks_nobody() {
        assert!(!RiskOracleChain::new().is_blocked("a@b.c").unwrap());
    }
}
