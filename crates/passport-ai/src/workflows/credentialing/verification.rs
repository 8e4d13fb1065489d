use async_trait::async_trait;
use serde_json::Value;

use crate::config::VerificationConfig;

/// Public API page for the registry backing primary-source verification.
pub const NPI_REGISTRY_CITATION_URL: &str = "https://npiregistry.cms.hhs.gov/api-page";

/// Error raised by a registry lookup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("registry client misconfigured: {0}")]
    Configuration(String),
}

/// Seam over the NPPES registry so the orchestrator, demo, and tests can run
/// against canned lookups.
#[async_trait]
pub trait NpiRegistry: Send + Sync {
    /// Look up a provider record by NPI, returning the raw registry payload.
    async fn lookup(&self, npi: &str) -> Result<Value, RegistryError>;
}

/// HTTPS client for the public NPPES NPI registry.
#[derive(Debug, Clone)]
pub struct NppesClient {
    http: reqwest::Client,
    base_url: String,
}

impl NppesClient {
    pub fn new(config: &VerificationConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RegistryError::Request)?;

        Ok(Self {
            http,
            base_url: config.registry_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NpiRegistry for NppesClient {
    async fn lookup(&self, npi: &str) -> Result<Value, RegistryError> {
        let url = format!("{}/api/", self.base_url);
        let payload = self
            .http
            .get(url)
            .query(&[("version", "2.1"), ("number", npi)])
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash_from_base_url() {
        let config = VerificationConfig {
            registry_url: "https://npiregistry.cms.hhs.gov/".to_string(),
            registry_timeout_secs: 5,
        };
        let client = NppesClient::new(&config).expect("client builds");
        assert_eq!(client.base_url, "https://npiregistry.cms.hhs.gov");
    }
}
