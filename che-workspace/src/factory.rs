//! Che factory resolver client.
//!
//! Asks the Che server to resolve a repository URL into a factory (the
//! devfile it would create a workspace from). Used as a reachability check
//! of the server's REST API.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::error::{LifecycleError, Result};

#[derive(Debug, Clone)]
pub struct FactoryClient {
    http: Client,
    api_base: String,
}

impl FactoryClient {
    /// Client for the server at `che_url`; the REST API lives under `/api`.
    pub fn new(che_url: &Url) -> Self {
        Self {
            http: Client::new(),
            api_base: format!("{}/api", che_url.as_str().trim_end_matches('/')),
        }
    }

    pub fn resolver_url(&self) -> Result<Url> {
        let raw = format!("{}/factory/resolver/", self.api_base);
        Url::parse(&raw).map_err(|e| LifecycleError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Resolves `repo_url` and returns the factory document.
    pub async fn resolve(&self, repo_url: &str) -> Result<Value> {
        let endpoint = self.resolver_url()?;
        debug!("POST {} url={}", endpoint, repo_url);

        let response = self
            .http
            .post(endpoint)
            .json(&json!({ "url": repo_url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LifecycleError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let factory: Value = response.json().await?;
        info!("Resolved factory for {}", repo_url);
        Ok(factory)
    }
}
