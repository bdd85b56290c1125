use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{AiHubError, CoreResult};
use crate::http_client::{HttpClient, RequestCtx};
use crate::telemetry::observe;

/// One reusable template as the hosted registry stores it. The body is passed
/// through exactly as returned; nothing here validates or rewrites it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub id: String,
    pub template: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Hosted lookup-by-identifier. One attempt per call, no retry.
#[async_trait]
pub trait PromptSource: Send + Sync {
    fn name(&self) -> &str;
    async fn pull(&self, id: &str) -> CoreResult<PromptTemplate>;
}

/// Client for a hosted prompt registry speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HubRegistry {
    http: HttpClient,
    api_key: SecretString,
    base: String,
    name: String,
}

impl HubRegistry {
    pub fn new(http: HttpClient, api_key: SecretString, base: String) -> Self {
        Self {
            http,
            api_key,
            base,
            name: "hub".into(),
        }
    }

    #[cfg(test)]
    pub fn new_for_tests(server_base: &str) -> Self {
        HubRegistry::new(
            HttpClient::new_default().unwrap(),
            SecretString::new("test-key".into()),
            server_base.to_string(),
        )
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![(
            "x-api-key".to_string(),
            self.api_key.expose_secret().to_string(),
        )]
    }
}

#[async_trait]
impl PromptSource for HubRegistry {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pull(&self, id: &str) -> CoreResult<PromptTemplate> {
        if id.trim().is_empty() {
            return Err(AiHubError::Validation(
                "empty prompt identifier".to_string(),
            ));
        }
        tracing::debug!(registry = %self.name, prompt = %id, "pulling prompt template");

        let url = format!("{}/prompts/{}", self.base, id);
        let ctx = RequestCtx::default();
        let headers = self.headers();
        let header_pairs: Vec<(&str, &str)> = headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        match self
            .http
            .get_json::<PromptTemplate>(&url, &header_pairs, &ctx)
            .await
        {
            Ok((template, _registry_request_id, _latency_ms)) => Ok(template),
            Err(e) => {
                tracing::warn!(registry = %self.name, prompt = %id, error = %e, "pull failed");
                Err(e)
            }
        }
    }
}

/// A canned source that never leaves the process.
/// Useful for tests or as a placeholder when no API key is configured.
pub struct NullSource;

#[async_trait]
impl PromptSource for NullSource {
    fn name(&self) -> &str {
        "null"
    }

    async fn pull(&self, id: &str) -> CoreResult<PromptTemplate> {
        Ok(PromptTemplate {
            id: id.to_string(),
            template: "[null source template]".to_string(),
            version: None,
        })
    }
}

/// Pull every identifier in `ids`, one in-flight request per identifier with
/// no ordering guarantee between them. Results come back in `ids` order.
///
/// Aggregation is all-or-nothing: the first failed pull cancels the remaining
/// in-flight pulls and its error is returned, with no partial-success
/// reporting. Each pull runs inside an `observe` span named `registry.pull`;
/// pulls cancelled by a sibling's failure still close their spans.
pub async fn pull_all(
    source: &dyn PromptSource,
    ids: &[String],
) -> CoreResult<Vec<PromptTemplate>> {
    let pulls = ids
        .iter()
        .map(|id| observe("registry.pull", || source.pull(id)));
    futures::future::try_join_all(pulls).await
}
