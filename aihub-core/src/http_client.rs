use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::HttpCfg;
use crate::error::{AiHubError, CoreResult};

/// Request context carries the caller's correlation id.
#[derive(Clone, Copy, Default)]
pub struct RequestCtx<'a> {
    pub request_id: Option<&'a str>,
}

/// Thin wrapper around reqwest::Client with defaults and helpers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new_default() -> CoreResult<Self> {
        Self::from_cfg(&HttpCfg::default())
    }

    pub fn from_cfg(cfg: &HttpCfg) -> CoreResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(std::time::Duration::from_millis(cfg.connect_timeout_ms))
            .timeout(std::time::Duration::from_millis(cfg.request_timeout_ms));
        if let Some(cap) = cfg.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(cap);
        }
        let inner = builder
            .build()
            .map_err(|e| AiHubError::Other(anyhow::anyhow!("http client build failed: {e}")))?;
        Ok(Self {
            inner,
            user_agent: "aihub/0.1".to_string(),
        })
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        ctx: &RequestCtx<'_>,
    ) -> CoreResult<(R, Option<String>, u32)> {
        let start = Instant::now();
        let mut req = self.inner.get(url).header("User-Agent", &self.user_agent);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        if let Some(rid) = ctx.request_id {
            req = req.header("X-Request-Id", rid);
        }

        let resp = req
            .send()
            .await
            .map_err(|_e| AiHubError::RegistryUnavailable {
                registry: "http".into(),
            })?;

        let latency = start.elapsed().as_millis() as u32;
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let registry_request_id = extract_request_id(&resp_headers);

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let ra = parse_retry_after(&resp_headers);
            return Err(map_http_error("http", status, ra, &text));
        }

        let parsed = resp
            .json::<R>()
            .await
            .map_err(|e| AiHubError::RegistryError {
                registry: "http".into(),
                code: status.as_u16().to_string(),
                message: format!("json decode error: {e}"),
            })?;
        Ok((parsed, registry_request_id, latency))
    }
}

fn extract_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    static CANDIDATES: [&str; 5] = [
        "x-request-id",
        "request-id",
        "x-amzn-requestid",
        "x-amz-request-id",
        "x-cdn-request-id",
    ];
    for k in CANDIDATES {
        if let Some(v) = headers.get(k)
            && let Ok(s) = v.to_str()
        {
            return Some(s.to_string());
        }
    }
    None
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    if let Some(v) = headers.get("retry-after")
        && let Ok(s) = v.to_str()
        && let Ok(secs) = s.trim().parse::<u64>()
    {
        return Some(secs);
    }
    // HTTP-date forms (RFC 7231) are ignored; only numeric seconds are parsed.
    None
}

fn map_http_error(
    registry: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> AiHubError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => AiHubError::RateLimited {
            registry: registry.to_string(),
            retry_after,
        },
        s if s.is_server_error() => AiHubError::RegistryUnavailable {
            registry: registry.to_string(),
        },
        s => AiHubError::RegistryError {
            registry: registry.to_string(),
            code: s.as_u16().to_string(),
            message: truncate(body, 300),
        },
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut t = s[..max].to_string();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}
