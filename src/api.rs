//! Wire calls to the OpenRouter key exchange and object generation endpoints.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::quality::Quality;
use crate::utils::redact;

#[derive(Debug, Serialize)]
struct KeyExchangeRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct KeyExchangeResponse {
    key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    #[serde(rename = "numInferenceSteps")]
    pub num_inference_steps: Quality,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedObject>,
}

#[derive(Debug, Deserialize)]
struct GeneratedObject {
    uri: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    api_base: String,
    auth_base: String,
    referer: String,
    title: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            auth_base: config.auth_base.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Trades an authorization code for an API key. A response without a
    /// non-empty `key` counts as a failure.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let url = format!("{}/api/v1/auth/keys", self.auth_base);
        log::info!("exchanging authorization code at {}", url);

        let response = self
            .http
            .post(&url)
            .json(&KeyExchangeRequest { code })
            .send()
            .await
            .map_err(|e| Error::AuthExchange(e.to_string()))?;

        let body: KeyExchangeResponse = response
            .json()
            .await
            .map_err(|e| Error::AuthExchange(e.to_string()))?;

        match body.key {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::AuthExchange("response has no key".to_string())),
        }
    }

    /// Requests one mesh and returns the locator of the first generated object.
    pub async fn generate(&self, prompt: &str, quality: Quality, credential: &str) -> Result<String> {
        let url = format!("{}/api/v1/objects/generations", self.api_base);
        log::info!(
            "generating model: steps={} prompt={:?} key={}",
            quality.steps(),
            prompt,
            redact(credential)
        );

        let response = self
            .http
            .post(&url)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .bearer_auth(credential)
            .json(&GenerationRequest {
                prompt,
                num_inference_steps: quality,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Generation(e.to_string()))?;

        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        body.data
            .into_iter()
            .next()
            .map(|object| object.uri)
            .ok_or_else(|| Error::Generation("response data is empty".to_string()))
    }

    /// Provider login page that redirects back to `callback` with `?code=`.
    pub fn login_url(&self, callback: &str) -> Result<Url> {
        Url::parse_with_params(&format!("{}/auth", self.auth_base), &[("callback_url", callback)])
            .map_err(|e| Error::Config(format!("invalid auth base {}: {}", self.auth_base, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_camel_case_steps() {
        let body = serde_json::to_value(GenerationRequest {
            prompt: "a teapot",
            num_inference_steps: Quality::High,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"prompt": "a teapot", "numInferenceSteps": 54}));
    }

    #[test]
    fn login_url_carries_callback() {
        let client = ApiClient::new(&Config::default());
        let url = client.login_url("http://127.0.0.1:21296/").unwrap();
        assert_eq!(url.path(), "/auth");
        let callback = url
            .query_pairs()
            .find(|(k, _)| k == "callback_url")
            .map(|(_, v)| v.into_owned());
        assert_eq!(callback.as_deref(), Some("http://127.0.0.1:21296/"));
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let config = Config {
            auth_base: "https://auth.example/".to_string(),
            ..Config::default()
        };
        let url = ApiClient::new(&config).login_url("x").unwrap();
        assert_eq!(url.as_str(), "https://auth.example/auth?callback_url=x");
    }
}
