//! Request setup and response decoding shared by the async and blocking
//! clients. Only the transport call itself differs between them.

use std::time::Duration;

use colloquy_core::{OracleError, OracleResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Proxy, StatusCode};
use serde_json::Value;

use crate::config::Config;
use crate::error::{ErrorBody, LLMError, Result};
use crate::protocol::{ChatCompletionResponse, Completion, TokenizerResponse};

fn default_headers(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(api_key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| LLMError::Config(format!("invalid api key: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    } else {
        log::warn!("No API key configured; requests will be sent unauthenticated");
    }

    Ok(headers)
}

fn proxies(config: &Config) -> Result<Vec<Proxy>> {
    let mut proxies = Vec::new();
    if !config.http_proxy.is_empty() {
        proxies.push(
            Proxy::http(&config.http_proxy)
                .map_err(|e| LLMError::Config(format!("invalid http proxy: {}", e)))?,
        );
    }
    if !config.https_proxy.is_empty() {
        proxies.push(
            Proxy::https(&config.https_proxy)
                .map_err(|e| LLMError::Config(format!("invalid https proxy: {}", e)))?,
        );
    }
    Ok(proxies)
}

/// Everything the two transports configure identically.
struct ClientSettings {
    headers: HeaderMap,
    proxies: Vec<Proxy>,
    timeout: Option<Duration>,
}

impl ClientSettings {
    fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            headers: default_headers(config)?,
            proxies: proxies(config)?,
            timeout: config.timeout_secs.map(Duration::from_secs),
        })
    }
}

fn build_error(e: reqwest::Error) -> LLMError {
    LLMError::Config(format!("Failed to build HTTP client: {}", e))
}

pub(crate) fn async_client(config: &Config) -> Result<reqwest::Client> {
    let settings = ClientSettings::from_config(config)?;
    let mut builder = reqwest::Client::builder().default_headers(settings.headers);
    for proxy in settings.proxies {
        builder = builder.proxy(proxy);
    }
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(build_error)
}

/// Must not be called from inside an async runtime.
pub(crate) fn blocking_client(config: &Config) -> Result<reqwest::blocking::Client> {
    let settings = ClientSettings::from_config(config)?;
    let mut builder = reqwest::blocking::Client::builder().default_headers(settings.headers);
    for proxy in settings.proxies {
        builder = builder.proxy(proxy);
    }
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(build_error)
}

fn ensure_success(status: StatusCode, text: String) -> Result<String> {
    if status.is_success() {
        Ok(text)
    } else {
        Err(LLMError::Api {
            status: status.as_u16(),
            body: ErrorBody::decode(text),
        })
    }
}

pub(crate) fn completion_from_body(status: StatusCode, text: String) -> Result<Completion> {
    let text = ensure_success(status, text)?;
    let response: ChatCompletionResponse = serde_json::from_str(&text)?;
    response.into_completion()
}

pub(crate) fn json_from_body(status: StatusCode, text: String) -> Result<Value> {
    let text = ensure_success(status, text)?;
    Ok(serde_json::from_str(&text)?)
}

pub(crate) fn tokens_from_body(status: StatusCode, text: String) -> OracleResult<u64> {
    if !status.is_success() {
        return Err(OracleError::Rejected {
            status: status.as_u16(),
            body: text,
        });
    }
    let response: TokenizerResponse =
        serde_json::from_str(&text).map_err(|_| OracleError::MissingCount)?;
    response.prompt_tokens().ok_or(OracleError::MissingCount)
}
