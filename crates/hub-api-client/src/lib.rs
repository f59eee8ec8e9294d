/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest::{Client as HttpClient, ClientBuilder, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub mod model;

pub use model::{
    BrokerAuth, DeployResult, DeviceEntry, DeviceMap, Envelope, SubscriptionAction,
    SubscriptionLink,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_RESPONSE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum HubApiError {
    #[error("Network error talking to {url}. {source}")]
    NetworkError { url: String, source: reqwest::Error },

    #[error("HTTP {status_code} at {url}: {response_body}")]
    HTTPErrorCode {
        url: String,
        status_code: StatusCode,
        response_body: String,
    },

    #[error("API error {status}: {message} at {url}")]
    APIError {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("Could not deserialize response from {url}. Body: {body}. {source}")]
    JsonDeserializeError {
        url: String,
        body: String,
        source: serde_json::Error,
    },

    #[error("Could not serialize request body for {url}. {source}")]
    JsonSerializeError {
        url: String,
        source: serde_json::Error,
    },

    #[error("Remote returned empty body at {url}, {source}")]
    NoContent { url: String, source: reqwest::Error },

    #[error("Reqwest error: '{0}'")]
    ReqwestError(#[from] reqwest::Error),
}

// trait for the backend calls a hub makes, all bearer authenticated
#[async_trait::async_trait]
pub trait HubApi: std::fmt::Debug + Send + Sync + 'static {
    async fn deploy(&self, bearer: &str, devices: &DeviceMap) -> Result<DeployResult, HubApiError>;

    async fn set_device(
        &self,
        bearer: &str,
        payload: &serde_json::Value,
    ) -> Result<(), HubApiError>;

    async fn subscription_url(
        &self,
        bearer: &str,
        action: SubscriptionAction,
    ) -> Result<Option<String>, HubApiError>;

    async fn subscription_details(
        &self,
        bearer: &str,
    ) -> Result<Option<serde_json::Value>, HubApiError>;
}

#[derive(Debug, Clone)]
pub struct HubApiClient {
    base_url: String,
    client: HttpClient,
}

impl HubApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HubApiError> {
        let client = ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn req<T, B>(
        &self,
        method: Method,
        api: &str,
        bearer: &str,
        body: Option<&B>,
    ) -> Result<(StatusCode, Option<T>), HubApiError>
    where
        T: DeserializeOwned + ::std::fmt::Debug,
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, api);

        let body_enc = match body {
            Some(b) => Some(serde_json::to_string(b).map_err(|e| {
                HubApiError::JsonSerializeError {
                    url: url.clone(),
                    source: e,
                }
            })?),
            None => None,
        };

        let mut req_b = self.client.request(method.clone(), &url);
        req_b = req_b.header(ACCEPT, HeaderValue::from_static("application/json"));
        req_b = req_b.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        req_b = req_b.header(
            USER_AGENT,
            HeaderValue::from_static(concat!("devhub/", env!("CARGO_PKG_VERSION"))),
        );
        req_b = req_b.bearer_auth(bearer);
        if let Some(b) = body_enc {
            req_b = req_b.body(b);
        }

        debug!("TX {method} {url}");
        let response = req_b.send().await.map_err(|e| HubApiError::NetworkError {
            url: url.clone(),
            source: e,
        })?;
        let status_code = response.status();
        // check content length in case of junk responses
        if let Some(len) = response.content_length()
            && len > MAX_RESPONSE_BYTES
        {
            return Err(HubApiError::APIError {
                url,
                status: status_code,
                message: format!("Content length {len} exceeds 20MB limit"),
            });
        }
        let response_buffer = response
            .bytes()
            .await
            .map_err(|e| HubApiError::NoContent {
                url: url.clone(),
                source: e,
            })?;
        let response_body = String::from_utf8_lossy(&response_buffer).to_string();
        debug!("RX {status_code} {}", truncate(&response_body, 1500));

        if !status_code.is_success() {
            return Err(HubApiError::HTTPErrorCode {
                url,
                status_code,
                response_body,
            });
        }

        if response_body.trim().is_empty() {
            return Ok((status_code, None));
        }

        match serde_json::from_str(&response_body) {
            Ok(v) => Ok((status_code, Some(v))),
            Err(e) => Err(HubApiError::JsonDeserializeError {
                url,
                body: response_body,
                source: e,
            }),
        }
    }
}

fn truncate(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait::async_trait]
impl HubApi for HubApiClient {
    async fn deploy(&self, bearer: &str, devices: &DeviceMap) -> Result<DeployResult, HubApiError> {
        let (_, envelope) = self
            .req::<Envelope<DeployResult>, _>(Method::POST, "hub/deploy", bearer, Some(devices))
            .await?;
        Ok(envelope.and_then(|e| e.data).unwrap_or_default())
    }

    async fn set_device(
        &self,
        bearer: &str,
        payload: &serde_json::Value,
    ) -> Result<(), HubApiError> {
        // the response carries nothing we act on, so it is not parsed
        let url = format!("{}/device/set", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .bearer_auth(bearer)
            .json(payload)
            .send()
            .await
            .map_err(|e| HubApiError::NetworkError {
                url: url.clone(),
                source: e,
            })?;

        let status_code = response.status();
        if !status_code.is_success() {
            let response_body = response.text().await.unwrap_or_default();
            return Err(HubApiError::HTTPErrorCode {
                url,
                status_code,
                response_body,
            });
        }
        Ok(())
    }

    async fn subscription_url(
        &self,
        bearer: &str,
        action: SubscriptionAction,
    ) -> Result<Option<String>, HubApiError> {
        let (_, envelope) = self
            .req::<Envelope<SubscriptionLink>, ()>(Method::GET, action.path(), bearer, None)
            .await?;
        Ok(envelope.and_then(|e| e.data).and_then(|link| link.url))
    }

    async fn subscription_details(
        &self,
        bearer: &str,
    ) -> Result<Option<serde_json::Value>, HubApiError> {
        let (_, envelope) = self
            .req::<Envelope<serde_json::Value>, ()>(
                Method::GET,
                "subscription/details",
                bearer,
                None,
            )
            .await?;
        Ok(envelope
            .and_then(|e| e.data)
            .filter(|data| !data.is_null()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = HubApiClient::new("https://api.example.com/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }
}
