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

// these are not visible outside of this crate
mod cache;
mod client;
mod credential;
mod provider;
mod token;

use std::time::Duration;

pub use cache::TokenCache;
pub use client::{Authenticator, CognitoAuthenticator};
pub use credential::Credential;
pub use provider::TokenProvider;
use serde::{Deserialize, Serialize};
pub use token::{Token, TokenClaims};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub region: String,
    pub client_id: String,
    // endpoint overrides the regional identity provider URL. Only
    // really useful for pointing at a mock server.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            region: "us-east-1".to_string(),
            client_id: Default::default(),
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Error talking to identity provider: {0}")]
    Communication(String),
    // The provider's own message is what operators expect to see, so
    // it is the whole display text.
    #[error("{message}")]
    Rejected { code: String, message: String },
    #[error("Identity provider is throttling requests: {0}")]
    Throttled(String),
    #[error("Error parsing identity token: {0}")]
    MalformedToken(String),
    #[error("Error Serialising/Deserialising: {0}")]
    Serde(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(value: reqwest::Error) -> IdentityError {
        IdentityError::Communication(format!("Communication error: {}", value))
    }
}
