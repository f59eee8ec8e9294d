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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Credential, IdentityError, Token};

const AUTH_FLOW: &str = "USER_PASSWORD_AUTH";
const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

// error types the provider uses when it is rate limiting us
const THROTTLING_ERRORS: &[&str] = &[
    "TooManyRequestsException",
    "LimitExceededException",
    "ThrottlingException",
];

// trait to exchange credentials for a fresh identity token
#[async_trait]
pub trait Authenticator: std::fmt::Debug + Send + Sync + 'static {
    async fn authenticate(&self, credential: &Credential) -> Result<Token, IdentityError>;
}

#[derive(Debug)]
pub struct CognitoAuthenticator {
    config: crate::Config,
    http_client: reqwest::Client,
}

impl CognitoAuthenticator {
    pub fn new_with_config(config: &crate::Config) -> Result<CognitoAuthenticator, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(CognitoAuthenticator {
            config: config.clone(),
            http_client,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
struct AuthParameters<'a> {
    #[serde(rename = "USERNAME")]
    username: &'a str,
    #[serde(rename = "PASSWORD")]
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: String,
}

#[async_trait]
impl Authenticator for CognitoAuthenticator {
    async fn authenticate(&self, credential: &Credential) -> Result<Token, IdentityError> {
        let request = InitiateAuthRequest {
            auth_flow: AUTH_FLOW,
            client_id: &self.config.client_id,
            auth_parameters: AuthParameters {
                username: credential.username(),
                password: credential.password(),
            },
        };

        debug!(username = credential.username(), "initiating authentication");

        let response = self
            .http_client
            .post(self.config.endpoint_url())
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .header("Content-Type", AMZ_JSON)
            .body(serde_json::to_string(&request).map_err(|e| {
                IdentityError::Serde(format!("Error Serializing Authentication Request: {}", e))
            })?)
            .send()
            .await?;

        let status_code = response.status();
        let response_text = response.text().await?;

        if !status_code.is_success() {
            return Err(provider_error(status_code, &response_text));
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&response_text).map_err(|e| {
            IdentityError::Serde(format!("Error parsing authentication response: {}", e))
        })?;

        let id_token = match parsed.authentication_result.and_then(|r| r.id_token) {
            Some(id_token) => id_token,
            None => {
                let message = match parsed.challenge_name {
                    Some(challenge) => {
                        format!("Authentication requires an unsupported challenge: {challenge}")
                    }
                    None => "Authentication response did not contain an identity token".to_string(),
                };
                return Err(IdentityError::Rejected {
                    code: "MissingToken".to_string(),
                    message,
                });
            }
        };

        // a token we cannot read is an authentication failure, not
        // something to paper over
        Token::decode(id_token)
    }
}

// provider_error maps a non-2xx provider response to an IdentityError,
// keeping the provider's message whenever one was sent.
fn provider_error(status_code: reqwest::StatusCode, body: &str) -> IdentityError {
    let Ok(parsed) = serde_json::from_str::<ProviderError>(body) else {
        return IdentityError::Communication(format!(
            "Identity provider returned status code {} and message {}",
            status_code, body
        ));
    };

    // types come back either bare or namespaced as "prefix#Name"
    let code = parsed
        .kind
        .rsplit('#')
        .next()
        .unwrap_or_default()
        .to_string();
    let message = if parsed.message.is_empty() {
        format!("Identity provider returned status code {status_code}")
    } else {
        parsed.message
    };

    if THROTTLING_ERRORS.contains(&code.as_str()) {
        IdentityError::Throttled(message)
    } else {
        IdentityError::Rejected { code, message }
    }
}
