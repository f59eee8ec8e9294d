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

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hub_api::HubApiError;
use hub_identity::IdentityError;
use hub_mqtt::PayloadError;

#[derive(thiserror::Error, Debug)]
pub enum HubError {
    #[error("Authentication error: {0}")]
    Authentication(IdentityError),
    #[error("Token retrieval error: {0}")]
    TokenRetrieval(IdentityError),
    #[error("Deployment error: {0}")]
    Deployment(HubApiError),
    #[error("Upgrade required to version {required}")]
    Compatibility { required: String },
    #[error("{0}")]
    Payload(#[from] PayloadError),
    #[error("Request to set device state failed: {0}")]
    DeviceSet(HubApiError),
    #[error("{context}: {message}")]
    Subscription {
        context: &'static str,
        message: String,
    },
    #[error("No URL returned")]
    MissingUrl,
    #[error("No subscription details returned")]
    MissingDetails,
    #[error("The account email or password is not configured.")]
    MissingCredentials,
    #[error("No hub named {0}")]
    UnknownHub(String),
}

impl HubError {
    // detail is the underlying message without the stage prefix, which is
    // what gets embedded in other reports and HTTP error bodies.
    pub fn detail(&self) -> String {
        match self {
            Self::Authentication(e) | Self::TokenRetrieval(e) => e.to_string(),
            Self::Deployment(e) | Self::DeviceSet(e) => e.to_string(),
            Self::Subscription { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownHub(_) => StatusCode::NOT_FOUND,
            Self::Payload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.detail() });
        (self.status_code(), Json(body)).into_response()
    }
}
