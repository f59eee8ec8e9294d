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

// DeployCoordinator runs one deploy: token, deploy call, version gate,
// then whatever the response asks for (a new broker session, a device
// activation list).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use hub_api::{BrokerAuth, DeviceMap, HubApi};
use hub_events::{EventSink, StatusKind, report};
use hub_identity::{IdentityError, Token, TokenProvider};
use hub_mqtt::{ConnectionParameters, RebuildOutcome, RebuildRequest, SessionManager};
use serde_json::json;
use tracing::{info, warn};

use crate::errors::HubError;
use crate::version_gate::is_compatible;

// authorize fetches a valid token, reporting a failed authentication on
// the way out.
pub(crate) async fn authorize(
    tokens: &TokenProvider,
    sink: &dyn EventSink,
) -> Result<Token, IdentityError> {
    tokens.get_valid_token().await.inspect_err(|e| {
        report(
            sink,
            StatusKind::Error,
            "Authentication error",
            &format!("Authentication error: {e}"),
        );
    })
}

fn broker_parameters(auth: &BrokerAuth) -> ConnectionParameters {
    ConnectionParameters::new(&auth.endpoint, &auth.certificate, &auth.private_key)
}

// SessionChange is what a deploy did to the broker session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionChange {
    // Unchanged: the response carried no broker credentials.
    Unchanged,
    Applied(RebuildOutcome),
    // Failed: the rebuild failed; the failure has been reported.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployOutcome {
    pub generation: u64,
    pub session: SessionChange,
    pub devices: Option<Vec<String>>,
}

pub struct DeployCoordinator {
    hub_id: String,
    tokens: Arc<TokenProvider>,
    api: Arc<dyn HubApi>,
    session: Arc<SessionManager>,
    sink: Arc<dyn EventSink>,
    client_version: String,
    sequence: AtomicU64,
    connection: Mutex<Option<ConnectionParameters>>,
}

impl DeployCoordinator {
    pub fn new(
        hub_id: impl Into<String>,
        tokens: Arc<TokenProvider>,
        api: Arc<dyn HubApi>,
        session: Arc<SessionManager>,
        sink: Arc<dyn EventSink>,
        client_version: impl Into<String>,
    ) -> Self {
        Self {
            hub_id: hub_id.into(),
            tokens,
            api,
            session,
            sink,
            client_version: client_version.into(),
            sequence: AtomicU64::new(0),
            connection: Mutex::new(None),
        }
    }

    // connection_parameters are the broker parameters from the most
    // recent deploy that handed any out.
    pub fn connection_parameters(&self) -> Option<ConnectionParameters> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn deploy(&self, devices: DeviceMap) -> Result<DeployOutcome, HubError> {
        let generation = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let sink = &*self.sink;

        let token = match authorize(&self.tokens, sink).await {
            Ok(token) => token,
            Err(e) => {
                let error = HubError::TokenRetrieval(e);
                report(sink, StatusKind::Error, "Token error", &error.to_string());
                return Err(error);
            }
        };

        report(sink, StatusKind::Loading, "deploying", "");
        info!(
            hub_id = %self.hub_id,
            generation,
            devices = devices.len(),
            "Deploying devices"
        );

        let result = match self.api.deploy(token.bearer(), &devices).await {
            Ok(result) => result,
            Err(e) => {
                let error = HubError::Deployment(e);
                report(sink, StatusKind::Error, "Deployment error", &error.to_string());
                return Err(error);
            }
        };

        if let Some(required) = result.required_version()
            && !is_compatible(required, &self.client_version)
        {
            let error = HubError::Compatibility {
                required: required.to_string(),
            };
            report(sink, StatusKind::Error, "Upgrade required", &error.to_string());
            return Err(error);
        }

        let session = match &result.auth {
            Some(auth) => {
                let params = broker_parameters(auth);
                *self
                    .connection
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(params.clone());

                let request = RebuildRequest {
                    generation,
                    params,
                    subject: token.subject().to_string(),
                };
                match self.session.rebuild(request).await {
                    Ok(outcome) => SessionChange::Applied(outcome),
                    // already reported by the session manager
                    Err(e) => {
                        warn!(hub_id = %self.hub_id, generation, "Session rebuild failed: {e}");
                        SessionChange::Failed(e.to_string())
                    }
                }
            }
            None => SessionChange::Unchanged,
        };

        if let Some(devices) = &result.devices {
            sink.on_event(json!({
                "status": "deployed",
                "devices": devices,
            }));
        }

        Ok(DeployOutcome {
            generation,
            session,
            devices: result.devices,
        })
    }
}
