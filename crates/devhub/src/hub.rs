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

// HubNode is one configured hub: its credentials, token cache, broker
// session and the deploy coordinator that ties them together.

use std::sync::Arc;

use hub_api::{HubApi, SubscriptionAction};
use hub_events::{EventSink, StatusKind, report};
use hub_identity::{Authenticator, Credential, Token, TokenProvider};
use hub_mqtt::{
    BrokerConnector, ConnectionParameters, InboundStats, SessionManager, SessionOptions,
    SessionState,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::coordinator::{DeployCoordinator, DeployOutcome, authorize};
use crate::errors::HubError;
use crate::flow::{FlowGraph, HubNodeConfig};

// HubDependencies are the outside services every hub talks to.
#[derive(Clone)]
pub struct HubDependencies {
    pub authenticator: Arc<dyn Authenticator>,
    pub api: Arc<dyn HubApi>,
    pub connector: Arc<dyn BrokerConnector>,
    pub session_options: SessionOptions,
    pub client_version: String,
}

pub struct HubNode {
    id: String,
    flow: Arc<FlowGraph>,
    api: Arc<dyn HubApi>,
    session: Arc<SessionManager>,
    sink: Arc<dyn EventSink>,
    // tokens and coordinator are only present when both email and
    // password are configured.
    tokens: Option<Arc<TokenProvider>>,
    coordinator: Option<DeployCoordinator>,
}

impl HubNode {
    pub fn new(
        config: &HubNodeConfig,
        flow: Arc<FlowGraph>,
        deps: &HubDependencies,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let session = Arc::new(SessionManager::new(
            deps.connector.clone(),
            deps.session_options.clone(),
            sink.clone(),
        ));

        let tokens = Credential::from_parts(config.email.as_deref(), config.password.as_deref())
            .map(|credential| {
                Arc::new(TokenProvider::new(credential, deps.authenticator.clone()))
            });

        let coordinator = tokens.as_ref().map(|tokens| {
            DeployCoordinator::new(
                config.id.clone(),
                tokens.clone(),
                deps.api.clone(),
                session.clone(),
                sink.clone(),
                deps.client_version.clone(),
            )
        });

        Self {
            id: config.id.clone(),
            flow,
            api: deps.api.clone(),
            session,
            sink,
            tokens,
            coordinator,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_credentials(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session_stats(&self) -> InboundStats {
        self.session.stats()
    }

    pub fn connection_parameters(&self) -> Option<ConnectionParameters> {
        self.coordinator
            .as_ref()
            .and_then(DeployCoordinator::connection_parameters)
    }

    pub fn wired_device_ids(&self) -> Vec<String> {
        self.flow.wired_device_ids(&self.id)
    }

    // start is the initial deploy when the hub comes up.
    pub async fn start(&self) -> Result<DeployOutcome, HubError> {
        info!(hub_id = %self.id, "Starting hub");
        self.deploy().await
    }

    // deploy sends the currently wired devices to the API.
    pub async fn deploy(&self) -> Result<DeployOutcome, HubError> {
        let Some(coordinator) = &self.coordinator else {
            let error = HubError::MissingCredentials;
            report(
                &*self.sink,
                StatusKind::Error,
                "Account configuration",
                &error.to_string(),
            );
            return Err(error);
        };
        coordinator.deploy(self.flow.wired_devices(&self.id)).await
    }

    async fn token(&self) -> Result<Token, HubError> {
        let tokens = self.tokens.as_ref().ok_or(HubError::MissingCredentials)?;
        authorize(tokens, &*self.sink)
            .await
            .map_err(HubError::Authentication)
    }

    // handle_input forwards a device state change to the API.
    pub async fn handle_input(&self, payload: Value) -> Result<(), HubError> {
        let token = self.token().await.inspect_err(|e| {
            report(
                &*self.sink,
                StatusKind::Error,
                "Error",
                &format!("Failed to retrieve token: {}", e.detail()),
            );
        })?;

        debug!(hub_id = %self.id, "Setting device state");
        self.api
            .set_device(token.bearer(), &payload)
            .await
            .map_err(HubError::DeviceSet)
            .inspect_err(|e| {
                report(
                    &*self.sink,
                    StatusKind::Error,
                    "Request failed",
                    &e.to_string(),
                );
            })
    }

    // subscription_url asks the API where to send the user for an upgrade
    // or to manage their subscription.
    pub async fn subscription_url(&self, action: SubscriptionAction) -> Result<String, HubError> {
        let context = match action {
            SubscriptionAction::Upgrade => "Upgrade subscription error",
            SubscriptionAction::Manage => "Manage subscription error",
        };

        let token = match self.token().await {
            Ok(token) => token,
            // upgrade reports token failures as such, manage folds them
            // into its own error
            Err(e) if action == SubscriptionAction::Upgrade => {
                report(
                    &*self.sink,
                    StatusKind::Error,
                    "Token error",
                    &format!("Token retrieval error: {}", e.detail()),
                );
                return Err(e);
            }
            Err(e) => return Err(self.subscription_error(context, e.detail())),
        };

        match self.api.subscription_url(token.bearer(), action).await {
            Ok(Some(url)) => Ok(url),
            Ok(None) => Err(HubError::MissingUrl),
            Err(e) => Err(self.subscription_error(context, e.to_string())),
        }
    }

    // subscription_details passes through whatever the API knows about the
    // account's subscription.
    pub async fn subscription_details(&self) -> Result<Value, HubError> {
        let context = "Subscription details error";
        let token = self
            .token()
            .await
            .map_err(|e| self.subscription_error(context, e.detail()))?;

        match self.api.subscription_details(token.bearer()).await {
            Ok(Some(details)) => Ok(details),
            Ok(None) => Err(HubError::MissingDetails),
            Err(e) => Err(self.subscription_error(context, e.to_string())),
        }
    }

    fn subscription_error(&self, context: &'static str, message: String) -> HubError {
        let error = HubError::Subscription { context, message };
        report(&*self.sink, StatusKind::Error, context, &error.to_string());
        error
    }

    // shutdown closes the broker session for good and forgets the token.
    pub async fn shutdown(&self) {
        info!(hub_id = %self.id, "Shutting down hub");
        self.session.shutdown().await;
        if let Some(tokens) = &self.tokens {
            tokens.cache().clear();
        }
    }
}
