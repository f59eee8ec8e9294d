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

mod coordinator;
mod device;
mod errors;
mod flow;
mod hub;
mod routes;
mod runtime;
mod version_gate;

// pub mods are only ones used by main.rs and integration tests
pub mod config;
pub mod shutdown_handle;

use std::net::SocketAddr;
use std::sync::Arc;

pub use coordinator::{DeployCoordinator, DeployOutcome, SessionChange};
pub use device::{DeviceNode, DeviceSnapshot, NOT_ACTIVATED_TEXT};
pub use errors::HubError;
pub use flow::{
    DEFAULT_DEVICE_NAME, DEFAULT_DEVICE_TYPE, DeviceNodeConfig, FlowError, FlowGraph,
    HubNodeConfig, NodeConfig,
};
pub use hub::{HubDependencies, HubNode};
pub use routes::{AppState, get_router};
pub use runtime::Runtime;
pub use version_gate::is_compatible;

use hub_api::HubApiClient;
use hub_identity::CognitoAuthenticator;
use hub_mqtt::RumqttcConnector;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{Config, ConfigError};
use crate::shutdown_handle::ShutdownHandle;

/// Version reported to the API and checked against the minimum it requires.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

impl HubDependencies {
    // from_config builds the production clients: the identity provider,
    // the hub API and the TLS broker connector.
    pub fn from_config(config: &Config) -> Result<Self, SpawnError> {
        let authenticator = CognitoAuthenticator::new_with_config(&config.identity_config())?;
        let api = HubApiClient::new(config.api_url.clone(), config.request_timeout)?;
        Ok(Self {
            authenticator: Arc::new(authenticator),
            api: Arc::new(api),
            connector: Arc::new(RumqttcConnector),
            session_options: config.session_options()?,
            client_version: CLIENT_VERSION.to_string(),
        })
    }
}

/// Run devhub in the background, returning a [`SpawnHandle`] once the HTTP listener is bound.
/// Every hub runs its initial deploy in the background. When the handle is dropped, the service
/// shuts down.
pub async fn spawn(config: Config) -> Result<SpawnHandle, SpawnError> {
    let deps = HubDependencies::from_config(&config)?;
    let listen_address = config.listen_address;
    let flow = FlowGraph::new(config.nodes)?;
    spawn_with(listen_address, flow, deps).await
}

/// Like [`spawn`], with the flow and outside services supplied by the caller.
pub async fn spawn_with(
    listen_address: SocketAddr,
    flow: FlowGraph,
    deps: HubDependencies,
) -> Result<SpawnHandle, SpawnError> {
    let runtime = Arc::new(Runtime::new(flow, &deps));

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|error| SpawnError::Bind {
            addr: listen_address,
            error,
        })?;
    let local_addr = listener.local_addr().map_err(|error| SpawnError::Bind {
        addr: listen_address,
        error,
    })?;
    info!("Listening on {local_addr}");

    let router = get_router("").with_state(AppState {
        runtime: runtime.clone(),
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let join_handle = tokio::spawn({
        let runtime = runtime.clone();
        async move {
            let start = tokio::spawn({
                let runtime = runtime.clone();
                async move { runtime.start().await }
            });

            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                error!("HTTP server failed: {e}");
            }

            start.abort();
            runtime.shutdown().await;
            info!("devhub stopped");
        }
    });

    Ok(SpawnHandle {
        shutdown_tx,
        join_handle,
        local_addr,
        runtime,
    })
}

#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid flow: {0}")]
    Flow(#[from] FlowError),
    #[error("Could not set up the identity client: {0}")]
    Identity(#[from] hub_identity::IdentityError),
    #[error("Could not set up the API client: {0}")]
    Api(#[from] hub_api::HubApiError),
    #[error("Could not listen on {addr}: {error}")]
    Bind {
        addr: SocketAddr,
        error: std::io::Error,
    },
}

pub struct SpawnHandle {
    shutdown_tx: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
    local_addr: SocketAddr,
    runtime: Arc<Runtime>,
}

impl SpawnHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }
}

impl ShutdownHandle<()> for SpawnHandle {
    fn into_parts(self) -> (oneshot::Sender<()>, JoinHandle<()>) {
        (self.shutdown_tx, self.join_handle)
    }
}
