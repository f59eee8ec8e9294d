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

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hub_api::SubscriptionAction;
use hub_mqtt::decode_payload;
use tracing::warn;

use crate::errors::HubError;
use crate::hub::HubNode;
use crate::runtime::Runtime;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<Runtime>,
}

impl AppState {
    fn hub(&self, id: &str) -> Result<Arc<HubNode>, HubError> {
        self.runtime
            .hub(id)
            .ok_or_else(|| HubError::UnknownHub(id.to_string()))
    }
}

async fn redirect_to_subscription(
    state: &AppState,
    hub_id: &str,
    action: SubscriptionAction,
) -> Result<Response, HubError> {
    let url = state.hub(hub_id)?.subscription_url(action).await?;
    Ok(Redirect::to(&url).into_response())
}

async fn subscription_upgrade(
    Path(hub_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, HubError> {
    redirect_to_subscription(&state, &hub_id, SubscriptionAction::Upgrade).await
}

async fn subscription_manage(
    Path(hub_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, HubError> {
    redirect_to_subscription(&state, &hub_id, SubscriptionAction::Manage).await
}

async fn subscription_details(
    Path(hub_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HubError> {
    let hub = state.hub(&hub_id)?;
    if !hub.has_credentials() {
        return Ok(Json(serde_json::json!({})));
    }
    Ok(Json(hub.subscription_details().await?))
}

// input accepts a device state change and forwards it in the background;
// failures are reported through the hub's status.
async fn input(
    Path(hub_id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, HubError> {
    let hub = state.hub(&hub_id)?;
    let payload = decode_payload(&body)?;
    tokio::spawn(async move {
        if let Err(e) = hub.handle_input(payload).await {
            warn!(hub_id = %hub.id(), "Device state change failed: {e}");
        }
    });
    Ok(StatusCode::ACCEPTED)
}

async fn deploy(
    Path(hub_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, HubError> {
    let hub = state.hub(&hub_id)?;
    tokio::spawn(async move {
        if let Err(e) = hub.deploy().await {
            warn!(hub_id = %hub.id(), "Redeploy failed: {e}");
        }
    });
    Ok(StatusCode::ACCEPTED)
}

async fn devices(
    Path(hub_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HubError> {
    state.hub(&hub_id)?;
    Ok(Json(state.runtime.wired_devices(&hub_id)))
}

pub fn get_router(path_prefix: &str) -> Router<AppState> {
    let hub_path = format!("{path_prefix}/hub/{{hub_id}}");
    Router::new()
        .route(
            &format!("{hub_path}/subscription/upgrade"),
            get(subscription_upgrade),
        )
        .route(
            &format!("{hub_path}/subscription/manage"),
            get(subscription_manage),
        )
        .route(
            &format!("{hub_path}/subscription/details"),
            get(subscription_details),
        )
        .route(&format!("{hub_path}/input"), post(input))
        .route(&format!("{hub_path}/deploy"), post(deploy))
        .route(&format!("{hub_path}/devices"), get(devices))
}
