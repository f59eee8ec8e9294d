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
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use devhub::{AppState, FlowGraph, NodeConfig, Runtime, get_router};
use fixtures::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(services: &Services, flow: FlowGraph) -> Router {
    let runtime = Arc::new(Runtime::new(flow, &services.dependencies()));
    get_router("").with_state(AppState { runtime })
}

async fn send(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Option<String>, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|l| l.to_str().unwrap().to_string());
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .expect("Empty response body?")
        .to_bytes();
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, location, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    send(app, Method::GET, uri, Body::empty()).await
}

async fn eventually(what: &str, check: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

#[tokio::test]
async fn test_upgrade_redirects() {
    let services = Services::new();
    *services.api.subscription_url.lock().unwrap() =
        Some("https://billing.test/upgrade/abc".to_string());
    let app = app(&services, flow());

    let (status, location, _) = get(&app, "/hub/hub-1/subscription/upgrade").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("https://billing.test/upgrade/abc"));

    let (status, location, _) = get(&app, "/hub/hub-1/subscription/manage").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("https://billing.test/upgrade/abc"));
}

#[tokio::test]
async fn test_upgrade_without_url_is_an_error() {
    let services = Services::new();
    let app = app(&services, flow());

    let (status, location, body) = get(&app, "/hub/hub-1/subscription/upgrade").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(location, None);
    assert_eq!(body, json!({"error": "No URL returned"}));
}

#[tokio::test]
async fn test_manage_api_failure_carries_message() {
    let services = Services::new();
    services.api.fail.store(true, Ordering::SeqCst);
    let app = app(&services, flow());

    let (status, _, body) = get(&app, "/hub/hub-1/subscription/manage").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Could not deserialize response")
    );
}

#[tokio::test]
async fn test_unknown_hub() {
    let services = Services::new();
    let app = app(&services, flow());

    let (status, _, body) = get(&app, "/hub/nope/subscription/details").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "No hub named nope"}));
}

#[tokio::test]
async fn test_details() {
    let services = Services::new();
    *services.api.subscription_details.lock().unwrap() = Some(json!({"plan": "pro"}));
    let mut anonymous = hub_config("hub-2", &[]);
    anonymous.email = None;
    let flow = FlowGraph::new(vec![
        NodeConfig::Hub(hub_config("hub-1", &[])),
        NodeConfig::Hub(anonymous),
    ])
    .unwrap();
    let app = app(&services, flow);

    let (status, _, body) = get(&app, "/hub/hub-1/subscription/details").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"plan": "pro"}));

    // without credentials there is nothing to ask for
    let (status, _, body) = get(&app, "/hub/hub-2/subscription/details").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
    assert_eq!(services.api.calls(), vec!["subscription/details"]);
}

#[tokio::test]
async fn test_input_is_forwarded_in_background() {
    let services = Services::new();
    let app = app(&services, flow());

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/hub/hub-1/input",
        Body::from(r#"{"id":"lamp-1","on":true}"#),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    eventually("device state change", || {
        services.api.device_sets() == vec![json!({"id": "lamp-1", "on": true})]
    })
    .await;
}

#[tokio::test]
async fn test_input_rejects_bad_payloads() {
    let services = Services::new();
    let app = app(&services, flow());

    let (status, _, body) = send(&app, Method::POST, "/hub/hub-1/input", Body::from("{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Error parsing JSON payload")
    );

    let (status, _, _) = send(&app, Method::POST, "/hub/hub-1/input", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(services.api.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_runs_in_background() {
    let services = Services::new();
    let app = app(&services, flow());

    let (status, _, _) = send(&app, Method::POST, "/hub/hub-1/deploy", Body::empty()).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    eventually("deploy call", || services.api.calls() == vec!["deploy"]).await;
}

#[tokio::test]
async fn test_devices_lists_wired_devices() {
    let services = Services::new();
    let app = app(&services, flow());

    let (status, _, body) = get(&app, "/hub/hub-1/devices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": "lamp-1", "name": "Kitchen", "device_type": "light", "status": null, "last_message": null},
            {"id": "lamp-2", "name": "Hall", "device_type": "light", "status": null, "last_message": null},
        ])
    );
}
