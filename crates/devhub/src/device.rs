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

// Device nodes sit downstream of a hub. They show whether the last deploy
// activated them and pass on the device updates addressed to them.

use std::sync::{Arc, Mutex, PoisonError};

use hub_events::{EventSink, NodeStatus, StatusFill, StatusShape};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::flow::DeviceNodeConfig;

pub const NOT_ACTIVATED_TEXT: &str = "paid only";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub id: String,
    pub name: String,
    pub device_type: String,
    pub status: Option<NodeStatus>,
    pub last_message: Option<Value>,
}

#[derive(Default)]
struct DeviceState {
    status: Option<NodeStatus>,
    last_message: Option<Value>,
}

pub struct DeviceNode {
    config: DeviceNodeConfig,
    state: Mutex<DeviceState>,
    sink: Arc<dyn EventSink>,
}

impl DeviceNode {
    pub fn new(config: DeviceNodeConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            state: Mutex::new(DeviceState::default()),
            sink,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    // handle_input processes one message from the hub.
    pub fn handle_input(&self, payload: &Value) {
        if payload.get("status").and_then(Value::as_str) == Some("deployed") {
            let activated = payload
                .get("devices")
                .and_then(Value::as_array)
                .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(self.id())));

            let status = if activated {
                NodeStatus::new(StatusFill::Green, StatusShape::Dot, "")
            } else {
                NodeStatus::new(StatusFill::Grey, StatusShape::Ring, NOT_ACTIVATED_TEXT)
            };
            debug!(device_id = %self.id(), activated, "Deploy result received");
            self.lock_state().status = Some(status.clone());
            self.sink.on_status(status);
        }

        if addressed_to(payload.get("id"), self.id()) {
            self.lock_state().last_message = Some(payload.clone());
            self.sink.on_message(payload.clone());
        }
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        let entry = self.config.entry();
        let state = self.lock_state();
        DeviceSnapshot {
            id: self.config.id.clone(),
            name: entry.name,
            device_type: entry.device_type,
            status: state.status.clone(),
            last_message: state.last_message.clone(),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// addressed_to compares a payload's `id` with a node id. Ids that are not
// strings are compared by their JSON text, so `7` matches node "7".
fn addressed_to(id: Option<&Value>, node_id: &str) -> bool {
    match id {
        None | Some(Value::Null) => false,
        Some(Value::String(id)) => id == node_id,
        Some(other) => other.to_string() == node_id,
    }
}
