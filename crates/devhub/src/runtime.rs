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

// Runtime builds every node of a flow and wires hub output to the device
// nodes connected to it.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;
use hub_events::{EventSink, NodeStatus};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::device::{DeviceNode, DeviceSnapshot};
use crate::flow::FlowGraph;
use crate::hub::{HubDependencies, HubNode};

// HubOutput is the sink a hub reports through: statuses are logged, and
// events and messages go to every device node wired to the hub.
pub struct HubOutput {
    hub_id: String,
    wired: Vec<Arc<DeviceNode>>,
}

impl EventSink for HubOutput {
    fn on_status(&self, status: NodeStatus) {
        info!(
            hub_id = %self.hub_id,
            fill = ?status.fill,
            shape = ?status.shape,
            "{}",
            status.text
        );
    }

    fn on_event(&self, event: Value) {
        debug!(hub_id = %self.hub_id, %event, "Hub event");
        self.dispatch(&event);
    }

    fn on_message(&self, payload: Value) {
        debug!(hub_id = %self.hub_id, %payload, "Device update");
        self.dispatch(&payload);
    }
}

impl HubOutput {
    fn dispatch(&self, payload: &Value) {
        for device in &self.wired {
            device.handle_input(payload);
        }
    }
}

// DeviceOutput is the sink of a device node, the end of the flow.
struct DeviceOutput {
    device_id: String,
}

impl EventSink for DeviceOutput {
    fn on_status(&self, status: NodeStatus) {
        info!(device_id = %self.device_id, fill = ?status.fill, "{}", status.text);
    }

    fn on_event(&self, event: Value) {
        debug!(device_id = %self.device_id, %event, "Device event");
    }

    fn on_message(&self, payload: Value) {
        info!(device_id = %self.device_id, %payload, "Device state update");
    }
}

pub struct Runtime {
    flow: Arc<FlowGraph>,
    hubs: BTreeMap<String, Arc<HubNode>>,
    devices: BTreeMap<String, Arc<DeviceNode>>,
}

impl Runtime {
    pub fn new(flow: FlowGraph, deps: &HubDependencies) -> Self {
        let flow = Arc::new(flow);

        let devices: BTreeMap<String, Arc<DeviceNode>> = flow
            .devices()
            .map(|config| {
                let sink = Arc::new(DeviceOutput {
                    device_id: config.id.clone(),
                });
                (
                    config.id.clone(),
                    Arc::new(DeviceNode::new(config.clone(), sink)),
                )
            })
            .collect();

        let hubs = flow
            .hubs()
            .map(|config| {
                let wired = flow
                    .wired_device_ids(&config.id)
                    .iter()
                    .filter_map(|id| devices.get(id).cloned())
                    .collect();
                let output = Arc::new(HubOutput {
                    hub_id: config.id.clone(),
                    wired,
                });
                let hub = HubNode::new(config, flow.clone(), deps, output);
                (config.id.clone(), Arc::new(hub))
            })
            .collect();

        Self {
            flow,
            hubs,
            devices,
        }
    }

    pub fn hub(&self, id: &str) -> Option<Arc<HubNode>> {
        self.hubs.get(id).cloned()
    }

    pub fn hubs(&self) -> impl Iterator<Item = &Arc<HubNode>> {
        self.hubs.values()
    }

    pub fn device(&self, id: &str) -> Option<Arc<DeviceNode>> {
        self.devices.get(id).cloned()
    }

    // wired_devices is a snapshot of every device node wired to a hub.
    pub fn wired_devices(&self, hub_id: &str) -> Vec<DeviceSnapshot> {
        self.flow
            .wired_device_ids(hub_id)
            .iter()
            .filter_map(|id| self.devices.get(id))
            .map(|device| device.snapshot())
            .collect()
    }

    // start runs the initial deploy of every hub. Failures have already
    // been reported by the hubs themselves.
    pub async fn start(&self) {
        let results = join_all(self.hubs.values().map(|hub| hub.start())).await;
        for (hub, result) in self.hubs.values().zip(results) {
            if let Err(e) = result {
                warn!(hub_id = %hub.id(), "Initial deploy failed: {e}");
            }
        }
    }

    pub async fn shutdown(&self) {
        join_all(self.hubs.values().map(|hub| hub.shutdown())).await;
    }
}
