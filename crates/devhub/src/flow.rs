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

// The flow: which hub and device nodes exist and how they are wired.

use std::collections::HashSet;
use std::fmt;

use hub_api::{DeviceEntry, DeviceMap};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_DEVICE_NAME: &str = "Unnamed";
pub const DEFAULT_DEVICE_TYPE: &str = "light";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeConfig {
    Hub(HubNodeConfig),
    Device(DeviceNodeConfig),
}

impl NodeConfig {
    pub fn id(&self) -> &str {
        match self {
            Self::Hub(hub) => &hub.id,
            Self::Device(device) => &device.id,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubNodeConfig {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    // wires holds one list of target node ids per hub output.
    #[serde(default)]
    pub wires: Vec<Vec<String>>,
}

impl fmt::Debug for HubNodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubNodeConfig")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("wires", &self.wires)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNodeConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
}

impl DeviceNodeConfig {
    // entry is what gets deployed for this device, with the defaults for
    // missing (or empty) name and type filled in.
    pub fn entry(&self) -> DeviceEntry {
        DeviceEntry {
            name: non_empty(&self.name).unwrap_or(DEFAULT_DEVICE_NAME).to_string(),
            device_type: non_empty(&self.device_type)
                .unwrap_or(DEFAULT_DEVICE_TYPE)
                .to_string(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FlowError {
    #[error("Node id {0} is declared more than once")]
    DuplicateNodeId(String),
}

#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    nodes: Vec<NodeConfig>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<NodeConfig>) -> Result<Self, FlowError> {
        let mut seen = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.id().to_string()) {
                return Err(FlowError::DuplicateNodeId(node.id().to_string()));
            }
        }

        let graph = Self { nodes };
        for hub in graph.hubs() {
            for target in hub.wires.iter().flatten() {
                if !seen.contains(target) {
                    warn!(hub_id = %hub.id, %target, "Hub is wired to an unknown node");
                }
            }
        }
        Ok(graph)
    }

    pub fn hubs(&self) -> impl Iterator<Item = &HubNodeConfig> {
        self.nodes.iter().filter_map(|node| match node {
            NodeConfig::Hub(hub) => Some(hub),
            NodeConfig::Device(_) => None,
        })
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceNodeConfig> {
        self.nodes.iter().filter_map(|node| match node {
            NodeConfig::Device(device) => Some(device),
            NodeConfig::Hub(_) => None,
        })
    }

    pub fn hub(&self, id: &str) -> Option<&HubNodeConfig> {
        self.hubs().find(|hub| hub.id == id)
    }

    // wired_device_ids lists the device nodes reachable from any output of
    // the hub, in wiring order, each once. Wires to anything that is not a
    // device node are skipped.
    pub fn wired_device_ids(&self, hub_id: &str) -> Vec<String> {
        let Some(hub) = self.hub(hub_id) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        hub.wires
            .iter()
            .flatten()
            .filter(|target| self.devices().any(|device| &device.id == *target))
            .filter(|target| seen.insert(target.as_str()))
            .cloned()
            .collect()
    }

    // wired_devices is the deploy body for a hub: id -> {name, type}.
    pub fn wired_devices(&self, hub_id: &str) -> DeviceMap {
        self.wired_device_ids(hub_id)
            .into_iter()
            .filter_map(|id| {
                let device = self.devices().find(|device| device.id == id)?;
                Some((id, device.entry()))
            })
            .collect()
    }
}
