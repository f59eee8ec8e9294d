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

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of `POST /hub/deploy`: device id -> what the device is.
pub type DeviceMap = BTreeMap<String, DeviceEntry>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
}

/// Every response from the API wraps its payload in `data`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// Response of a deploy. Every field is optional and is acted upon
/// independently of the others.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResult {
    #[serde(default)]
    pub min_version: Option<String>,
    #[serde(default)]
    pub auth: Option<BrokerAuth>,
    #[serde(default)]
    pub devices: Option<Vec<String>>,
}

impl DeployResult {
    // required_version treats an empty minVersion like a missing one.
    // Without a required version the gate is skipped, and the auth and
    // devices of the same response are still applied.
    pub fn required_version(&self) -> Option<&str> {
        self.min_version.as_deref().filter(|v| !v.is_empty())
    }
}

/// Broker credentials issued with a successful deploy.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerAuth {
    pub certificate: String,
    #[serde(rename = "private")]
    pub private_key: String,
    pub endpoint: String,
}

impl fmt::Debug for BrokerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerAuth")
            .field("endpoint", &self.endpoint)
            .field("certificate", &format_args!("<{} bytes>", self.certificate.len()))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubscriptionLink {
    #[serde(default)]
    pub url: Option<String>,
}

/// Subscription pages the API can hand out a link to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionAction {
    Upgrade,
    Manage,
}

impl SubscriptionAction {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Upgrade => "subscription/upgrade",
            Self::Manage => "subscription/manage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_result_parses_partial_payloads() {
        let result: DeployResult =
            serde_json::from_str(r#"{"minVersion":"1.0.0","devices":["devA"]}"#).unwrap();
        assert_eq!(result.required_version(), Some("1.0.0"));
        assert!(result.auth.is_none());
        assert_eq!(result.devices, Some(vec!["devA".to_string()]));

        let result: DeployResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result, DeployResult::default());
    }

    #[test]
    fn empty_min_version_is_not_required() {
        let result: DeployResult = serde_json::from_str(r#"{"minVersion":""}"#).unwrap();
        assert_eq!(result.required_version(), None);
    }

    #[test]
    fn broker_auth_uses_private_field_and_hides_it() {
        let auth: BrokerAuth = serde_json::from_str(
            r#"{"certificate":"CERT","private":"TOPSECRET","endpoint":"abc.iot.example.com"}"#,
        )
        .unwrap();
        assert_eq!(auth.private_key, "TOPSECRET");
        assert!(!format!("{auth:?}").contains("TOPSECRET"));
    }

    #[test]
    fn device_entry_serializes_type() {
        let mut devices = DeviceMap::new();
        devices.insert(
            "n1".to_string(),
            DeviceEntry {
                name: "Lamp".to_string(),
                device_type: "light".to_string(),
            },
        );
        assert_eq!(
            serde_json::to_value(&devices).unwrap(),
            serde_json::json!({"n1": {"name": "Lamp", "type": "light"}})
        );
    }
}
