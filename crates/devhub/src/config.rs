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

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use duration_str::deserialize_duration;
use hub_mqtt::SessionOptions;
use serde::{Deserialize, Serialize, Serializer};

use crate::flow::NodeConfig;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
/// Configuration for devhub. Fields are documented as comments in the output of [`Config::into_annotated_config_file`].
pub struct Config {
    #[serde(default = "Defaults::listen_address")]
    pub listen_address: SocketAddr,
    #[serde(default = "Defaults::api_url")]
    pub api_url: String,
    #[serde(
        default = "Defaults::request_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IdentityConfig {
    #[serde(default = "Defaults::region")]
    pub region: String,
    #[serde(default = "Defaults::client_id")]
    pub client_id: String,
    // endpoint overrides the regional identity provider URL
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            region: Defaults::region(),
            client_id: Defaults::client_id(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BrokerConfig {
    #[serde(default)]
    pub ca_certificate_path: Option<PathBuf>,
    #[serde(
        default = "Defaults::keep_alive",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub keep_alive: Duration,
    #[serde(
        default = "Defaults::connect_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub connect_timeout: Duration,
    #[serde(
        default = "Defaults::ack_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub ack_timeout: Duration,
    #[serde(
        default = "Defaults::reconnect_delay",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub reconnect_delay: Duration,
    #[serde(
        default = "Defaults::close_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub close_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            ca_certificate_path: None,
            keep_alive: Defaults::keep_alive(),
            connect_timeout: Defaults::connect_timeout(),
            ack_timeout: Defaults::ack_timeout(),
            reconnect_delay: Defaults::reconnect_delay(),
            close_timeout: Defaults::close_timeout(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg = std::fs::read_to_string(path).map_err(|error| ConfigError::CouldNotRead {
            path: path.to_string_lossy().to_string(),
            error,
        })?;
        toml::from_str::<Self>(&cfg).map_err(|error| ConfigError::InvalidToml {
            path: path.to_string_lossy().to_string(),
            error,
        })
    }

    pub fn identity_config(&self) -> hub_identity::Config {
        hub_identity::Config {
            region: self.identity.region.clone(),
            client_id: self.identity.client_id.clone(),
            endpoint: self.identity.endpoint.clone(),
            timeout: self.request_timeout,
        }
    }

    // session_options reads the broker CA certificate, when one is
    // configured, along with the broker timings.
    pub fn session_options(&self) -> Result<SessionOptions, ConfigError> {
        let broker = &self.broker;
        let mut options = SessionOptions::default()
            .with_keep_alive(broker.keep_alive)
            .with_connect_timeout(broker.connect_timeout)
            .with_ack_timeout(broker.ack_timeout)
            .with_reconnect_delay(broker.reconnect_delay)
            .with_close_timeout(broker.close_timeout);

        if let Some(path) = &broker.ca_certificate_path {
            let pem = std::fs::read(path).map_err(|error| ConfigError::CouldNotRead {
                path: path.to_string_lossy().to_string(),
                error,
            })?;
            options = options.with_ca_certificate(pem);
        }
        Ok(options)
    }

    pub fn into_annotated_config_file(self) -> String {
        let Self {
            listen_address,
            api_url,
            request_timeout,
            identity,
            broker,
            nodes: _,
        } = self;
        let listen_address = listen_address.to_string();
        let request_timeout = format!("{}s", request_timeout.as_secs());
        let IdentityConfig {
            region,
            client_id,
            endpoint: _,
        } = identity;
        let BrokerConfig {
            ca_certificate_path: _,
            keep_alive,
            connect_timeout,
            ack_timeout,
            reconnect_delay,
            close_timeout,
        } = broker;
        let keep_alive = format!("{}s", keep_alive.as_secs());
        let connect_timeout = format!("{}s", connect_timeout.as_secs());
        let ack_timeout = format!("{}s", ack_timeout.as_secs());
        let reconnect_delay = format!("{}s", reconnect_delay.as_secs());
        let close_timeout = format!("{}s", close_timeout.as_secs());

        format!(
            r#"
#####
## This is a default config file for devhub. Everything in this file is optional: Any non-comment
## line in this file simply represents default values. Commented lines with a single `#` represent
## examples for optional configuration which is not part of the default config.
#####

## Address the HTTP endpoints (subscription redirects, device input, redeploy) listen on.
listen_address = {listen_address:?}

## Base URL of the hub API
api_url = {api_url:?}

## Timeout for every request to the hub API and the identity provider
request_timeout = {request_timeout:?}

[identity]
## Region of the identity provider user pool
region = {region:?}

## App client id hubs sign in with
client_id = {client_id:?}

## Override the identity provider URL (useful for testing against a mock)
# endpoint = "http://127.0.0.1:9229/"

[broker]
## CA certificate the broker's TLS certificate is verified against. When unset the
## platform's trusted root certificates are used.
# ca_certificate_path = "/etc/devhub/broker-ca.pem"

## MQTT keepalive interval
keep_alive = {keep_alive:?}

## How long to wait for the broker to accept a connection
connect_timeout = {connect_timeout:?}

## How long to wait for the broker to acknowledge a subscription
ack_timeout = {ack_timeout:?}

## How long to wait before reconnecting after the connection drops
reconnect_delay = {reconnect_delay:?}

## How long a clean disconnect may take before the connection is dropped
close_timeout = {close_timeout:?}

## The flow: hub nodes and the device nodes wired to them.
# [[nodes]]
# type = "hub"
# id = "hub-1"
# email = "someone@example.com"
# password = "secret"
# wires = [["lamp-1"]]
#
# [[nodes]]
# type = "device"
# id = "lamp-1"
# name = "Kitchen lamp"   # defaults to "Unnamed"
# device_type = "light"   # defaults to "light"
"#
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: Defaults::listen_address(),
            api_url: Defaults::api_url(),
            request_timeout: Defaults::request_timeout(),
            identity: IdentityConfig::default(),
            broker: BrokerConfig::default(),
            nodes: vec![],
        }
    }
}

pub struct Defaults;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file at {path}: {error}")]
    CouldNotRead { path: String, error: std::io::Error },
    #[error("TOML error reading config file at {path}: {error}")]
    InvalidToml {
        path: String,
        error: toml::de::Error,
    },
}

impl Defaults {
    pub fn listen_address() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 1880))
    }

    pub fn api_url() -> String {
        "https://api.dulonode.com".to_string()
    }

    pub fn request_timeout() -> Duration {
        hub_api::DEFAULT_TIMEOUT
    }

    pub fn region() -> String {
        "us-east-1".to_string()
    }

    pub fn client_id() -> String {
        "2939p25a4thbgs3a8rk5nud8mr".to_string()
    }

    pub fn keep_alive() -> Duration {
        hub_mqtt::options::DEFAULT_KEEP_ALIVE
    }

    pub fn connect_timeout() -> Duration {
        hub_mqtt::options::DEFAULT_CONNECT_TIMEOUT
    }

    pub fn ack_timeout() -> Duration {
        hub_mqtt::options::DEFAULT_ACK_TIMEOUT
    }

    pub fn reconnect_delay() -> Duration {
        hub_mqtt::options::DEFAULT_RECONNECT_DELAY
    }

    pub fn close_timeout() -> Duration {
        hub_mqtt::options::DEFAULT_CLOSE_TIMEOUT
    }
}

fn serialize_duration<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{}s", d.as_secs()))
}
