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

// src/params.rs
// Connection parameters handed out by a deploy.
use std::fmt;

use crate::errors::SessionError;

// DEFAULT_BROKER_PORT is the MQTT-over-TLS port, used when the endpoint
// carries no explicit port.
pub const DEFAULT_BROKER_PORT: u16 = 8883;

// ConnectionParameters are everything needed to open a mutually
// authenticated broker session. A new value always supersedes the
// previous one.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    // endpoint is `host` or `host:port`.
    pub endpoint: String,
    // certificate is the PEM client certificate.
    pub certificate: String,
    // private_key is the PEM key matching `certificate`.
    pub private_key: String,
}

impl ConnectionParameters {
    pub fn new(
        endpoint: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            certificate: certificate.into(),
            private_key: private_key.into(),
        }
    }

    // host_and_port splits the endpoint, defaulting the port to
    // DEFAULT_BROKER_PORT.
    pub fn host_and_port(&self) -> Result<(String, u16), SessionError> {
        let endpoint = self.endpoint.trim();
        let (host, port) = match endpoint.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| SessionError::InvalidEndpoint(endpoint.to_string()))?;
                (host, port)
            }
            None => (endpoint, DEFAULT_BROKER_PORT),
        };

        if host.is_empty() || host.contains('/') {
            return Err(SessionError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok((host.to_string(), port))
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("endpoint", &self.endpoint)
            .field("certificate", &format_args!("<{} bytes>", self.certificate.len()))
            .field("private_key", &"<redacted>")
            .finish()
    }
}
