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

// src/errors.rs
// Error types for broker sessions and inbound payloads.
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid broker endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("{0}")]
    ConnectionError(String),

    #[error("MQTT client request failed: {0}")]
    ClientError(#[from] rumqttc::ClientError),

    #[error("Subscription to {0} was rejected by the broker")]
    SubscriptionRejected(String),

    #[error("Timed out after {after:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: &'static str,
        after: Duration,
    },

    #[error("Broker connection closed while waiting for {0}")]
    ChannelClosed(&'static str),

    #[error("Session manager has been shut down")]
    ShutDown,
}

impl SessionError {
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError(message.into())
    }

    pub fn timeout(waiting_for: &'static str, after: Duration) -> Self {
        Self::Timeout { waiting_for, after }
    }
}

// PayloadError is raised for inbound messages that cannot be forwarded.
// It never affects the session that delivered the message.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Empty payload received from MQTT")]
    Empty,

    #[error("Invalid UTF-8 in MQTT payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Error parsing JSON payload: {0}")]
    Parse(#[from] serde_json::Error),
}
