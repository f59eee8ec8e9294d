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

// src/options.rs
// Tunables for broker sessions.
use std::time::Duration;

// DEFAULT_KEEP_ALIVE is the keepalive interval the broker expects from hubs.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(120);
pub const DEFAULT_MESSAGE_CHANNEL_CAPACITY: usize = 64;
pub const DEFAULT_CLIENT_QUEUE_SIZE: usize = 256;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// SessionOptions are optional parameters for broker sessions, all of
// which fall back to the DEFAULT_* consts above when unset.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    // keep_alive sets the keepalive to use for broker connections.
    pub keep_alive: Option<Duration>,
    // message_channel_capacity is the number of requests the underlying
    // async client buffers before callers wait.
    pub message_channel_capacity: Option<usize>,
    // client_queue_size limits how many inbound messages can sit between
    // the event loop and the session reader before new ones are dropped.
    pub client_queue_size: Option<usize>,
    // connect_timeout bounds the wait for the broker's CONNACK.
    pub connect_timeout: Option<Duration>,
    // ack_timeout bounds the wait for a SUBACK.
    pub ack_timeout: Option<Duration>,
    // reconnect_delay is the pause between reconnect attempts after the
    // transport reports an error.
    pub reconnect_delay: Option<Duration>,
    // close_timeout bounds how long a disconnect may take before the
    // event loop is aborted.
    pub close_timeout: Option<Duration>,
    // ca_certificate is PEM bytes for the CA (or bundle) that signed
    // the broker's server certificate.
    pub ca_certificate: Option<Vec<u8>>,
}

impl SessionOptions {
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = Some(timeout);
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = Some(delay);
        self
    }

    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = Some(timeout);
        self
    }

    pub fn with_client_queue_size(mut self, size: usize) -> Self {
        self.client_queue_size = Some(size);
        self
    }

    pub fn with_ca_certificate(mut self, pem: Vec<u8>) -> Self {
        self.ca_certificate = Some(pem);
        self
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE)
    }

    pub fn message_channel_capacity(&self) -> usize {
        self.message_channel_capacity
            .unwrap_or(DEFAULT_MESSAGE_CHANNEL_CAPACITY)
    }

    pub fn client_queue_size(&self) -> usize {
        self.client_queue_size.unwrap_or(DEFAULT_CLIENT_QUEUE_SIZE)
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn ack_timeout(&self) -> Duration {
        self.ack_timeout.unwrap_or(DEFAULT_ACK_TIMEOUT)
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay.unwrap_or(DEFAULT_RECONNECT_DELAY)
    }

    pub fn close_timeout(&self) -> Duration {
        self.close_timeout.unwrap_or(DEFAULT_CLOSE_TIMEOUT)
    }
}
