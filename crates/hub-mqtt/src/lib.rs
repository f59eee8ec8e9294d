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

// src/lib.rs
// Broker session management for a hub: one mTLS MQTT session at a time,
// rebuilt whenever a deploy hands out new connection parameters.

pub mod errors;
pub mod options;
pub mod params;
pub mod payload;
pub mod session;
pub mod stats;
pub mod transport;

// Export some things for convenience.
pub use errors::{PayloadError, SessionError};
pub use options::SessionOptions;
pub use params::ConnectionParameters;
pub use payload::decode_payload;
pub use rumqttc::QoS;
pub use session::{
    RebuildOutcome, RebuildRequest, SessionManager, SessionState, device_update_topic,
};
pub use stats::{InboundStats, InboundStatsTracker};
pub use transport::{
    BrokerConnection, BrokerConnector, InboundEvent, OpenedConnection, RumqttcConnector,
};
