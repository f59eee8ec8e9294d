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

// src/session.rs
// SessionManager owns the single live broker session of a hub.
//
// Every rebuild tears the previous session down before the next one is
// opened, and the previous session's reader is stopped first, so nothing
// from an old session is delivered after the new one reports connected.

use std::sync::Arc;

use hub_events::{EventSink, StatusKind, report};
use rumqttc::QoS;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::SessionError;
use crate::options::SessionOptions;
use crate::params::ConnectionParameters;
use crate::payload::decode_payload;
use crate::stats::{InboundStats, InboundStatsTracker};
use crate::transport::{BrokerConnection, BrokerConnector, InboundEvent};

// DEVICE_UPDATE_QOS is the QoS hubs subscribe to device updates with.
pub const DEVICE_UPDATE_QOS: QoS = QoS::AtLeastOnce;

// device_update_topic is the topic device state updates for `subject`
// are published on.
pub fn device_update_topic(subject: &str) -> String {
    format!("hub/{subject}/device/update")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    // Connected means the broker accepted the session. `subscribed` is
    // false when the device update subscription was refused; the session
    // stays open regardless.
    Connected { subscribed: bool },
    // Closed is terminal: the manager has been shut down.
    Closed,
}

#[derive(Clone, Debug)]
pub struct RebuildRequest {
    // generation orders rebuilds: a request older than the last applied
    // one is discarded.
    pub generation: u64,
    pub params: ConnectionParameters,
    // subject is both the client id and part of the subscribed topic.
    pub subject: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    Rebuilt { subscribed: bool },
    Stale { generation: u64, applied: u64 },
}

struct ActiveSession {
    connection: Box<dyn BrokerConnection>,
    reader: JoinHandle<()>,
    generation: u64,
    topic: String,
}

#[derive(Default)]
struct Inner {
    active: Option<ActiveSession>,
    applied_generation: Option<u64>,
    closed: bool,
}

pub struct SessionManager {
    connector: Arc<dyn BrokerConnector>,
    options: SessionOptions,
    sink: Arc<dyn EventSink>,
    stats: Arc<InboundStatsTracker>,
    state: watch::Sender<SessionState>,
    // inner is held across a whole rebuild or close, which serializes
    // them.
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(
        connector: Arc<dyn BrokerConnector>,
        options: SessionOptions,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            connector,
            options,
            sink,
            stats: Arc::new(InboundStatsTracker::new()),
            state,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    // watch_state returns a receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn stats(&self) -> InboundStats {
        self.stats.to_stats()
    }

    // active_generation is the generation of the open session, if any.
    pub async fn active_generation(&self) -> Option<u64> {
        self.inner.lock().await.active.as_ref().map(|a| a.generation)
    }

    fn set_state(&self, state: SessionState) {
        debug!(?state, "MQTT session state changed");
        self.state.send_replace(state);
    }

    // rebuild replaces whatever session is open with one built from
    // `request.params`, then subscribes to the subject's device updates.
    //
    // Connect failures are reported and returned. A refused
    // subscription is reported but the session is kept.
    pub async fn rebuild(&self, request: RebuildRequest) -> Result<RebuildOutcome, SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(SessionError::ShutDown);
        }
        if let Some(applied) = inner.applied_generation
            && request.generation < applied
        {
            debug!(
                generation = request.generation,
                applied, "Discarding rebuild from an older deploy"
            );
            return Ok(RebuildOutcome::Stale {
                generation: request.generation,
                applied,
            });
        }
        inner.applied_generation = Some(request.generation);

        self.teardown(&mut inner).await;
        self.set_state(SessionState::Connecting);

        let opened = match self
            .connector
            .connect(&request.params, &request.subject, &self.options)
            .await
        {
            Ok(opened) => opened,
            Err(e) => {
                report(
                    &*self.sink,
                    StatusKind::Error,
                    "MQTT error",
                    &format!("MQTT Client Error: {e}"),
                );
                self.set_state(SessionState::Disconnected);
                return Err(e);
            }
        };

        let reader = tokio::spawn(read_inbound(
            opened.inbound,
            self.sink.clone(),
            self.stats.clone(),
        ));

        let topic = device_update_topic(&request.subject);
        let subscribed = match opened.connection.subscribe(&topic, DEVICE_UPDATE_QOS).await {
            Ok(()) => {
                info!(%topic, generation = request.generation, "Subscribed to device updates");
                report(&*self.sink, StatusKind::Success, "connected", "");
                true
            }
            Err(e) => {
                report(
                    &*self.sink,
                    StatusKind::Error,
                    "error",
                    &format!("Error subscribing to topic: {e}"),
                );
                false
            }
        };

        inner.active = Some(ActiveSession {
            connection: opened.connection,
            reader,
            generation: request.generation,
            topic,
        });
        self.set_state(SessionState::Connected { subscribed });
        Ok(RebuildOutcome::Rebuilt { subscribed })
    }

    // close ends the open session, if there is one. A broker error while
    // disconnecting is reported, and the session counts as closed anyway.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        self.teardown(&mut inner).await;
        if !inner.closed {
            self.set_state(SessionState::Disconnected);
        }
    }

    // shutdown closes the session and refuses every later rebuild.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        self.teardown(&mut inner).await;
        inner.closed = true;
        self.set_state(SessionState::Closed);
    }

    async fn teardown(&self, inner: &mut Inner) {
        let Some(active) = inner.active.take() else {
            return;
        };
        debug!(topic = %active.topic, generation = active.generation, "Closing MQTT session");

        active.reader.abort();
        let _ = active.reader.await;

        if let Err(e) = active.connection.disconnect().await {
            report(
                &*self.sink,
                StatusKind::Error,
                "MQTT error",
                &format!("Error stopping MQTT client: {e}"),
            );
        }
    }
}

// read_inbound forwards decoded payloads until the connection's inbound
// channel closes or the task is aborted.
async fn read_inbound(
    mut inbound: tokio::sync::mpsc::Receiver<InboundEvent>,
    sink: Arc<dyn EventSink>,
    stats: Arc<InboundStatsTracker>,
) {
    while let Some(event) = inbound.recv().await {
        match event {
            InboundEvent::Message(bytes) => match decode_payload(&bytes) {
                Ok(payload) => {
                    stats.increment_forwarded(bytes.len());
                    sink.on_message(payload);
                }
                Err(e) => {
                    stats.increment_rejected();
                    report(&*sink, StatusKind::Error, "", &e.to_string());
                }
            },
            InboundEvent::Error(message) => {
                report(
                    &*sink,
                    StatusKind::Error,
                    "MQTT error",
                    &format!("MQTT Client Error: {message}"),
                );
            }
        }
    }
}
