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

// tests/fake_broker.rs
// In-memory broker used to drive SessionManager without a network.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hub_mqtt::{
    BrokerConnection, BrokerConnector, ConnectionParameters, InboundEvent, OpenedConnection, QoS,
    SessionError, SessionOptions,
};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
pub struct FakeBroker {
    log: Mutex<Vec<String>>,
    senders: Mutex<Vec<mpsc::Sender<InboundEvent>>>,
    open: AtomicUsize,
    pub fail_connect: AtomicBool,
    pub fail_subscribe: AtomicBool,
    pub fail_disconnect: AtomicBool,
}

impl FakeBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connector(self: &Arc<Self>) -> Arc<dyn BrokerConnector> {
        Arc::new(FakeConnector {
            broker: self.clone(),
        })
    }

    // log is every broker call so far, e.g. "connect broker-1 subject".
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    // sender returns the inbound channel of the n-th connection opened.
    pub fn sender(&self, n: usize) -> mpsc::Sender<InboundEvent> {
        self.senders.lock().unwrap()[n].clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

struct FakeConnector {
    broker: Arc<FakeBroker>,
}

#[async_trait]
impl BrokerConnector for FakeConnector {
    async fn connect(
        &self,
        params: &ConnectionParameters,
        client_id: &str,
        _options: &SessionOptions,
    ) -> Result<OpenedConnection, SessionError> {
        if self.broker.fail_connect.load(Ordering::SeqCst) {
            return Err(SessionError::connection_error("connection refused"));
        }
        // give concurrent callers a chance to interleave
        tokio::time::sleep(Duration::from_millis(5)).await;

        self.broker
            .record(format!("connect {} {client_id}", params.endpoint));
        self.broker.open.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(16);
        self.broker.senders.lock().unwrap().push(tx);
        Ok(OpenedConnection {
            connection: Box::new(FakeConnection {
                broker: self.broker.clone(),
                endpoint: params.endpoint.clone(),
            }),
            inbound: rx,
        })
    }
}

struct FakeConnection {
    broker: Arc<FakeBroker>,
    endpoint: String,
}

#[async_trait]
impl BrokerConnection for FakeConnection {
    async fn subscribe(&self, topic: &str, _qos: QoS) -> Result<(), SessionError> {
        self.broker.record(format!("subscribe {topic}"));
        if self.broker.fail_subscribe.load(Ordering::SeqCst) {
            return Err(SessionError::SubscriptionRejected(topic.to_string()));
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SessionError> {
        self.broker.record(format!("disconnect {}", self.endpoint));
        self.broker.open.fetch_sub(1, Ordering::SeqCst);
        if self.broker.fail_disconnect.load(Ordering::SeqCst) {
            return Err(SessionError::connection_error("broker went away"));
        }
        Ok(())
    }
}
