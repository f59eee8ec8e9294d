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

// src/testing.rs
// RecordingSink keeps everything reported to it, for use in tests of
// components that report through an EventSink.

use std::sync::{Mutex, PoisonError};

use crate::{EventSink, NodeStatus};

#[derive(Debug, Default)]
pub struct RecordingSink {
    statuses: Mutex<Vec<NodeStatus>>,
    events: Mutex<Vec<serde_json::Value>>,
    messages: Mutex<Vec<serde_json::Value>>,
}

impl RecordingSink {
    pub fn statuses(&self) -> Vec<NodeStatus> {
        self.statuses.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn events(&self) -> Vec<serde_json::Value> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn messages(&self) -> Vec<serde_json::Value> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // status_texts returns only the text of each status, which is what
    // most assertions care about.
    pub fn status_texts(&self) -> Vec<String> {
        self.statuses().into_iter().map(|s| s.text).collect()
    }

    // event_messages returns the `message` field of every event that
    // has one.
    pub fn event_messages(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
            .map(str::to_string)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn on_status(&self, status: NodeStatus) {
        self.statuses.lock().unwrap_or_else(PoisonError::into_inner).push(status);
    }

    fn on_event(&self, event: serde_json::Value) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }

    fn on_message(&self, payload: serde_json::Value) {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).push(payload);
    }
}
