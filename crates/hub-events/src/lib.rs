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
// Status and event reporting shared by hub components.
//
// Components never talk to the host runtime directly. They get an
// EventSink at construction time, and everything an operator or a
// downstream node should see goes through it.

pub mod status;
pub mod testing;

pub use status::{NodeStatus, StatusFill, StatusKind, StatusShape};

use serde_json::json;

// EventSink is the side channel from a node instance back to whatever
// hosts it.
//
// on_status updates the brief status shown next to the node, on_event
// emits a structured notification downstream (status/error details,
// deployment results), and on_message forwards a raw broker payload.
pub trait EventSink: Send + Sync + 'static {
    fn on_status(&self, status: NodeStatus);

    fn on_event(&self, event: serde_json::Value);

    fn on_message(&self, payload: serde_json::Value);
}

// report updates the node status with `text` (when non-empty) and emits
// a `{status, message}` event with `detail` (when non-empty). Either
// half can be skipped by passing an empty string.
pub fn report(sink: &dyn EventSink, kind: StatusKind, text: &str, detail: &str) {
    if !text.is_empty() {
        sink.on_status(NodeStatus::from_kind(kind, text));
    }

    if !detail.is_empty() {
        match kind {
            StatusKind::Error => tracing::warn!(status = %kind, "{detail}"),
            _ => tracing::debug!(status = %kind, "{detail}"),
        }
        sink.on_event(json!({
            "status": kind,
            "message": detail,
        }));
    }
}

impl<T: EventSink> EventSink for std::sync::Arc<T> {
    fn on_status(&self, status: NodeStatus) {
        T::on_status(self, status)
    }

    fn on_event(&self, event: serde_json::Value) {
        T::on_event(self, event)
    }

    fn on_message(&self, payload: serde_json::Value) {
        T::on_message(self, payload)
    }
}
