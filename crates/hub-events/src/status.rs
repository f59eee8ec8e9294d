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

// src/status.rs
// Node status indicator types.

use std::fmt;

use serde::{Deserialize, Serialize};

// StatusKind is the category of a status report. It is also the
// `status` field of `{status, message}` events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
    Loading,
    Idle,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Loading => "loading",
            Self::Idle => "idle",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFill {
    Green,
    Red,
    Yellow,
    Grey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusShape {
    Dot,
    Ring,
}

// NodeStatus is the icon + text shown for a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub fill: StatusFill,
    pub shape: StatusShape,
    pub text: String,
}

impl NodeStatus {
    pub fn new(fill: StatusFill, shape: StatusShape, text: impl Into<String>) -> Self {
        Self {
            fill,
            shape,
            text: text.into(),
        }
    }

    // from_kind maps a report kind to its icon:
    // success -> green dot, error -> red ring, loading -> yellow dot,
    // anything else -> grey ring.
    pub fn from_kind(kind: StatusKind, text: impl Into<String>) -> Self {
        let (fill, shape) = match kind {
            StatusKind::Success => (StatusFill::Green, StatusShape::Dot),
            StatusKind::Error => (StatusFill::Red, StatusShape::Ring),
            StatusKind::Loading => (StatusFill::Yellow, StatusShape::Dot),
            StatusKind::Idle => (StatusFill::Grey, StatusShape::Ring),
        };
        Self::new(fill, shape, text)
    }
}
