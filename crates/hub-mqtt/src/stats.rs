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

// src/stats.rs
// Inbound message statistics for a hub's broker sessions.
//
// Counters are shared by every session a SessionManager opens, so they
// survive rebuilds.

use std::sync::atomic::{AtomicUsize, Ordering};

// InboundStats stores a snapshot of inbound message statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundStats {
    // total_received is every payload delivered by the broker.
    pub total_received: usize,
    // total_forwarded is payloads that decoded and were handed on.
    pub total_forwarded: usize,
    // total_rejected is payloads that failed to decode.
    pub total_rejected: usize,
    // total_bytes_forwarded is the size of forwarded payloads.
    pub total_bytes_forwarded: usize,
}

// InboundStatsTracker updates inbound statistics with atomics so the
// session reader never waits on a lock to count.
#[derive(Debug, Default)]
pub struct InboundStatsTracker {
    received_count: AtomicUsize,
    forwarded_count: AtomicUsize,
    rejected_count: AtomicUsize,
    forwarded_bytes: AtomicUsize,
}

impl InboundStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // increment_forwarded records a payload that decoded and was
    // forwarded. (e.g. increment_forwarded(512) for a 512-byte message).
    pub fn increment_forwarded(&self, bytes: usize) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
        self.forwarded_count.fetch_add(1, Ordering::Relaxed);
        self.forwarded_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    // increment_rejected records a payload that was empty or not JSON.
    pub fn increment_rejected(&self) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset_counters(&self) {
        self.received_count.store(0, Ordering::Relaxed);
        self.forwarded_count.store(0, Ordering::Relaxed);
        self.rejected_count.store(0, Ordering::Relaxed);
        self.forwarded_bytes.store(0, Ordering::Relaxed);
    }

    pub fn to_stats(&self) -> InboundStats {
        InboundStats {
            total_received: self.received_count.load(Ordering::Relaxed),
            total_forwarded: self.forwarded_count.load(Ordering::Relaxed),
            total_rejected: self.rejected_count.load(Ordering::Relaxed),
            total_bytes_forwarded: self.forwarded_bytes.load(Ordering::Relaxed),
        }
    }
}
