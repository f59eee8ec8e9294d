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

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::Token;

// TokenCache holds the last bearer string handed out for one hub
// instance. It is volatile: nothing is persisted, and each hub owns its
// own cache.
//
// The raw bearer is stored and decoded on every read, so anything that
// does not decode is simply reported as absent.
#[derive(Debug, Default)]
pub struct TokenCache {
    bearer: Mutex<Option<String>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    // get returns the cached token if it is still valid right now.
    pub fn get(&self) -> Option<Token> {
        self.get_at(chrono::Utc::now().timestamp())
    }

    // get_at returns the cached token if it is still valid at `now`
    // (unix seconds).
    pub fn get_at(&self, now: i64) -> Option<Token> {
        let guard = self.bearer.lock().unwrap_or_else(PoisonError::into_inner);
        let bearer = guard.as_ref()?;

        match Token::decode(bearer.as_str()) {
            Ok(token) if token.is_valid_at(now) => Some(token),
            Ok(token) => {
                debug!(expired_at = token.expires_at(), "cached token is stale");
                None
            }
            Err(e) => {
                debug!("ignoring undecodable cached token: {e}");
                None
            }
        }
    }

    // put replaces whatever is cached.
    pub fn put(&self, token: &Token) {
        self.put_bearer(token.bearer());
    }

    // put_bearer stores a raw bearer string without looking at it.
    pub fn put_bearer(&self, bearer: impl Into<String>) {
        *self.bearer.lock().unwrap_or_else(PoisonError::into_inner) = Some(bearer.into());
    }

    pub fn clear(&self) {
        *self.bearer.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
