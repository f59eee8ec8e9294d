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

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{Authenticator, Credential, IdentityError, Token, TokenCache};

/// Hands out a valid token for one hub instance, authenticating only when
/// the cache has nothing usable.
///
/// At most one authentication is in flight at a time. Callers that arrive
/// while one is running wait for it and then share its result: its token
/// out of the cache, or the error it failed with. Only a caller arriving
/// after an attempt has finished starts a new one.
#[derive(Debug)]
pub struct TokenProvider {
    credential: Credential,
    authenticator: Arc<dyn Authenticator>,
    cache: TokenCache,
    // attempts counts finished authentications. It only changes while
    // `refresh` is held.
    attempts: AtomicU64,
    refresh: Mutex<Option<LastFailure>>,
}

// LastFailure is the error of the most recent authentication, if it failed.
#[derive(Debug)]
struct LastFailure {
    attempt: u64,
    error: IdentityError,
}

impl TokenProvider {
    pub fn new(credential: Credential, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            credential,
            authenticator,
            cache: TokenCache::new(),
            attempts: AtomicU64::new(0),
            refresh: Mutex::new(None),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub async fn get_valid_token(&self) -> Result<Token, IdentityError> {
        if let Some(token) = self.cache.get() {
            return Ok(token);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last_failure = self.refresh.lock().await;

        // somebody else may have refreshed while we waited
        if let Some(token) = self.cache.get() {
            debug!("using token obtained by a concurrent caller");
            return Ok(token);
        }
        if let Some(failure) = last_failure.as_ref()
            && failure.attempt > seen
        {
            debug!("sharing failure of a concurrent authentication");
            return Err(failure.error.clone());
        }

        let result = self.authenticator.authenticate(&self.credential).await;
        let attempt = self.attempts.fetch_add(1, Ordering::AcqRel) + 1;
        match result {
            Ok(token) => {
                info!(
                    subject = token.subject(),
                    expires_at = token.expires_at(),
                    "obtained new identity token"
                );
                self.cache.put(&token);
                *last_failure = None;
                Ok(token)
            }
            Err(error) => {
                *last_failure = Some(LastFailure {
                    attempt,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }
}
