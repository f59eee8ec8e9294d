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

use std::fmt;

use jsonwebtoken as jst;
use serde::{Deserialize, Serialize};

use crate::IdentityError;

// The subset of identity token claims the hub cares about. Any other
// claims in the token are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    // unix timestamp, seconds
    pub exp: i64,
}

// Token is a bearer string plus its decoded claims.
//
// The signature is not verified here: the token came straight from the
// identity provider over TLS, and the backend verifies it on every call.
// Only the claims are needed locally (expiry, and the subject for the
// broker topic).
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    bearer: String,
    claims: TokenClaims,
}

impl Token {
    pub fn decode(bearer: impl Into<String>) -> Result<Token, IdentityError> {
        let bearer = bearer.into();
        let data = jst::dangerous::insecure_decode::<TokenClaims>(&bearer)
            .map_err(|e| IdentityError::MalformedToken(e.to_string()))?;

        Ok(Token {
            bearer,
            claims: data.claims,
        })
    }

    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }

    // is_valid_at reports whether the token is still usable at `now`
    // (unix seconds). A token expiring exactly now is already stale.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.claims.exp > now
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("bearer", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}
