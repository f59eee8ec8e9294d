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
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fixtures::*;
use hub_identity::{
    Authenticator, CognitoAuthenticator, Credential, IdentityError, Token, TokenCache,
    TokenProvider,
};
use mock_server as ms;

fn config_for(endpoint: String) -> hub_identity::Config {
    hub_identity::Config {
        region: "us-east-1".to_string(),
        client_id: "test-client".to_string(),
        endpoint: Some(endpoint),
        timeout: Duration::from_secs(5),
    }
}

fn credential() -> Credential {
    Credential::new("someone@example.com", "correct horse")
}

// --> Token <--
#[test]
fn token_decode_reads_subject_and_expiry() {
    let token = Token::decode(make_jwt(SUBJECT, 1_900_000_000)).expect("token should decode");
    assert_eq!(token.subject(), SUBJECT);
    assert_eq!(token.expires_at(), 1_900_000_000);
    assert!(token.is_valid_at(1_899_999_999));
    assert!(!token.is_valid_at(1_900_000_000));
}

#[test]
fn token_decode_rejects_garbage() {
    let err = Token::decode("not-a-jwt").expect_err("garbage should not decode");
    assert!(matches!(err, IdentityError::MalformedToken(_)));
}

#[test]
fn token_debug_hides_bearer() {
    let bearer = fresh_jwt();
    let token = Token::decode(bearer.clone()).unwrap();
    assert!(!format!("{token:?}").contains(&bearer));
}

// --> TokenCache <--
#[test]
fn cache_empty_is_absent() {
    let cache = TokenCache::new();
    assert!(cache.get().is_none());
}

#[test]
fn cache_expiry_boundary() {
    let cache = TokenCache::new();
    cache.put(&Token::decode(make_jwt(SUBJECT, 1000)).unwrap());

    assert!(cache.get_at(999).is_some());
    // expiry equal to now is already stale
    assert!(cache.get_at(1000).is_none());
    assert!(cache.get_at(1001).is_none());
}

#[test]
fn cache_get_is_idempotent() {
    let cache = TokenCache::new();
    let token = Token::decode(make_jwt(SUBJECT, 5000)).unwrap();
    cache.put(&token);

    let first = cache.get_at(10);
    let second = cache.get_at(10);
    assert_eq!(first, second);
    assert_eq!(first, Some(token));
}

#[test]
fn cache_malformed_entry_is_absent() {
    let cache = TokenCache::new();
    cache.put_bearer("definitely.not.ajwt");
    assert!(cache.get().is_none());
}

#[test]
fn cache_put_overwrites_and_clear_empties() {
    let cache = TokenCache::new();
    cache.put(&Token::decode(make_jwt("first", 5000)).unwrap());
    cache.put(&Token::decode(make_jwt("second", 5000)).unwrap());
    assert_eq!(cache.get_at(0).unwrap().subject(), "second");

    cache.clear();
    assert!(cache.get_at(0).is_none());
}

// --> CognitoAuthenticator <--
#[tokio::test]
async fn authenticate_success_returns_decoded_token() {
    let mut server = ms::create_mock_http_server().await;
    let jwt = fresh_jwt();
    let (url, mock) = ms::add_initiate_auth_mock(&mut server, &auth_success_body(&jwt), 200, 1).await;

    let authenticator = CognitoAuthenticator::new_with_config(&config_for(url)).unwrap();
    let token = authenticator
        .authenticate(&credential())
        .await
        .expect("authentication should succeed");

    assert_eq!(token.bearer(), jwt);
    assert_eq!(token.subject(), SUBJECT);
    mock.assert_async().await;
}

#[tokio::test]
async fn authenticate_bad_credentials_carries_provider_message() {
    let mut server = ms::create_mock_http_server().await;
    let (url, _mock) = ms::add_initiate_auth_mock(&mut server, NOT_AUTHORIZED_BODY, 400, 1).await;

    let authenticator = CognitoAuthenticator::new_with_config(&config_for(url)).unwrap();
    let err = authenticator
        .authenticate(&credential())
        .await
        .expect_err("expected rejection");

    assert!(matches!(err, IdentityError::Rejected { .. }));
    assert_eq!(err.to_string(), "Incorrect username or password.");
}

#[tokio::test]
async fn authenticate_throttled() {
    let mut server = ms::create_mock_http_server().await;
    let (url, _mock) = ms::add_initiate_auth_mock(&mut server, THROTTLED_BODY, 400, 1).await;

    let authenticator = CognitoAuthenticator::new_with_config(&config_for(url)).unwrap();
    let err = authenticator.authenticate(&credential()).await.unwrap_err();

    assert!(matches!(err, IdentityError::Throttled(_)));
}

#[tokio::test]
async fn authenticate_challenge_is_rejected() {
    let mut server = ms::create_mock_http_server().await;
    let (url, _mock) = ms::add_initiate_auth_mock(&mut server, CHALLENGE_BODY, 200, 1).await;

    let authenticator = CognitoAuthenticator::new_with_config(&config_for(url)).unwrap();
    let err = authenticator.authenticate(&credential()).await.unwrap_err();

    match err {
        IdentityError::Rejected { message, .. } => {
            assert!(message.contains("NEW_PASSWORD_REQUIRED"))
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn authenticate_undecodable_token_is_failure() {
    let mut server = ms::create_mock_http_server().await;
    let (url, _mock) =
        ms::add_initiate_auth_mock(&mut server, &auth_success_body("garbage"), 200, 1).await;

    let authenticator = CognitoAuthenticator::new_with_config(&config_for(url)).unwrap();
    let err = authenticator.authenticate(&credential()).await.unwrap_err();

    assert!(matches!(err, IdentityError::MalformedToken(_)));
}

#[tokio::test]
async fn authenticate_comm_failure_returns_comm_err() {
    let authenticator =
        CognitoAuthenticator::new_with_config(&config_for("invalidurl".to_string())).unwrap();
    let err = authenticator.authenticate(&credential()).await.unwrap_err();

    assert!(matches!(err, IdentityError::Communication(_)));
}

// --> TokenProvider <--
#[derive(Debug)]
struct CountingAuthenticator {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl CountingAuthenticator {
    fn new(delay: Duration, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            fail,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn authenticate(&self, _credential: &Credential) -> Result<Token, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(IdentityError::Rejected {
                code: "NotAuthorizedException".to_string(),
                message: "Incorrect username or password.".to_string(),
            });
        }
        Token::decode(fresh_jwt())
    }
}

#[tokio::test]
async fn provider_cache_hit_skips_authentication() {
    let authenticator = CountingAuthenticator::new(Duration::ZERO, false);
    let provider = TokenProvider::new(credential(), authenticator.clone());
    let cached = Token::decode(fresh_jwt()).unwrap();
    provider.cache().put(&cached);

    let token = provider.get_valid_token().await.unwrap();

    assert_eq!(token, cached);
    assert_eq!(authenticator.calls(), 0);
}

#[tokio::test]
async fn provider_empty_cache_authenticates_once_and_stores() {
    let authenticator = CountingAuthenticator::new(Duration::ZERO, false);
    let provider = TokenProvider::new(credential(), authenticator.clone());

    let token = provider.get_valid_token().await.unwrap();

    assert_eq!(authenticator.calls(), 1);
    assert_eq!(provider.cache().get(), Some(token));

    // second call is served from the cache
    provider.get_valid_token().await.unwrap();
    assert_eq!(authenticator.calls(), 1);
}

#[tokio::test]
async fn provider_expired_cache_authenticates_once() {
    let authenticator = CountingAuthenticator::new(Duration::ZERO, false);
    let provider = TokenProvider::new(credential(), authenticator.clone());
    provider.cache().put_bearer(expired_jwt());

    let token = provider.get_valid_token().await.unwrap();

    assert_eq!(authenticator.calls(), 1);
    assert!(token.is_valid_at(now()));
}

#[tokio::test]
async fn provider_failure_propagates_and_caches_nothing() {
    let authenticator = CountingAuthenticator::new(Duration::ZERO, true);
    let provider = TokenProvider::new(credential(), authenticator.clone());

    let err = provider.get_valid_token().await.unwrap_err();

    assert!(matches!(err, IdentityError::Rejected { .. }));
    assert!(provider.cache().get().is_none());
}

#[tokio::test]
async fn provider_concurrent_callers_share_one_authentication() {
    let authenticator = CountingAuthenticator::new(Duration::from_millis(50), false);
    let provider = Arc::new(TokenProvider::new(credential(), authenticator.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let provider = provider.clone();
        handles.push(tokio::spawn(
            async move { provider.get_valid_token().await },
        ));
    }

    let mut bearers = Vec::new();
    for handle in handles {
        bearers.push(handle.await.unwrap().unwrap().bearer().to_string());
    }

    assert_eq!(authenticator.calls(), 1);
    bearers.dedup();
    assert_eq!(bearers.len(), 1);
}

#[tokio::test]
async fn provider_concurrent_callers_share_one_failure() {
    let authenticator = CountingAuthenticator::new(Duration::from_millis(50), true);
    let provider = Arc::new(TokenProvider::new(credential(), authenticator.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let provider = provider.clone();
        handles.push(tokio::spawn(
            async move { provider.get_valid_token().await },
        ));
    }

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Incorrect username or password.");
    }
    assert_eq!(authenticator.calls(), 1);

    // a caller arriving after the failed attempt tries again
    provider.get_valid_token().await.unwrap_err();
    assert_eq!(authenticator.calls(), 2);
}
