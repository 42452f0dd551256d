#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests"
)]

//! Integration tests for the OAuth 1.0a three-legged handshake.
//!
//! These tests use `httpmock` as both the API host and the authorization
//! host, ensuring deterministic execution without network access.

pub mod common;

use fitbit_client_sdk::client::{Client, Config};
use fitbit_client_sdk::error::Kind;
use httpmock::{Method::POST, MockServer};

fn unauthenticated(server: &MockServer) -> Client {
    let config = Config::builder()
        .api_host(server.address().to_string())
        .api_secure(false)
        .auth_host(server.address().to_string())
        .auth_secure(false)
        .build();

    Client::new(common::CONSUMER_KEY, common::CONSUMER_SECRET, config)
        .expect("client should build")
}

#[tokio::test]
async fn full_handshake_should_succeed() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = unauthenticated(&server);

    let request_token = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/request_token")
            .header_exists("authorization");
        then.status(200)
            .body("oauth_token=temp-token&oauth_token_secret=temp-secret&oauth_callback_confirmed=true");
    });

    let (pending, redirect) = client
        .request_temporary_credential("https://example.com/callback")
        .await?;

    request_token.assert();
    assert_eq!(pending.temporary_credential().token(), "temp-token");
    assert_eq!(
        redirect.as_str(),
        format!(
            "http://{}/oauth/authorize?oauth_token=temp-token",
            server.address()
        )
    );

    let access_token = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/access_token")
            .header_exists("authorization");
        then.status(200)
            .body("oauth_token=access-token&oauth_token_secret=access-secret");
    });

    let authorized = pending.exchange_verifier("verifier-from-callback").await?;

    access_token.assert();
    assert_eq!(authorized.token().token(), "access-token");

    Ok(())
}

#[tokio::test]
async fn rejected_temporary_credential_surfaces_status() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = unauthenticated(&server);

    server.mock(|when, then| {
        when.method(POST).path("/oauth/request_token");
        then.status(401).body("Invalid consumer key");
    });

    let err = client
        .request_temporary_credential("https://example.com/callback")
        .await
        .expect_err("must fail");

    assert_eq!(err.kind(), Kind::Status);
    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(401));
    assert!(err.to_string().contains("Invalid consumer key"));

    Ok(())
}

#[tokio::test]
async fn resumed_handshake_exchanges_verifier() -> anyhow::Result<()> {
    let server = MockServer::start();

    let access_token = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/access_token")
            .header_exists("authorization");
        then.status(200)
            .body("oauth_token=access-token&oauth_token_secret=access-secret");
    });

    // A web adapter parked the temporary credential in its session store and
    // resumes in a fresh process.
    let pending = unauthenticated(&server)
        .with_pending_credential("temp-token", "temp-secret")?;
    let authorized = pending.exchange_verifier("verifier-from-callback").await?;

    access_token.assert();
    assert_eq!(authorized.token().token(), "access-token");

    Ok(())
}

#[tokio::test]
async fn stored_token_skips_the_handshake() -> anyhow::Result<()> {
    let server = MockServer::start();

    let profile = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/1/user/-/profile.xml")
            .header_exists("authorization");
        then.status(200)
            .body("<result><user><displayName>Nick</displayName></user></result>");
    });

    let client = common::authorized_client(&server);
    let value = client.profile().await?;

    profile.assert();
    assert_eq!(value["user"]["displayName"], "Nick");

    Ok(())
}
