#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests"
)]
#![allow(
    unused,
    reason = "Not every test crate uses every helper in this module"
)]

use chrono::{NaiveDate, NaiveDateTime};
use fitbit_client_sdk::auth::state::Authorized;
use fitbit_client_sdk::client::{Client, Config};
use httpmock::MockServer;

pub const CONSUMER_KEY: &str = "fe8c2b7a14a343a2b3a9c1e0d7f4b6a1";
pub const CONSUMER_SECRET: &str = "a2f0e7c6d5b4a3928170f6e5d4c3b2a1";
pub const TOKEN: &str = "9d6f8e7c5b4a30291e0d7c6b5a493827";
pub const TOKEN_SECRET: &str = "0e1d2c3b4a59687706f5e4d3c2b1a090";

pub type TestClient = Client<Authorized>;

/// A client whose API host points at the mock server, authorized with a
/// fixed token pair.
#[must_use]
pub fn authorized_client(server: &MockServer) -> TestClient {
    let config = Config::builder()
        .api_host(server.address().to_string())
        .api_secure(false)
        .build();

    Client::new(CONSUMER_KEY, CONSUMER_SECRET, config)
        .expect("client should build")
        .with_token(TOKEN, TOKEN_SECRET)
        .expect("sole owner of a fresh client")
}

#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[must_use]
pub fn datetime(input: &str) -> NaiveDateTime {
    input.parse().unwrap()
}
