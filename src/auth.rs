//! OAuth 1.0a signing and the three-legged authorization handshake.
//!
//! The Fitbit API authorizes every call with OAuth 1.0a: the consumer
//! (application) key/secret pair signs each request together with a per-user
//! token/secret pair obtained through the temporary-credential handshake.
//! [`Session`] owns the consumer credentials and the HTTP client and performs
//! the HMAC-SHA1 signing described in RFC 5849; the [`state`] module models
//! the handshake progress as a closed typestate so that resource calls are
//! only reachable once a long-lived token exists.

use std::borrow::Cow;
use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac as _};
use rand::distr::{Alphanumeric, SampleString as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha1::Sha1;
use url::Url;

use crate::Result;
use crate::error::Error;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 16;

/// A token/secret pair issued by the authorization server.
///
/// During the handshake this is the short-lived temporary credential; after
/// the verifier exchange it is the long-lived credential that signs every
/// resource call on behalf of the user.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenPair {
    oauth_token: String,
    oauth_token_secret: SecretString,
}

impl TokenPair {
    #[must_use]
    pub fn new(token: &str, secret: &str) -> Self {
        Self {
            oauth_token: token.to_owned(),
            oauth_token_secret: SecretString::from(secret.to_owned()),
        }
    }

    /// Returns the public token half.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.oauth_token
    }

    /// Returns the secret half. Callers persisting a session store this via
    /// [`ExposeSecret`].
    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.oauth_token_secret
    }
}

/// Each client can exist in one state at a time: [`state::Unauthenticated`],
/// [`state::PendingVerifier`], or [`state::Authorized`].
pub mod state {
    use crate::auth::TokenPair;

    /// The initial state: only consumer credentials are available.
    #[non_exhaustive]
    #[derive(Clone, Debug)]
    pub struct Unauthenticated;

    /// The intermediate handshake state, entered after obtaining a temporary
    /// credential and left once the user's verifier is exchanged. Web
    /// adapters that park the handshake across a redirect persist the
    /// temporary pair and resume with
    /// [`crate::client::Client::with_pending_credential`].
    #[non_exhaustive]
    #[derive(Clone, Debug)]
    pub struct PendingVerifier {
        pub(crate) temporary: TokenPair,
    }

    /// The elevated state: a long-lived token/secret pair signs every
    /// resource call. All API operations live on
    /// `Client<Authorized>`.
    #[non_exhaustive]
    #[derive(Clone, Debug)]
    pub struct Authorized {
        pub(crate) token: TokenPair,
    }

    /// The client state can only be [`Unauthenticated`], [`PendingVerifier`],
    /// or [`Authorized`].
    pub trait State: sealed::Sealed + Send + Sync + 'static {}

    impl State for Unauthenticated {}
    impl sealed::Sealed for Unauthenticated {}

    impl State for PendingVerifier {}
    impl sealed::Sealed for PendingVerifier {}

    impl State for Authorized {}
    impl sealed::Sealed for Authorized {}

    mod sealed {
        pub trait Sealed {}
    }
}

/// Owns the consumer credentials and the HTTP client, and signs and sends
/// every outbound request.
#[derive(Clone, Debug)]
pub(crate) struct Session {
    consumer_key: String,
    consumer_secret: SecretString,
    http: ReqwestClient,
}

impl Session {
    pub(crate) fn new(consumer_key: &str, consumer_secret: &str) -> Result<Self> {
        let http = ReqwestClient::builder().build()?;

        Ok(Self {
            consumer_key: consumer_key.to_owned(),
            consumer_secret: SecretString::from(consumer_secret.to_owned()),
            http,
        })
    }

    /// Obtains a temporary credential, the first leg of the handshake.
    pub(crate) async fn request_temporary_credential(
        &self,
        endpoint: &Url,
        callback_url: &str,
    ) -> Result<TokenPair> {
        let extra = [("oauth_callback", callback_url.to_owned())];
        let (status, body) = self
            .sign_and_send(Method::POST, endpoint.clone(), &[], HeaderMap::new(), None, &extra)
            .await?;

        token_response(endpoint, status, &body)
    }

    /// Exchanges the user-approved verifier for the long-lived credential,
    /// the final leg of the handshake. Signed with the temporary secret.
    pub(crate) async fn exchange_verifier(
        &self,
        endpoint: &Url,
        temporary: &TokenPair,
        verifier: &str,
    ) -> Result<TokenPair> {
        let extra = [("oauth_verifier", verifier.to_owned())];
        let (status, body) = self
            .sign_and_send(
                Method::POST,
                endpoint.clone(),
                &[],
                HeaderMap::new(),
                Some(temporary),
                &extra,
            )
            .await?;

        token_response(endpoint, status, &body)
    }

    /// Signs the request with the consumer credentials (and `token`, when
    /// present), sends it, and returns the raw response envelope.
    ///
    /// `params` travel as the form body for POST/PUT and as the query string
    /// otherwise; either way they are part of the signature base string.
    /// Network-level failures surface as [`crate::error::Kind::Transport`]
    /// and never as an application error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, url, params, headers, token, extra_oauth),
            fields(method = %method, path = url.path(), status_code)
        )
    )]
    pub(crate) async fn sign_and_send(
        &self,
        method: Method,
        url: Url,
        params: &[(String, String)],
        mut headers: HeaderMap,
        token: Option<&TokenPair>,
        extra_oauth: &[(&'static str, String)],
    ) -> Result<(StatusCode, String)> {
        let nonce = Alphanumeric.sample_string(&mut rand::rng(), NONCE_LEN);
        let timestamp = Utc::now().timestamp().to_string();

        let mut oauth_params: Vec<(&'static str, String)> = vec![
            ("oauth_consumer_key", self.consumer_key.clone()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD.to_owned()),
            ("oauth_timestamp", timestamp),
            ("oauth_version", OAUTH_VERSION.to_owned()),
        ];
        if let Some(token) = token {
            oauth_params.push(("oauth_token", token.token().to_owned()));
        }
        oauth_params.extend(extra_oauth.iter().cloned());

        let mut signed: Vec<(String, String)> = oauth_params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect();
        signed.extend(params.iter().cloned());

        let base = signature_base(&method, &url, &signed);
        let signature = sign(&base, &self.consumer_secret, token.map(TokenPair::secret))?;
        oauth_params.push(("oauth_signature", signature));

        headers.insert(AUTHORIZATION, authorization_header(&oauth_params).parse()?);

        let form_body = method == Method::POST || method == Method::PUT;
        let mut url = url;
        if !form_body && !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let mut request = self.http.request(method, url).headers(headers);
        if form_body && !params.is_empty() {
            request = request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(serde_html_form::to_string(params)?);
        }

        let response = request.send().await?;
        let status = response.status();

        #[cfg(feature = "tracing")]
        tracing::Span::current().record("status_code", status.as_u16());

        // A failure while draining the body is treated as "no response body".
        let body = response.text().await.unwrap_or_default();

        Ok((status, body))
    }
}

/// Builds the user-facing authorization page URL for a temporary token.
pub(crate) fn authorize_url(mut endpoint: Url, token: &str) -> Url {
    endpoint
        .query_pairs_mut()
        .append_pair("oauth_token", token);
    endpoint
}

fn token_response(endpoint: &Url, status: StatusCode, body: &str) -> Result<TokenPair> {
    if status != StatusCode::OK {
        let message = (!body.trim().is_empty()).then(|| body.trim().to_owned());
        return Err(Error::status(
            status,
            Method::POST,
            endpoint.path().to_owned(),
            message,
        ));
    }

    Ok(serde_html_form::from_str(body)?)
}

fn percent_encode(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// The RFC 5849 §3.4.1 signature base string: request method, the normalized
/// base URI, and the sorted, percent-encoded parameter pairs. Query pairs
/// already embedded in `url` participate alongside `pairs`.
fn signature_base(method: &Method, url: &Url, pairs: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .chain(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
        .map(|(k, v)| {
            (
                percent_encode(&k).into_owned(),
                percent_encode(&v).into_owned(),
            )
        })
        .collect();
    encoded.sort();

    let mut normalized = String::new();
    for (i, (key, value)) in encoded.iter().enumerate() {
        if i > 0 {
            normalized.push('&');
        }
        let _ = write!(normalized, "{key}={value}");
    }

    format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(&base_uri(url)),
        percent_encode(&normalized),
    )
}

/// Scheme, lowercase host, and path; the port only when non-default.
fn base_uri(url: &Url) -> String {
    let scheme = url.scheme();
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}{}", url.path()),
        None => format!("{scheme}://{host}{}", url.path()),
    }
}

fn sign(
    base: &str,
    consumer_secret: &SecretString,
    token_secret: Option<&SecretString>,
) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret.expose_secret()),
        token_secret
            .map(|secret| percent_encode(secret.expose_secret()).into_owned())
            .unwrap_or_default(),
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())?;
    mac.update(base.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn authorization_header(oauth_params: &[(&'static str, String)]) -> String {
    let mut header = String::from("OAuth ");
    for (i, (key, value)) in oauth_params.iter().enumerate() {
        if i > 0 {
            header.push_str(", ");
        }
        let _ = write!(header, "{key}=\"{}\"", percent_encode(value));
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_encoding_is_rfc3986_strict() {
        assert_eq!(percent_encode("r b"), "r%20b");
        assert_eq!(percent_encode("=%3D"), "%3D%253D");
        assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(percent_encode("c@"), "c%40");
    }

    // The worked example from RFC 5849 §3.4.1.1: duplicated keys, empty
    // values, and already-encoded query input all normalize into one exact
    // base string.
    #[test]
    fn signature_base_matches_rfc5849_example() {
        let url = Url::parse("http://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b")
            .expect("example url");
        let pairs = vec![
            ("c2".to_owned(), String::new()),
            ("a3".to_owned(), "2 q".to_owned()),
            ("oauth_consumer_key".to_owned(), "9djdj82h48djs9d2".to_owned()),
            ("oauth_nonce".to_owned(), "7d8f3e4a".to_owned()),
            (
                "oauth_signature_method".to_owned(),
                "HMAC-SHA1".to_owned(),
            ),
            ("oauth_timestamp".to_owned(), "137131201".to_owned()),
            ("oauth_token".to_owned(), "kkk9d7dh3k39sjv7".to_owned()),
        ];

        let base = signature_base(&Method::POST, &url, &pairs);

        assert_eq!(
            base,
            "POST&http%3A%2F%2Fexample.com%2Frequest&a2%3Dr%2520b%26a3%3D2%2520q%26a3%3Da%26\
             b5%3D%253D%25253D%26c%2540%3D%26c2%3D%26oauth_consumer_key%3D9djdj82h48djs9d2%26\
             oauth_nonce%3D7d8f3e4a%26oauth_signature_method%3DHMAC-SHA1%26\
             oauth_timestamp%3D137131201%26oauth_token%3Dkkk9d7dh3k39sjv7"
        );
    }

    #[test]
    fn base_uri_keeps_only_non_default_ports() {
        let with_port = Url::parse("http://127.0.0.1:8080/oauth/request_token").expect("url");
        assert_eq!(base_uri(&with_port), "http://127.0.0.1:8080/oauth/request_token");

        let default_port = Url::parse("https://api.fitbit.com:443/1/user/-/profile.xml").expect("url");
        assert_eq!(base_uri(&default_port), "https://api.fitbit.com/1/user/-/profile.xml");
    }

    #[test]
    fn authorization_header_quotes_and_encodes() {
        let params = vec![
            ("oauth_consumer_key", "key".to_owned()),
            ("oauth_signature", "ab+/=".to_owned()),
        ];

        assert_eq!(
            authorization_header(&params),
            "OAuth oauth_consumer_key=\"key\", oauth_signature=\"ab%2B%2F%3D\"",
        );
    }

    #[test]
    fn authorize_url_appends_token() {
        let endpoint = Url::parse("https://www.fitbit.com/oauth/authorize").expect("url");
        let url = authorize_url(endpoint, "temp-token");

        assert_eq!(
            url.as_str(),
            "https://www.fitbit.com/oauth/authorize?oauth_token=temp-token"
        );
    }

    #[test]
    fn token_response_parses_form_body() {
        let endpoint = Url::parse("https://api.fitbit.com/oauth/request_token").expect("url");
        let pair = token_response(
            &endpoint,
            StatusCode::OK,
            "oauth_token=abc&oauth_token_secret=def&oauth_callback_confirmed=true",
        )
        .expect("token pair");

        assert_eq!(pair.token(), "abc");
        assert_eq!(pair.secret().expose_secret(), "def");
    }

    #[test]
    fn token_response_carries_error_body() {
        let endpoint = Url::parse("https://api.fitbit.com/oauth/request_token").expect("url");
        let err = token_response(&endpoint, StatusCode::UNAUTHORIZED, "Invalid consumer key")
            .expect_err("must fail");

        assert_eq!(err.status_code(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("Invalid consumer key"));
    }

    #[test]
    fn debug_does_not_expose_secrets() {
        let pair = TokenPair::new("public", "very_secret_value");
        let debug_output = format!("{pair:?}");

        assert!(debug_output.contains("public"));
        assert!(
            !debug_output.contains("very_secret_value"),
            "Debug output should NOT contain the token secret. Got: {debug_output}"
        );
    }
}
