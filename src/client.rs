//! The main way for API users to interact with the Fitbit REST API.
//!
//! A [`Client`] starts [`Unauthenticated`] with only consumer credentials,
//! moves through [`PendingVerifier`] while a user approves access, and ends
//! up [`Authorized`] with a long-lived token pair. Only the methods allowed
//! in a given state are visible in that state; the full resource surface
//! lives on `Client<Authorized>`.

use std::sync::{Arc, PoisonError, RwLock};

use bon::Builder;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::auth::state::{Authorized, PendingVerifier, State, Unauthenticated};
use crate::auth::{self, Session, TokenPair};
use crate::error::{Error, Synchronization};
use crate::format::{self, ResponseFormat};
use crate::types::request::{
    CreateFoodRequest, InviteFriendRequest, LogActivityRequest, LogBloodPressureRequest,
    LogBodyRequest, LogFoodRequest, LogGlucoseRequest, LogHeartRateRequest, LogWaterRequest,
    UpdateProfileRequest,
};
use crate::types::{
    CallResponse, Decimal, IntradayResource, LeaderboardPeriod, Quota, RateLimitStatus,
    TimeSeriesRange, TimeSeriesResource, UnitSystem,
};
use crate::{DEFAULT_API_HOST, DEFAULT_AUTH_HOST, Result};

const API_VERSION: &str = "1";

/// Sentinel user id addressing the user who authorized the session.
pub const CURRENT_USER: &str = "-";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

fn default_user_agent() -> String {
    concat!("fitbit-client-sdk/", env!("CARGO_PKG_VERSION")).to_owned()
}

fn scheme(secure: bool) -> &'static str {
    if secure { "https" } else { "http" }
}

/// Configuration for [`Client`].
///
/// Every field can also be changed after construction through the setters on
/// [`Client`]; each API call reads a consistent snapshot of the settings at
/// call time.
#[derive(Builder, Clone, Debug)]
pub struct Config {
    /// Host serving the REST API.
    #[builder(into, default = DEFAULT_API_HOST.to_owned())]
    api_host: String,
    /// Host serving the user-facing authorization page.
    #[builder(into, default = DEFAULT_AUTH_HOST.to_owned())]
    auth_host: String,
    /// Whether API calls use TLS.
    #[builder(default = true)]
    api_secure: bool,
    /// Whether the authorization page uses TLS.
    #[builder(default = true)]
    auth_secure: bool,
    /// Response encoding requested from the API.
    #[builder(default)]
    response_format: ResponseFormat,
    /// Target user id substituted into resource paths.
    #[builder(into, default = CURRENT_USER.to_owned())]
    user_id: String,
    /// Measurement unit system; selects the `Accept-Language` header.
    #[builder(default)]
    unit_system: UnitSystem,
    /// `User-Agent` sent with every call.
    #[builder(into, default = default_user_agent())]
    user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl Config {
    pub(crate) fn api_base(&self) -> String {
        format!(
            "{}://{}/{API_VERSION}/",
            scheme(self.api_secure),
            self.api_host
        )
    }

    pub(crate) fn request_token_url(&self) -> String {
        format!(
            "{}://{}/oauth/request_token",
            scheme(self.api_secure),
            self.api_host
        )
    }

    pub(crate) fn access_token_url(&self) -> String {
        format!(
            "{}://{}/oauth/access_token",
            scheme(self.api_secure),
            self.api_host
        )
    }

    pub(crate) fn authorize_endpoint(&self) -> String {
        format!(
            "{}://{}/oauth/authorize",
            scheme(self.auth_secure),
            self.auth_host
        )
    }
}

fn base_headers(settings: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(&settings.user_agent)?);
    if let Some(language) = settings.unit_system.accept_language() {
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(language));
    }
    Ok(headers)
}

/// Client for the Fitbit REST API.
///
/// Create an unauthenticated client and run the handshake:
/// ```rust,no_run
/// use fitbit_client_sdk::client::{Client, Config};
///
/// # async fn example() -> fitbit_client_sdk::Result<()> {
/// let client = Client::new("consumer-key", "consumer-secret", Config::default())?;
/// let (pending, redirect) = client
///     .request_temporary_credential("https://example.com/callback")
///     .await?;
/// // Send the user-agent to `redirect`; the callback delivers the verifier.
/// let authorized = pending.exchange_verifier("verifier-from-callback").await?;
/// let profile = authorized.profile().await?;
/// # let _ = profile;
/// # Ok(())
/// # }
/// ```
///
/// Or resume a stored session directly:
/// ```rust,no_run
/// use fitbit_client_sdk::Result;
/// use fitbit_client_sdk::client::{Client, Config};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let client = Client::new("consumer-key", "consumer-secret", Config::default())?
///         .with_token("user-token", "user-token-secret")?;
///
///     let devices = client.devices().await?;
///     println!("{devices:#?}");
///     Ok(())
/// }
/// ```
///
/// The client is cheap to clone; clones share configuration. Changing the
/// authorization state requires the client to be the only clone.
#[derive(Clone, Debug)]
pub struct Client<S: State = Unauthenticated> {
    inner: Arc<ClientInner<S>>,
}

#[derive(Debug)]
struct ClientInner<S: State> {
    /// The current authorization [`State`] of this client
    state: S,
    /// Signs and sends every outbound request.
    session: Session,
    /// Client-wide settings, snapshotted once per call.
    settings: RwLock<Config>,
}

impl Client<Unauthenticated> {
    /// Creates a client from the application's consumer credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(consumer_key: &str, consumer_secret: &str, config: Config) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(ClientInner {
                state: Unauthenticated,
                session: Session::new(consumer_key, consumer_secret)?,
                settings: RwLock::new(config),
            }),
        })
    }

    /// Starts the handshake: obtains a temporary credential and returns the
    /// pending client together with the authorization page URL to redirect
    /// the user to.
    ///
    /// # Errors
    ///
    /// Fails when the client is shared, when the temporary-credential call
    /// is rejected, or on transport failure.
    pub async fn request_temporary_credential(
        self,
        callback_url: &str,
    ) -> Result<(Client<PendingVerifier>, Url)> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;
        let settings = inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let endpoint = Url::parse(&settings.request_token_url())?;
        let temporary = inner
            .session
            .request_temporary_credential(&endpoint, callback_url)
            .await?;
        let redirect = auth::authorize_url(
            Url::parse(&settings.authorize_endpoint())?,
            temporary.token(),
        );

        let client = Client {
            inner: Arc::new(ClientInner {
                state: PendingVerifier { temporary },
                session: inner.session,
                settings: inner.settings,
            }),
        };

        Ok((client, redirect))
    }

    /// Resumes a handshake whose temporary credential was parked in an
    /// external session store across the authorization redirect.
    ///
    /// # Errors
    ///
    /// Fails when the client is shared.
    pub fn with_pending_credential(
        self,
        token: &str,
        secret: &str,
    ) -> Result<Client<PendingVerifier>> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                state: PendingVerifier {
                    temporary: TokenPair::new(token, secret),
                },
                session: inner.session,
                settings: inner.settings,
            }),
        })
    }

    /// Elevates the client with a long-lived token pair obtained earlier,
    /// skipping the handshake.
    ///
    /// # Errors
    ///
    /// Fails when the client is shared.
    pub fn with_token(self, token: &str, secret: &str) -> Result<Client<Authorized>> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                state: Authorized {
                    token: TokenPair::new(token, secret),
                },
                session: inner.session,
                settings: inner.settings,
            }),
        })
    }
}

impl Client<PendingVerifier> {
    /// The temporary credential, for web adapters that persist the handshake
    /// across a redirect.
    #[must_use]
    pub fn temporary_credential(&self) -> &TokenPair {
        &self.inner.state.temporary
    }

    /// Exchanges the user-approved verifier for the long-lived credential,
    /// completing the handshake.
    ///
    /// # Errors
    ///
    /// Fails when the client is shared, when the exchange is rejected, or on
    /// transport failure.
    pub async fn exchange_verifier(self, verifier: &str) -> Result<Client<Authorized>> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;
        let settings = inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let endpoint = Url::parse(&settings.access_token_url())?;
        let token = inner
            .session
            .exchange_verifier(&endpoint, &inner.state.temporary, verifier)
            .await?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                state: Authorized { token },
                session: inner.session,
                settings: inner.settings,
            }),
        })
    }
}

impl<S: State> Client<S> {
    fn snapshot(&self) -> Config {
        self.inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update<F: FnOnce(&mut Config)>(&self, mutate: F) {
        let mut settings = self
            .inner
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        mutate(&mut settings);
    }

    /// Selects the response encoding for subsequent calls.
    pub fn set_response_format(&self, response_format: ResponseFormat) {
        self.update(|settings| settings.response_format = response_format);
    }

    /// Targets another user's public resources; [`CURRENT_USER`] addresses
    /// the authorized user again.
    pub fn set_user(&self, user_id: &str) {
        self.update(|settings| settings.user_id = user_id.to_owned());
    }

    /// Selects the measurement unit system for subsequent calls.
    pub fn set_unit_system(&self, unit_system: UnitSystem) {
        self.update(|settings| settings.unit_system = unit_system);
    }

    pub fn set_user_agent(&self, user_agent: &str) {
        self.update(|settings| settings.user_agent = user_agent.to_owned());
    }

    pub fn set_api_host(&self, host: &str, secure: bool) {
        self.update(|settings| {
            settings.api_host = host.to_owned();
            settings.api_secure = secure;
        });
    }

    pub fn set_auth_host(&self, host: &str, secure: bool) {
        self.update(|settings| {
            settings.auth_host = host.to_owned();
            settings.auth_secure = secure;
        });
    }

    /// The currently configured response encoding.
    #[must_use]
    pub fn response_format(&self) -> ResponseFormat {
        self.snapshot().response_format
    }

    /// The currently configured target user id.
    #[must_use]
    pub fn user_id(&self) -> String {
        self.snapshot().user_id
    }

    async fn raw_call(
        &self,
        token: Option<&TokenPair>,
        path: &str,
        params: &[(String, String)],
        method: Method,
        extra_headers: HeaderMap,
    ) -> Result<CallResponse> {
        let settings = self.snapshot();
        let url = Url::parse(&format!("{}{path}", settings.api_base()))?;
        let mut headers = base_headers(&settings)?;
        headers.extend(extra_headers);

        let (status, body) = self
            .inner
            .session
            .sign_and_send(method, url, params, headers, token, &[])
            .await?;

        Ok(CallResponse { status, body })
    }

    /// Calls an arbitrary endpoint under the API base path, signed with the
    /// consumer credentials alone, for server-to-server endpoints that are
    /// not tied to a user session.
    ///
    /// No status classification is applied: the response envelope comes back
    /// as-is for every status code.
    ///
    /// # Errors
    ///
    /// Fails only on transport-level errors.
    pub async fn application_custom_call(
        &self,
        path: &str,
        params: &[(String, String)],
        method: Method,
        extra_headers: HeaderMap,
    ) -> Result<CallResponse> {
        self.raw_call(None, path, params, method, extra_headers).await
    }
}

impl Client<Authorized> {
    /// The long-lived token pair signing this client's calls, for session
    /// persistence.
    #[must_use]
    pub fn token(&self) -> &TokenPair {
        &self.inner.state.token
    }

    /// Calls an arbitrary endpoint under the API base path, signed on behalf
    /// of the authorized user.
    ///
    /// No status classification is applied: the response envelope comes back
    /// as-is for every status code. Classification is the caller's business.
    ///
    /// # Errors
    ///
    /// Fails only on transport-level errors.
    pub async fn custom_call(
        &self,
        path: &str,
        params: &[(String, String)],
        method: Method,
        extra_headers: HeaderMap,
    ) -> Result<CallResponse> {
        self.raw_call(Some(&self.inner.state.token), path, params, method, extra_headers)
            .await
    }

    async fn execute(
        &self,
        settings: &Config,
        method: Method,
        full_path: &str,
        params: &[(String, String)],
    ) -> Result<(StatusCode, String)> {
        let url = Url::parse(&format!("{}{full_path}", settings.api_base()))?;
        let headers = base_headers(settings)?;

        self.inner
            .session
            .sign_and_send(
                method,
                url,
                params,
                headers,
                Some(&self.inner.state.token),
                &[],
            )
            .await
    }

    /// The fixed invocation protocol for operations that return a body:
    /// classify the status against `expected`, parse per `parse_as`, and
    /// treat a success status with an unusable body as a failure.
    async fn classified(
        &self,
        settings: &Config,
        method: Method,
        full_path: String,
        params: &[(String, String)],
        expected: &[StatusCode],
        parse_as: ResponseFormat,
    ) -> Result<Value> {
        let (status, body) = self
            .execute(settings, method.clone(), &full_path, params)
            .await?;

        if expected.contains(&status) {
            match format::parse(&body, parse_as) {
                Some(value) if format::is_usable(&value) => Ok(value),
                _ => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        status = %status,
                        method = %method,
                        path = %full_path,
                        "success status with unusable body"
                    );
                    Err(Error::status(status, method, full_path, None))
                }
            }
        } else {
            let message = format::parse(&body, parse_as)
                .as_ref()
                .and_then(format::vendor_message);
            #[cfg(feature = "tracing")]
            tracing::warn!(
                status = %status,
                method = %method,
                path = %full_path,
                "API request failed"
            );
            Err(Error::status(status, method, full_path, message))
        }
    }

    async fn call(
        &self,
        settings: &Config,
        method: Method,
        path: &str,
        params: &[(String, String)],
        expected: &[StatusCode],
    ) -> Result<Value> {
        let parse_as = settings.response_format;
        let full_path = format!("{path}{}", parse_as.extension());
        self.classified(settings, method, full_path, params, expected, parse_as)
            .await
    }

    /// Status-only classification for operations whose success responses
    /// carry no body (deletes and invitation responses).
    async fn call_no_content(
        &self,
        settings: &Config,
        method: Method,
        path: &str,
        params: &[(String, String)],
        expected: StatusCode,
    ) -> Result<()> {
        let full_path = format!("{path}{}", settings.response_format.extension());
        let (status, body) = self
            .execute(settings, method.clone(), &full_path, params)
            .await?;

        if status == expected {
            Ok(())
        } else {
            let message = format::parse(&body, settings.response_format)
                .as_ref()
                .and_then(format::vendor_message);
            #[cfg(feature = "tracing")]
            tracing::warn!(
                status = %status,
                method = %method,
                path = %full_path,
                "API request failed"
            );
            Err(Error::status(status, method, full_path, message))
        }
    }

    // ---- profile ----

    /// Fetches the profile of the target user.
    ///
    /// # Errors
    ///
    /// Fails with a [`crate::error::Status`] error on any non-200 response.
    pub async fn profile(&self) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/{}/profile", settings.user_id);
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Updates profile fields of the authorized user.
    ///
    /// # Errors
    ///
    /// Fails with a [`crate::error::Status`] error on any non-201 response.
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/profile",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    // ---- activities ----

    /// Fetches the activity summary and entries for a date.
    pub async fn activities(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!(
            "user/{}/activities/date/{}",
            settings.user_id,
            date.format(DATE_FORMAT)
        );
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Fetches the full description of one activity from the database.
    pub async fn activity(&self, activity_id: &str) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("activities/{activity_id}");
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Browses the public activity database.
    pub async fn browse_activities(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(&settings, Method::GET, "activities", &[], &[StatusCode::OK])
            .await
    }

    /// Fetches lifetime activity statistics for the target user.
    pub async fn activity_stats(&self) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/{}/activities", settings.user_id);
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    pub async fn recent_activities(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::GET,
            "user/-/activities/recent",
            &[],
            &[StatusCode::OK],
        )
        .await
    }

    pub async fn frequent_activities(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::GET,
            "user/-/activities/frequent",
            &[],
            &[StatusCode::OK],
        )
        .await
    }

    pub async fn favorite_activities(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::GET,
            "user/-/activities/favorite",
            &[],
            &[StatusCode::OK],
        )
        .await
    }

    /// Logs an activity for the authorized user.
    ///
    /// # Errors
    ///
    /// Fails with a [`crate::error::Status`] error on any non-201 response.
    pub async fn log_activity(&self, request: &LogActivityRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/activities",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Deletes a logged activity.
    pub async fn delete_activity(&self, activity_log_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/activities/{activity_log_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    pub async fn add_favorite_activity(&self, activity_id: &str) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/-/activities/favorite/{activity_id}");
        self.call(&settings, Method::POST, &path, &[], &[StatusCode::CREATED])
            .await
    }

    pub async fn delete_favorite_activity(&self, activity_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/activities/favorite/{activity_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    // ---- foods ----

    /// Fetches the food log for a date.
    pub async fn foods(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!(
            "user/{}/foods/log/date/{}",
            settings.user_id,
            date.format(DATE_FORMAT)
        );
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    pub async fn recent_foods(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::GET,
            "user/-/foods/log/recent",
            &[],
            &[StatusCode::OK],
        )
        .await
    }

    pub async fn frequent_foods(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::GET,
            "user/-/foods/log/frequent",
            &[],
            &[StatusCode::OK],
        )
        .await
    }

    pub async fn favorite_foods(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::GET,
            "user/-/foods/log/favorite",
            &[],
            &[StatusCode::OK],
        )
        .await
    }

    /// Fetches the details of one food from the database.
    pub async fn food(&self, food_id: &str) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("foods/{food_id}");
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Fetches the library of food units.
    pub async fn food_units(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(&settings, Method::GET, "foods/units", &[], &[StatusCode::OK])
            .await
    }

    /// Searches the public food database.
    pub async fn search_foods(&self, query: &str) -> Result<Value> {
        let settings = self.snapshot();
        let params = [("query".to_owned(), query.to_owned())];
        self.call(
            &settings,
            Method::GET,
            "foods/search",
            &params,
            &[StatusCode::OK],
        )
        .await
    }

    /// Fetches the meal sets of the authorized user.
    pub async fn meals(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(&settings, Method::GET, "user/-/meals", &[], &[StatusCode::OK])
            .await
    }

    /// Creates a private food for the authorized user.
    pub async fn create_food(&self, request: &CreateFoodRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "foods",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Logs a food entry.
    pub async fn log_food(&self, request: &LogFoodRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/foods/log",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Deletes a logged food entry.
    pub async fn delete_food(&self, food_log_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/foods/log/{food_log_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    pub async fn add_favorite_food(&self, food_id: &str) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/-/foods/log/favorite/{food_id}");
        self.call(&settings, Method::POST, &path, &[], &[StatusCode::CREATED])
            .await
    }

    pub async fn delete_favorite_food(&self, food_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/foods/log/favorite/{food_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    // ---- water ----

    /// Fetches the water log for a date.
    pub async fn water(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/-/foods/log/water/date/{}", date.format(DATE_FORMAT));
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Logs water consumption.
    pub async fn log_water(&self, request: &LogWaterRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/foods/log/water",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Deletes a logged water entry.
    pub async fn delete_water(&self, water_log_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/foods/log/water/{water_log_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    // ---- sleep ----

    /// Fetches the sleep log for a date.
    pub async fn sleep(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!(
            "user/{}/sleep/date/{}",
            settings.user_id,
            date.format(DATE_FORMAT)
        );
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Logs a sleep entry starting at `at` and lasting `duration_millis`.
    pub async fn log_sleep(&self, at: NaiveDateTime, duration_millis: u64) -> Result<Value> {
        let settings = self.snapshot();
        let params = [
            ("date".to_owned(), at.format(DATE_FORMAT).to_string()),
            ("startTime".to_owned(), at.format(TIME_FORMAT).to_string()),
            ("duration".to_owned(), duration_millis.to_string()),
        ];
        self.call(
            &settings,
            Method::POST,
            "user/-/sleep",
            &params,
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Deletes a logged sleep entry.
    pub async fn delete_sleep(&self, sleep_log_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/sleep/{sleep_log_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    // ---- body ----

    /// Fetches body measurements for a date.
    pub async fn body(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!(
            "user/{}/body/date/{}",
            settings.user_id,
            date.format(DATE_FORMAT)
        );
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Logs body measurements.
    pub async fn log_body(&self, request: &LogBodyRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/body",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Logs a weight measurement. Without a date the API logs it for today.
    /// For UK units the weight is a floating number of stones.
    pub async fn log_weight(&self, weight: Decimal, date: Option<NaiveDate>) -> Result<Value> {
        let settings = self.snapshot();
        let mut params = vec![("weight".to_owned(), weight.to_string())];
        if let Some(date) = date {
            params.push(("date".to_owned(), date.format(DATE_FORMAT).to_string()));
        }
        self.call(
            &settings,
            Method::POST,
            "user/-/body/weight",
            &params,
            &[StatusCode::CREATED],
        )
        .await
    }

    // ---- blood pressure ----

    /// Fetches blood pressure readings for a date.
    pub async fn blood_pressure(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/-/bp/date/{}", date.format(DATE_FORMAT));
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Logs a blood pressure reading.
    pub async fn log_blood_pressure(&self, request: &LogBloodPressureRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/bp",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Deletes a logged blood pressure reading.
    pub async fn delete_blood_pressure(&self, bp_log_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/bp/{bp_log_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    // ---- glucose ----

    /// Fetches blood glucose and HbA1c measurements for a date.
    pub async fn glucose(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/-/glucose/date/{}", date.format(DATE_FORMAT));
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Logs blood glucose and HbA1c measurements.
    pub async fn log_glucose(&self, request: &LogGlucoseRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/glucose",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    // ---- heart rate ----

    /// Fetches heart rate measurements for a date.
    pub async fn heart_rate(&self, date: NaiveDate) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/-/heart/date/{}", date.format(DATE_FORMAT));
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Logs a heart rate measurement.
    pub async fn log_heart_rate(&self, request: &LogHeartRateRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/heart",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Deletes a logged heart rate measurement.
    pub async fn delete_heart_rate(&self, heart_log_id: &str) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/heart/{heart_log_id}");
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    // ---- time series ----

    /// Fetches a daily time series for `resource` from `base_date` over
    /// `range`.
    ///
    /// Time-series responses are always requested as JSON, whatever format
    /// is configured. Returns `Ok(None)` when the response does not carry
    /// the expected series field.
    ///
    /// # Errors
    ///
    /// Fails with a [`crate::error::Status`] error on any non-200 response.
    pub async fn time_series(
        &self,
        resource: TimeSeriesResource,
        base_date: NaiveDate,
        range: TimeSeriesRange,
    ) -> Result<Option<Value>> {
        let settings = self.snapshot();
        let full_path = format!(
            "user/{}{}/date/{}/{range}.json",
            settings.user_id,
            resource.sub_path(),
            base_date.format(DATE_FORMAT),
        );
        let value = self
            .classified(
                &settings,
                Method::GET,
                full_path,
                &[],
                &[StatusCode::OK],
                ResponseFormat::Json,
            )
            .await?;

        Ok(value.get(resource.field_name().as_str()).cloned())
    }

    /// Fetches a minute-level intraday series for one day, optionally
    /// limited to a start/end time window.
    ///
    /// Subject to the same always-JSON and no-data rules as
    /// [`Self::time_series`].
    pub async fn intraday_time_series(
        &self,
        resource: IntradayResource,
        date: NaiveDate,
        window: Option<(NaiveTime, NaiveTime)>,
    ) -> Result<Option<Value>> {
        let settings = self.snapshot();
        let window_path = window
            .map(|(start, end)| {
                format!(
                    "/time/{}/{}",
                    start.format(TIME_FORMAT),
                    end.format(TIME_FORMAT)
                )
            })
            .unwrap_or_default();
        let full_path = format!(
            "user/-{}/date/{}/1d{window_path}.json",
            resource.sub_path(),
            date.format(DATE_FORMAT),
        );
        let value = self
            .classified(
                &settings,
                Method::GET,
                full_path,
                &[],
                &[StatusCode::OK],
                ResponseFormat::Json,
            )
            .await?;

        Ok(value.get(resource.field_name().as_str()).cloned())
    }

    // ---- devices ----

    /// Lists the devices of the target user.
    pub async fn devices(&self) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/{}/devices", settings.user_id);
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Fetches one device's properties.
    pub async fn device(&self, device_id: &str) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/{}/devices/{device_id}", settings.user_id);
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    // ---- friends ----

    /// Lists the friends of the target user.
    pub async fn friends(&self) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/{}/friends", settings.user_id);
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Fetches the friends leaderboard over the given period.
    pub async fn friends_leaderboard(&self, period: LeaderboardPeriod) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!("user/-/friends/leaders/{period}");
        self.call(&settings, Method::GET, &path, &[], &[StatusCode::OK])
            .await
    }

    /// Invites a user to become a friend.
    pub async fn invite_friend(&self, request: &InviteFriendRequest) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::POST,
            "user/-/friends/invitations",
            &request.params(),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Accepts a pending friend invitation from `from_user_id`.
    pub async fn accept_friend(&self, from_user_id: &str) -> Result<()> {
        self.respond_to_invitation(from_user_id, true).await
    }

    /// Rejects a pending friend invitation from `from_user_id`.
    pub async fn reject_friend(&self, from_user_id: &str) -> Result<()> {
        self.respond_to_invitation(from_user_id, false).await
    }

    async fn respond_to_invitation(&self, from_user_id: &str, accept: bool) -> Result<()> {
        let settings = self.snapshot();
        let path = format!("user/-/friends/invitations/{from_user_id}");
        let params = [("accept".to_owned(), accept.to_string())];
        self.call_no_content(&settings, Method::POST, &path, &params, StatusCode::NO_CONTENT)
            .await
    }

    // ---- subscriptions ----

    /// Subscribes to update notifications for a user, either for one
    /// collection (`activities`, `foods`, `sleep`, `body`) or for all of the
    /// user's data when `collection` is `None`.
    ///
    /// The API answers 200 when an equivalent subscription already existed
    /// and 201 when it was created; both count as success.
    pub async fn add_subscription(
        &self,
        user_id: &str,
        subscription_id: &str,
        collection: Option<&str>,
    ) -> Result<Value> {
        let settings = self.snapshot();
        let path = format!(
            "user/{user_id}{}/apiSubscriptions/{subscription_id}",
            collection_path(collection)
        );
        self.call(
            &settings,
            Method::POST,
            &path,
            &[],
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await
    }

    /// Removes a subscription.
    pub async fn delete_subscription(
        &self,
        user_id: &str,
        subscription_id: &str,
        collection: Option<&str>,
    ) -> Result<()> {
        let settings = self.snapshot();
        let path = format!(
            "user/{user_id}{}/apiSubscriptions/{subscription_id}",
            collection_path(collection)
        );
        self.call_no_content(&settings, Method::DELETE, &path, &[], StatusCode::NO_CONTENT)
            .await
    }

    /// Lists the subscriptions of the authorized user.
    pub async fn subscriptions(&self) -> Result<Value> {
        let settings = self.snapshot();
        self.call(
            &settings,
            Method::GET,
            "user/-/apiSubscriptions",
            &[],
            &[StatusCode::OK],
        )
        .await
    }

    // ---- account ----

    /// Fetches the rate-limit status: one quota for this client acting for
    /// the viewer, one for the client alone. Two independent fetches; the
    /// first error aborts the composite.
    ///
    /// # Errors
    ///
    /// Fails when either status fetch fails, or when a fetched payload does
    /// not carry the expected quota fields.
    pub async fn rate_limit(&self) -> Result<RateLimitStatus> {
        let settings = self.snapshot();
        let combined = self
            .call(
                &settings,
                Method::GET,
                "account/clientAndViewerRateLimitStatus",
                &[],
                &[StatusCode::OK],
            )
            .await?;
        let client = self
            .call(
                &settings,
                Method::GET,
                "account/clientRateLimitStatus",
                &[],
                &[StatusCode::OK],
            )
            .await?;

        let client_and_viewer = Quota::from_payload(&combined)
            .ok_or_else(|| Error::validation("rate limit status payload missing quota fields"))?;
        let client_only = Quota::from_payload(&client)
            .ok_or_else(|| Error::validation("rate limit status payload missing quota fields"))?;

        Ok(RateLimitStatus {
            client_and_viewer,
            client_only,
        })
    }
}

fn collection_path(collection: Option<&str>) -> String {
    collection
        .map(|name| format!("/{name}"))
        .unwrap_or_default()
}
