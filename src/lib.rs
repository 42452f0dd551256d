#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod client;
pub mod error;
pub mod format;
pub mod types;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Host serving the REST API.
pub const DEFAULT_API_HOST: &str = "api.fitbit.com";

/// Host serving the user-facing authorization page.
pub const DEFAULT_AUTH_HOST: &str = "www.fitbit.com";

pub use crate::client::{Client, Config};
pub use crate::format::ResponseFormat;
