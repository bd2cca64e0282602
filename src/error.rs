//! Error taxonomy for the collector.
//!
//! Errors are split by how far they are allowed to travel:
//!
//! | Error | Scope | Handling |
//! |-------|-------|----------|
//! | [`SessionError`] | whole run | fatal, logged at the run boundary, browser still closed |
//! | [`ExtractionError`] | one post or one pass | logged, post skipped / pass counted as empty |
//! | [`DateParseError`] | one date label | logged, raw label kept |
//! | [`SinkWriteError`] | one sink | logged, the other sink is still attempted |
//! | [`ConfigError`] | startup | reported before any run starts |

use std::time::Duration;
use thiserror::Error;

/// Failure of a single page-driver operation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("webdriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("no visible element matching `{selector}` after {timeout:?}")]
    NotVisible { selector: String, timeout: Duration },
}

/// Fatal conditions that abort a collection run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not start browser session: {0}")]
    Connect(#[source] DriverError),

    #[error("login failed at step `{step}`: {source}")]
    Login {
        step: &'static str,
        #[source]
        source: DriverError,
    },

    #[error("login did not complete within {0:?}; still on the login page")]
    LoginTimeout(Duration),

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: DriverError,
    },

    #[error("feed container never became visible: {0}")]
    FeedNotVisible(#[source] DriverError),
}

/// Failures while reading the rendered feed.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("feed unavailable for this pass: {0}")]
    Feed(#[source] DriverError),

    #[error("failed to read {field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: DriverError,
    },

    #[error("unexpected value for {field}: {value}")]
    UnexpectedValue { field: &'static str, value: String },
}

/// Reasons a date label matched a known shape but could not be turned into an instant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("number out of range: {0}")]
    Number(String),

    #[error("unknown month name: {0}")]
    UnknownMonth(String),

    #[error("no such calendar date or time")]
    InvalidDate,

    #[error("offset falls outside the supported date range")]
    OutOfRange,
}

/// Failure of one output sink.
#[derive(Debug, Error)]
pub enum SinkWriteError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Invalid or missing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential `{0}` (set it via flag, environment or .env)")]
    MissingCredential(&'static str),

    #[error("invalid url for {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid duration for {name}: {value}")]
    InvalidDelay { name: &'static str, value: f64 },
}
