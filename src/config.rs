//! Runtime settings, resolved once from the CLI at startup.

use crate::cli::{Cli, MonthLocale};
use crate::dates::MonthTable;
use crate::error::ConfigError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Account used to log in.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Browser session and navigation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub webdriver_url: Url,
    pub login_url: Url,
    pub feed_url: Url,
    pub headless: bool,
    pub session_timeout: Duration,
    pub page_settle_delay: Duration,
}

/// Knobs of the scroll-collection loop.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub max_scrolls: usize,
    pub scroll_settle_delay: Duration,
    pub max_consecutive_empty_passes: usize,
    pub min_post_text_length: usize,
    pub feed_wait_timeout: Duration,
    pub months: MonthTable,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_scrolls: 15,
            scroll_settle_delay: Duration::from_secs(2),
            max_consecutive_empty_passes: 2,
            min_post_text_length: 20,
            feed_wait_timeout: Duration::from_secs(10),
            months: MonthTable::french(),
        }
    }
}

/// Database and collection the posts are inserted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStoreTarget {
    pub database: String,
    pub collection: String,
}

/// Where the collected posts go.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub output_path: PathBuf,
    pub mongo_uri: String,
    pub document_store: DocumentStoreTarget,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub session: SessionConfig,
    pub collector: CollectorConfig,
    pub sinks: SinkConfig,
    pub credentials: Credentials,
    pub schedule: String,
}

impl Settings {
    /// Validate the CLI and resolve it into settings.
    ///
    /// # Errors
    ///
    /// A missing credential, a malformed URL, or a negative / non-finite delay.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let email = non_empty(cli.email.as_deref()).ok_or(ConfigError::MissingCredential("FB_EMAIL"))?;
        let password =
            non_empty(cli.password.as_deref()).ok_or(ConfigError::MissingCredential("FB_PASSWORD"))?;

        let session = SessionConfig {
            webdriver_url: parse_url("webdriver-url", &cli.webdriver_url)?,
            login_url: parse_url("login-url", &cli.login_url)?,
            feed_url: parse_url("feed-url", &cli.feed_url)?,
            headless: cli.headless,
            session_timeout: seconds("session-timeout-secs", cli.session_timeout_secs)?,
            page_settle_delay: seconds("page-settle-delay-secs", cli.page_settle_delay_secs)?,
        };

        let months = match cli.month_locale {
            MonthLocale::Fr => MonthTable::french(),
            MonthLocale::En => MonthTable::english(),
        };
        let collector = CollectorConfig {
            max_scrolls: cli.max_scrolls,
            scroll_settle_delay: seconds("scroll-settle-delay-secs", cli.scroll_settle_delay_secs)?,
            max_consecutive_empty_passes: cli.max_consecutive_empty_passes,
            min_post_text_length: cli.min_post_text_length,
            feed_wait_timeout: seconds("feed-wait-timeout-secs", cli.feed_wait_timeout_secs)?,
            months,
        };

        let sinks = SinkConfig {
            output_path: cli.output_path.clone(),
            mongo_uri: cli.mongo_uri.clone(),
            document_store: DocumentStoreTarget {
                database: cli.mongo_database.clone(),
                collection: cli.mongo_collection.clone(),
            },
        };

        Ok(Self {
            session,
            collector,
            sinks,
            credentials: Credentials {
                email: email.to_string(),
                password: password.to_string(),
            },
            schedule: cli.schedule.clone(),
        })
    }
}

/// `value` unchanged, unless it is missing or only whitespace.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn seconds(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDelay { name, value })
}
