//! Page driver capability.
//!
//! The collector never talks to a browser directly. Everything it needs from
//! a live page goes through [`PageDriver`], so the extraction and scroll logic
//! can run against a real WebDriver session ([`webdriver::WebDriverSession`])
//! or a scripted in-memory page in tests.
//!
//! A driver is owned by exactly one run. [`PageDriver::close`] consumes it; the
//! run calls it on every exit path.

use crate::config::{Credentials, SessionConfig};
use crate::error::{DriverError, SessionError};
use serde_json::Value;
use std::time::Duration;

#[cfg(test)]
pub mod fake;
pub mod webdriver;

/// Operations the collector needs from a rendered page.
pub trait PageDriver: Sized {
    /// Handle to an element in the rendered page.
    type Element;

    /// Load `url` in the current tab.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Wait up to `timeout` for the first visible element matching `selector`.
    async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    /// All elements under `scope` matching `selector`.
    async fn find_all(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, DriverError>;

    /// Run `script` with `element` bound to `arguments[0]` and return its result.
    async fn evaluate(&self, script: &str, element: &Self::Element) -> Result<Value, DriverError>;

    /// Scroll the window to the bottom of the document.
    async fn scroll_to_bottom(&self) -> Result<(), DriverError>;

    /// End the session and release the browser.
    async fn close(self) -> Result<(), DriverError>;
}

/// Signing in to the site, once per session before the feed is opened.
pub trait Authenticate {
    /// Log in with `credentials`, completing once the site has let the session in.
    async fn login(
        &self,
        config: &SessionConfig,
        credentials: &Credentials,
    ) -> Result<(), SessionError>;
}
