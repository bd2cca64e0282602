//! [`PageDriver`] backed by a WebDriver server (chromedriver) through `thirtyfour`.
//!
//! Besides the generic page operations this session knows how to log in, which
//! is the only site interaction that types into the page.

use super::{Authenticate, PageDriver};
use crate::config::{Credentials, SessionConfig};
use crate::error::{DriverError, SessionError};
use serde_json::Value;
use std::time::{Duration, Instant};
use thirtyfour::ChromiumLikeCapabilities;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// Interval between visibility checks while waiting on an element.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// A live browser session.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    /// Start a Chrome session on the WebDriver server at `config.webdriver_url`.
    #[instrument(level = "info", skip_all, fields(webdriver_url = %config.webdriver_url))]
    pub async fn connect(config: &SessionConfig) -> Result<Self, SessionError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--start-maximized")
            .map_err(|e| SessionError::Connect(e.into()))?;
        if config.headless {
            caps.set_headless()
                .map_err(|e| SessionError::Connect(e.into()))?;
        }

        let driver = WebDriver::new(config.webdriver_url.as_str(), caps)
            .await
            .map_err(|e| SessionError::Connect(e.into()))?;
        info!(headless = config.headless, "Browser session started");
        Ok(Self { driver })
    }

    async fn wait_for_field(
        &self,
        by: By,
        step: &'static str,
        timeout: Duration,
    ) -> Result<WebElement, SessionError> {
        self.driver
            .query(by)
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map_err(|e| login_step(step, e))
    }

    async fn wait_until_left_login_page(&self, timeout: Duration) -> Result<(), SessionError> {
        let started = Instant::now();
        loop {
            let current = self
                .driver
                .current_url()
                .await
                .map_err(|e| login_step("redirect", e))?;
            debug!(url = %current, "Waiting for login redirect");
            if !current.path().starts_with("/login") {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(SessionError::LoginTimeout(timeout));
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

impl Authenticate for WebDriverSession {
    /// Log in through the login form at `config.login_url`.
    ///
    /// Completes once the browser has navigated away from the login page.
    #[instrument(level = "info", skip_all, fields(login_url = %config.login_url))]
    async fn login(
        &self,
        config: &SessionConfig,
        credentials: &Credentials,
    ) -> Result<(), SessionError> {
        self.navigate(config.login_url.as_str())
            .await
            .map_err(|source| SessionError::Navigation {
                url: config.login_url.to_string(),
                source,
            })?;

        let email = self
            .wait_for_field(By::Name("email"), "email", config.session_timeout)
            .await?;
        email
            .send_keys(credentials.email.as_str())
            .await
            .map_err(|e| login_step("email", e))?;
        sleep(config.page_settle_delay).await;

        let password = self
            .wait_for_field(By::Name("pass"), "pass", config.session_timeout)
            .await?;
        password
            .send_keys(credentials.password.as_str())
            .await
            .map_err(|e| login_step("pass", e))?;
        sleep(config.page_settle_delay).await;

        let button = self
            .driver
            .query(By::Name("login"))
            .wait(config.session_timeout, POLL_INTERVAL)
            .and_clickable()
            .first()
            .await
            .map_err(|e| login_step("login", e))?;
        button.click().await.map_err(|e| login_step("login", e))?;

        self.wait_until_left_login_page(config.session_timeout)
            .await?;
        info!("Logged in");
        Ok(())
    }
}

fn login_step(step: &'static str, error: WebDriverError) -> SessionError {
    SessionError::Login {
        step,
        source: error.into(),
    }
}

impl PageDriver for WebDriverSession {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<WebElement, DriverError> {
        self.driver
            .query(By::Css(selector))
            .wait(timeout, POLL_INTERVAL)
            .and_displayed()
            .first_opt()
            .await?
            .ok_or_else(|| DriverError::NotVisible {
                selector: selector.to_string(),
                timeout,
            })
    }

    async fn find_all(
        &self,
        scope: &WebElement,
        selector: &str,
    ) -> Result<Vec<WebElement>, DriverError> {
        Ok(scope.find_all(By::Css(selector)).await?)
    }

    async fn evaluate(&self, script: &str, element: &WebElement) -> Result<Value, DriverError> {
        let ret = self
            .driver
            .execute(script, vec![element.to_json()?])
            .await?;
        Ok(ret.convert()?)
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        self.driver
            .execute(SCROLL_TO_BOTTOM_SCRIPT, Vec::new())
            .await?;
        Ok(())
    }

    async fn close(self) -> Result<(), DriverError> {
        self.driver.quit().await?;
        Ok(())
    }
}
