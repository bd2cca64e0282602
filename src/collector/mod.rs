//! One collection run, end to end.
//!
//! 1. **Session**: start a browser and log in
//! 2. **Open feed**: navigate to the group and wait for the feed container
//! 3. **Collect**: the scroll loop in [`scroll`], deduplicating through [`accumulator`]
//! 4. **Release**: close the browser, on success and on failure alike
//! 5. **Deliver**: hand the posts to the sinks (skipped when there are none)
//!
//! [`run`] never fails: fatal errors are logged here so a scheduled trigger
//! cannot take the process down. A run where a sink failed ends with a
//! warning naming the outputs that were not saved.

pub mod accumulator;
pub mod scroll;

use crate::config::{CollectorConfig, SessionConfig, Settings};
use crate::driver::{Authenticate, PageDriver};
use crate::driver::webdriver::WebDriverSession;
use crate::error::SessionError;
use crate::outputs::{self, Delivery, SinkAdapter, Sinks};
use crate::scrapers::facebook::FEED_SELECTOR;
use scroll::{CollectionOutcome, scroll_collect};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Run one collection against a fresh browser session and store the result.
#[instrument(level = "info", skip_all, fields(feed_url = %settings.session.feed_url))]
pub async fn run(settings: &Settings) {
    let start_time = Instant::now();
    let sinks = Sinks::new(settings.sinks.mongo_uri.as_str());

    match try_run(settings, &sinks).await {
        Ok(Delivery::NoData) => info!("Run finished without data"),
        Ok(delivery) => match delivery.failed_sinks().as_slice() {
            [] => info!("Scraping and saving complete"),
            failed => warn!(?failed, "Scraping complete but some outputs were not saved"),
        },
        Err(e) => error!(error = %e, "Collection run failed"),
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Run complete");
}

async fn try_run<S: SinkAdapter>(settings: &Settings, sinks: &S) -> Result<Delivery, SessionError> {
    let session = WebDriverSession::connect(&settings.session).await?;
    let outcome = collect_in_session(session, settings).await?;
    Ok(outputs::deliver(sinks, &outcome.posts, &settings.sinks).await)
}

/// Log in, collect, then close the session.
///
/// The driver is closed on every path, including a failed login or a feed
/// that never shows up, before the result is returned.
///
/// # Arguments
///
/// * `driver` - A freshly connected session; consumed by this call.
/// * `settings` - Login, navigation and loop settings.
///
/// # Errors
///
/// Any [`SessionError`] from login or from opening the feed. Failures inside
/// the scroll loop are not errors.
pub async fn collect_in_session<D: PageDriver + Authenticate>(
    driver: D,
    settings: &Settings,
) -> Result<CollectionOutcome, SessionError> {
    let collected = match driver
        .login(&settings.session, &settings.credentials)
        .await
    {
        Ok(()) => collect(&driver, &settings.session, &settings.collector).await,
        Err(e) => Err(e),
    };
    release(driver).await;
    collected
}

/// Open the feed and run the scroll loop.
///
/// # Errors
///
/// Navigation failure, or the feed container not showing up within the
/// session timeout.
pub async fn collect<D: PageDriver>(
    driver: &D,
    session: &SessionConfig,
    collector: &CollectorConfig,
) -> Result<CollectionOutcome, SessionError> {
    driver
        .navigate(session.feed_url.as_str())
        .await
        .map_err(|source| SessionError::Navigation {
            url: session.feed_url.to_string(),
            source,
        })?;
    sleep(session.page_settle_delay).await;

    driver
        .wait_for_visible(FEED_SELECTOR, session.session_timeout)
        .await
        .map_err(SessionError::FeedNotVisible)?;
    info!("Feed is visible; starting collection");

    let outcome = scroll_collect(driver, collector).await;
    info!(
        termination = ?outcome.termination,
        passes = outcome.passes,
        posts = outcome.posts.len(),
        "Collection finished"
    );
    Ok(outcome)
}

/// Close the session, logging instead of failing.
async fn release<D: PageDriver>(driver: D) {
    match driver.close().await {
        Ok(()) => info!("Browser session closed"),
        Err(e) => warn!(error = %e, "Failed to close browser session"),
    }
}
