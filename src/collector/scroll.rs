//! The scroll-collection loop.
//!
//! ```text
//! Initializing ──▶ Extracting ──▶ Scrolling ──▶ Extracting ──▶ …
//!                      │
//!                      ├──▶ Converged             (too many empty passes in a row)
//!                      └──▶ MaxIterationsReached  (pass budget spent)
//! ```
//!
//! Passes run strictly one after another against a single page: extraction
//! against a feed that is still rendering would give inconsistent reads.

use crate::collector::accumulator::CollectionState;
use crate::config::CollectorConfig;
use crate::dates::DateNormalizer;
use crate::driver::PageDriver;
use crate::models::NormalizedPost;
use crate::scrapers::facebook::extract_posts;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Initializing,
    Extracting,
    Scrolling,
    Converged,
    MaxIterationsReached,
}

/// How a collection loop ended. Both endings hand their posts to the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Several passes in a row found nothing new.
    Converged,
    /// The pass budget ran out first; the result may be partial.
    MaxIterationsReached,
}

#[derive(Debug)]
pub struct CollectionOutcome {
    pub termination: Termination,
    pub passes: usize,
    pub posts: Vec<NormalizedPost>,
}

/// Extract, merge and scroll until the feed stops yielding new posts or the
/// pass budget is spent.
///
/// A pass whose feed cannot be read counts as a pass with no new posts. A
/// failed scroll is logged and the next pass reads whatever is rendered.
#[instrument(level = "info", skip_all, fields(max_scrolls = config.max_scrolls))]
pub async fn scroll_collect<D: PageDriver>(driver: &D, config: &CollectorConfig) -> CollectionOutcome {
    let normalizer = DateNormalizer::new(config.months);
    let mut state = CollectionState::new();
    let mut passes = 0usize;
    let mut phase = LoopState::Initializing;

    let termination = loop {
        phase = match phase {
            LoopState::Initializing => {
                if config.max_scrolls == 0 {
                    LoopState::MaxIterationsReached
                } else {
                    LoopState::Extracting
                }
            }
            LoopState::Extracting => {
                let pass = match extract_posts(
                    driver,
                    config.feed_wait_timeout,
                    config.min_post_text_length,
                )
                .await
                {
                    Ok(pass) => pass,
                    Err(e) => {
                        warn!(pass = passes + 1, error = %e, "Error retrieving posts; counting pass as empty");
                        Vec::new()
                    }
                };
                passes += 1;

                let new_posts = state.merge(pass, &normalizer);
                info!(
                    pass = passes,
                    new = new_posts,
                    total = state.len(),
                    empty_streak = state.consecutive_empty_passes(),
                    "Merged pass"
                );

                if state.consecutive_empty_passes() > config.max_consecutive_empty_passes {
                    LoopState::Converged
                } else if passes >= config.max_scrolls {
                    LoopState::MaxIterationsReached
                } else {
                    LoopState::Scrolling
                }
            }
            LoopState::Scrolling => {
                if let Err(e) = driver.scroll_to_bottom().await {
                    warn!(error = %e, "Scrolling failed");
                }
                debug!(delay = ?config.scroll_settle_delay, "Waiting for feed to settle");
                sleep(config.scroll_settle_delay).await;
                LoopState::Extracting
            }
            LoopState::Converged => break Termination::Converged,
            LoopState::MaxIterationsReached => break Termination::MaxIterationsReached,
        };
    };

    match termination {
        Termination::Converged => {
            info!(passes, total = state.len(), "No new posts found; stopped scrolling")
        }
        Termination::MaxIterationsReached => {
            info!(passes, total = state.len(), "Reached maximum number of passes")
        }
    }

    CollectionOutcome {
        termination,
        passes,
        posts: state.into_posts(),
    }
}
