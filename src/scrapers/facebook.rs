//! Facebook group feed extractor.
//!
//! Reads every post currently rendered in the group feed. A pass always
//! returns *all* rendered posts that pass the length filter, including the ones
//! seen on earlier passes; deduplication happens in the accumulator.
//!
//! # Selectors
//!
//! All subfield queries are scoped to the post element so that comments of one
//! post never leak into its neighbour.
//!
//! | What | How |
//! |------|-----|
//! | feed container | `div[role='feed']` |
//! | post | direct `div` children of the feed |
//! | message text | `innerText` of `[data-ad-preview="message"]` |
//! | date label | `aria-label` of the first `a[aria-label]` |
//! | commenters | Facebook's generated class list on the name `span` |
//! | comments | `div[dir='auto'][style='text-align: start;']` |

use crate::driver::PageDriver;
use crate::error::ExtractionError;
use crate::models::RawPost;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, instrument};

pub const FEED_SELECTOR: &str = "div[role='feed']";
pub const POST_SELECTOR: &str = ":scope > div";
pub const COMMENTER_SELECTOR: &str = "span.x193iq5w.xeuugli.x13faqbe.x1vvkbs.x1xmvt09.x1lliihq.x1s928wv.xhkezso.x1gmr53x.x1cpjm7i.x1fgarty.x1943h6x.x4zkp8e.x676frb.x1nxh6w3.x1sibtaa.x1s688f.xzsf02u";
pub const COMMENT_SELECTOR: &str = "div[dir='auto'][style='text-align: start;']";

pub const POST_TEXT_SCRIPT: &str =
    "return arguments[0].querySelector('[data-ad-preview=\"message\"]')?.innerText || '';";
pub const POST_DATE_SCRIPT: &str =
    "return arguments[0].querySelector('a[aria-label]')?.getAttribute('aria-label') || '';";
pub const INNER_TEXT_SCRIPT: &str = "return arguments[0].innerText || '';";

/// Extract the posts currently rendered in the feed.
///
/// Posts are read one after another, in page order. A post whose subfields
/// cannot be read is logged and skipped without affecting its neighbours.
///
/// # Arguments
///
/// * `driver` - The page to read.
/// * `feed_timeout` - How long to wait for the feed container.
/// * `min_text_len` - Posts with this many characters of text or fewer are dropped.
///
/// # Returns
///
/// Every rendered post that passed the length filter, including posts seen
/// on earlier passes.
///
/// # Errors
///
/// [`ExtractionError::Feed`] when the feed container or its children cannot
/// be reached at all.
#[instrument(level = "info", skip_all)]
pub async fn extract_posts<D: PageDriver>(
    driver: &D,
    feed_timeout: Duration,
    min_text_len: usize,
) -> Result<Vec<RawPost>, ExtractionError> {
    let feed = driver
        .wait_for_visible(FEED_SELECTOR, feed_timeout)
        .await
        .map_err(ExtractionError::Feed)?;
    let elements = driver
        .find_all(&feed, POST_SELECTOR)
        .await
        .map_err(ExtractionError::Feed)?;
    info!(count = elements.len(), "Found posts");

    let results: Vec<(usize, Result<RawPost, ExtractionError>)> =
        stream::iter(elements.iter().enumerate())
            .then(|(index, element)| async move { (index, extract_post(driver, element).await) })
            .collect()
            .await;

    let (posts, failures): (Vec<_>, Vec<_>) = results
        .into_iter()
        .map(|(index, result)| result.map_err(|e| (index, e)))
        .partition_result();

    for (index, e) in &failures {
        error!(post = index + 1, error = %e, "Error retrieving post data; skipping post");
    }

    let kept: Vec<RawPost> = posts
        .into_iter()
        .filter(|post| post.is_substantial(min_text_len))
        .inspect(|post| info!(preview = %truncate_for_log(&post.text, 50), "Post collected"))
        .collect();

    info!(
        kept = kept.len(),
        skipped = failures.len(),
        "Extraction pass complete"
    );
    Ok(kept)
}

/// Read one post's text, date label, commenters and comments.
async fn extract_post<D: PageDriver>(
    driver: &D,
    post: &D::Element,
) -> Result<RawPost, ExtractionError> {
    let text = read_string(driver, POST_TEXT_SCRIPT, post, "post text").await?;
    let raw_date = read_string(driver, POST_DATE_SCRIPT, post, "post date").await?;
    let commenters = read_texts(driver, post, COMMENTER_SELECTOR, "commenters").await?;
    let comments = read_texts(driver, post, COMMENT_SELECTOR, "comments").await?;

    Ok(RawPost {
        text,
        raw_date,
        comments,
        commenters,
    })
}

/// Evaluate a string-valued script; `null` reads as empty.
async fn read_string<D: PageDriver>(
    driver: &D,
    script: &str,
    element: &D::Element,
    field: &'static str,
) -> Result<String, ExtractionError> {
    let value = driver
        .evaluate(script, element)
        .await
        .map_err(|source| ExtractionError::Field { field, source })?;

    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Err(ExtractionError::UnexpectedValue {
            field,
            value: other.to_string(),
        }),
    }
}

/// Trimmed, non-empty inner texts of every element under `scope` matching `selector`.
async fn read_texts<D: PageDriver>(
    driver: &D,
    scope: &D::Element,
    selector: &str,
    field: &'static str,
) -> Result<Vec<String>, ExtractionError> {
    let elements = driver
        .find_all(scope, selector)
        .await
        .map_err(|source| ExtractionError::Field { field, source })?;

    let mut texts = Vec::with_capacity(elements.len());
    for element in &elements {
        let text = read_string(driver, INNER_TEXT_SCRIPT, element, field).await?;
        let text = text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }
    Ok(texts)
}
