//! Data models for collected posts.
//!
//! - [`RawPost`]: what one extraction pass reads out of a rendered post
//! - [`NormalizedPost`]: the durable record handed to the sinks
//! - [`PostDate`]: a normalized instant, or the original label when it could not be parsed
//!
//! [`NormalizedPost`] serializes with camelCase keys (`postText`, `postDate`,
//! `comments`, `commenters`) so documents in the store keep the same shape as
//! the flat-file header.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

/// Format used for every normalized instant, second precision, no offset.
pub const POST_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A post as read from the page during a single pass.
///
/// Produced by the extractor and consumed immediately by
/// [`CollectionState::merge`](crate::collector::accumulator::CollectionState::merge).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPost {
    /// Visible message text, empty when the post has none.
    pub text: String,
    /// Accessible label of the post's time link, empty when absent.
    pub raw_date: String,
    /// Comment bodies in rendered order.
    pub comments: Vec<String>,
    /// Commenter display names in rendered order.
    pub commenters: Vec<String>,
}

impl RawPost {
    /// Whether the post carries enough text to be worth keeping.
    ///
    /// Length is counted in characters, and must be strictly greater than
    /// `min_len`; reactions, stickers and link-only shares fall below it.
    pub fn is_substantial(&self, min_len: usize) -> bool {
        !self.text.is_empty() && self.text.chars().count() > min_len
    }
}

/// Publication time of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostDate {
    /// A parsed local instant.
    Instant(NaiveDateTime),
    /// The label as shown on the page, kept when no known shape matched.
    Raw(String),
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostDate::Instant(at) => write!(f, "{}", at.format(POST_DATE_FORMAT)),
            PostDate::Raw(label) => f.write_str(label),
        }
    }
}

impl Serialize for PostDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A collected post, immutable once created.
///
/// `post_text` is the identity key within a run: two posts whose text is
/// identical are treated as the same post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPost {
    pub post_text: String,
    pub post_date: PostDate,
    pub comments: Vec<String>,
    pub commenters: Vec<String>,
}

impl NormalizedPost {
    /// Build from a raw post once its date label has been normalized.
    pub fn from_raw(raw: RawPost, post_date: PostDate) -> Self {
        Self {
            post_text: raw.text,
            post_date,
            comments: raw.comments,
            commenters: raw.commenters,
        }
    }
}
