//! Cross-pass deduplication.
//!
//! A [`CollectionState`] lives for exactly one run. Every pass re-reads all
//! rendered posts, so most of what a pass returns has been seen before; the
//! state keeps the first sighting of each post text, in discovery order.
//!
//! Identity is the full post text. Two distinct posts with identical text
//! collapse into one.

use crate::dates::DateNormalizer;
use crate::models::{NormalizedPost, RawPost};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct CollectionState {
    seen: HashSet<String>,
    accumulated: Vec<NormalizedPost>,
    consecutive_empty_passes: usize,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one pass and return how many posts were new.
    ///
    /// Dates are normalized as each new post is added. A pass that adds
    /// nothing bumps the empty-pass counter; any new post resets it.
    pub fn merge(&mut self, pass: Vec<RawPost>, normalizer: &DateNormalizer) -> usize {
        let before = self.accumulated.len();

        for raw in pass {
            if self.seen.contains(&raw.text) {
                continue;
            }
            self.seen.insert(raw.text.clone());
            let post_date = normalizer.normalize(&raw.raw_date);
            self.accumulated.push(NormalizedPost::from_raw(raw, post_date));
        }

        let new_count = self.accumulated.len() - before;
        if new_count == 0 {
            self.consecutive_empty_passes += 1;
        } else {
            self.consecutive_empty_passes = 0;
        }
        new_count
    }

    pub fn consecutive_empty_passes(&self) -> usize {
        self.consecutive_empty_passes
    }

    #[cfg(test)]
    pub fn accumulated(&self) -> &[NormalizedPost] {
        &self.accumulated
    }

    pub fn len(&self) -> usize {
        self.accumulated.len()
    }

    pub fn into_posts(self) -> Vec<NormalizedPost> {
        self.accumulated
    }
}
