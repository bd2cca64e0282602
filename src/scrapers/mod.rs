//! Site-specific extractors.
//!
//! An extractor turns the page currently rendered by a
//! [`PageDriver`](crate::driver::PageDriver) into [`RawPost`](crate::models::RawPost)s.
//! It knows the site's selectors and scripts; it knows nothing about
//! scrolling, deduplication or output.
//!
//! | Site | Module | Feed |
//! |------|--------|------|
//! | Facebook | [`facebook`] | group page feed |

pub mod facebook;
