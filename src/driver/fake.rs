//! Scripted in-memory page for tests.
//!
//! Each [`FakePass`] is what the feed renders between two scrolls; every
//! `scroll_to_bottom` moves to the next pass, staying on the last one once
//! the script runs out. Login and scrolling succeed unless the driver is told
//! to fail them.

use super::{Authenticate, PageDriver};
use crate::config::{Credentials, SessionConfig};
use crate::error::{DriverError, SessionError};
use crate::scrapers::facebook::{
    COMMENT_SELECTOR, COMMENTER_SELECTOR, FEED_SELECTOR, INNER_TEXT_SCRIPT, POST_DATE_SCRIPT,
    POST_SELECTOR, POST_TEXT_SCRIPT,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FakePost {
    pub text: Value,
    pub date: String,
    pub commenters: Vec<String>,
    pub comments: Vec<String>,
}

impl FakePost {
    pub fn new(text: &str, date: &str) -> Self {
        Self {
            text: Value::String(text.to_string()),
            date: date.to_string(),
            commenters: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// A post whose text script returns something that is not a string.
    pub fn broken() -> Self {
        Self {
            text: Value::from(42),
            date: String::new(),
            commenters: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_comment(mut self, commenter: &str, comment: &str) -> Self {
        self.commenters.push(commenter.to_string());
        self.comments.push(comment.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub enum FakePass {
    Rendered(Vec<FakePost>),
    /// The feed container does not show up during this pass.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeElement {
    Feed,
    Post(usize),
    Commenter(usize, usize),
    Comment(usize, usize),
}

/// Observations shared with the test after the driver has been closed.
#[derive(Debug, Default)]
pub struct FakeLog {
    pub scrolls: AtomicUsize,
    pub closed: AtomicBool,
    pub navigated: Mutex<Vec<String>>,
}

impl FakeLog {
    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct FakeDriver {
    passes: Vec<FakePass>,
    current: AtomicUsize,
    fail_login: bool,
    fail_scrolls: bool,
    pub log: Arc<FakeLog>,
}

impl FakeDriver {
    pub fn new(passes: Vec<FakePass>) -> Self {
        Self {
            passes,
            current: AtomicUsize::new(0),
            fail_login: false,
            fail_scrolls: false,
            log: Arc::new(FakeLog::default()),
        }
    }

    pub fn rendered(posts: Vec<FakePost>) -> Self {
        Self::new(vec![FakePass::Rendered(posts)])
    }

    /// Every login attempt times out.
    pub fn failing_login(mut self) -> Self {
        self.fail_login = true;
        self
    }

    /// Every scroll fails and the page stays on its current pass.
    pub fn failing_scrolls(mut self) -> Self {
        self.fail_scrolls = true;
        self
    }

    fn pass(&self) -> &FakePass {
        let index = self
            .current
            .load(Ordering::SeqCst)
            .min(self.passes.len().saturating_sub(1));
        self.passes.get(index).unwrap_or(&FakePass::Unavailable)
    }

    fn posts(&self) -> &[FakePost] {
        match self.pass() {
            FakePass::Rendered(posts) => posts,
            FakePass::Unavailable => &[],
        }
    }
}

impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.log.navigated.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<FakeElement, DriverError> {
        match (selector, self.pass()) {
            (FEED_SELECTOR, FakePass::Rendered(_)) => Ok(FakeElement::Feed),
            _ => Err(DriverError::NotVisible {
                selector: selector.to_string(),
                timeout,
            }),
        }
    }

    async fn find_all(
        &self,
        scope: &FakeElement,
        selector: &str,
    ) -> Result<Vec<FakeElement>, DriverError> {
        let posts = self.posts();
        let found = match (*scope, selector) {
            (FakeElement::Feed, POST_SELECTOR) => (0..posts.len()).map(FakeElement::Post).collect(),
            (FakeElement::Post(p), COMMENTER_SELECTOR) => (0..posts[p].commenters.len())
                .map(|i| FakeElement::Commenter(p, i))
                .collect(),
            (FakeElement::Post(p), COMMENT_SELECTOR) => (0..posts[p].comments.len())
                .map(|i| FakeElement::Comment(p, i))
                .collect(),
            _ => Vec::new(),
        };
        Ok(found)
    }

    async fn evaluate(&self, script: &str, element: &FakeElement) -> Result<Value, DriverError> {
        let posts = self.posts();
        let value = match (script, *element) {
            (POST_TEXT_SCRIPT, FakeElement::Post(p)) => posts[p].text.clone(),
            (POST_DATE_SCRIPT, FakeElement::Post(p)) => Value::String(posts[p].date.clone()),
            (INNER_TEXT_SCRIPT, FakeElement::Commenter(p, i)) => {
                Value::String(posts[p].commenters[i].clone())
            }
            (INNER_TEXT_SCRIPT, FakeElement::Comment(p, i)) => {
                Value::String(posts[p].comments[i].clone())
            }
            _ => Value::Null,
        };
        Ok(value)
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        self.log.scrolls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scrolls {
            return Err(DriverError::NotVisible {
                selector: "body".to_string(),
                timeout: Duration::ZERO,
            });
        }
        self.current.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(self) -> Result<(), DriverError> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Authenticate for FakeDriver {
    async fn login(
        &self,
        config: &SessionConfig,
        _credentials: &Credentials,
    ) -> Result<(), SessionError> {
        self.navigate(config.login_url.as_str())
            .await
            .map_err(|source| SessionError::Navigation {
                url: config.login_url.to_string(),
                source,
            })?;
        if self.fail_login {
            return Err(SessionError::LoginTimeout(config.session_timeout));
        }
        Ok(())
    }
}
