//! Ordered endpoint list plus the "last successful" index that decides where
//! each call starts probing.

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Endpoint list with a sticky starting position.
///
/// The sticky index is a single atomic word. Concurrent calls may race on
/// [`EndpointRotator::record_success`]; the worst case is one call starting at
/// a slightly stale endpoint, never an invalid index.
#[derive(Debug)]
pub struct EndpointRotator {
    urls: Vec<String>,
    sticky: AtomicUsize,
}

impl EndpointRotator {
    pub fn new<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        if urls.is_empty() {
            bail!("at least one RPC endpoint is required");
        }

        Ok(Self {
            urls,
            sticky: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn sticky_index(&self) -> usize {
        self.sticky.load(Ordering::Relaxed)
    }

    /// Every endpoint exactly once, starting at the sticky index and wrapping.
    pub fn probe_order(&self) -> Vec<(usize, &str)> {
        let len = self.urls.len();
        let start = self.sticky_index() % len;
        (0..len)
            .map(|offset| {
                let index = (start + offset) % len;
                (index, self.urls[index].as_str())
            })
            .collect()
    }

    pub fn record_success(&self, index: usize) {
        if index < self.urls.len() {
            self.sticky.store(index, Ordering::Relaxed);
        }
    }
}
