//! Session-scoped preview URLs.
//!
//! Each payload that enters the scanner gets a `preview://N` URL so the
//! history view can show the original image in a larger preview.  URLs live
//! until revoked (when a detail view is closed) or until the session ends.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::ImagePayload;

/// Opaque handle to a registered payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps preview URLs to the payloads they show.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next: u64,
    entries: HashMap<PreviewUrl, Arc<ImagePayload>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `payload` and return its fresh URL.
    pub fn register(&mut self, payload: Arc<ImagePayload>) -> PreviewUrl {
        self.next += 1;
        let url = PreviewUrl(format!("preview://{}", self.next));
        self.entries.insert(url.clone(), payload);
        url
    }

    pub fn resolve(&self, url: &PreviewUrl) -> Option<Arc<ImagePayload>> {
        self.entries.get(url).cloned()
    }

    pub fn contains(&self, url: &PreviewUrl) -> bool {
        self.entries.contains_key(url)
    }

    /// Release `url`.  Returns `false` if it was already gone.
    pub fn revoke(&mut self, url: &PreviewUrl) -> bool {
        self.entries.remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
