//! Header scrubbing before headers leave the trust boundary.
//!
//! # Responsibilities
//! - Drop credential-bearing headers (cookie, authorization, configured extras)
//! - Flatten multi-valued headers to their first value
//!
//! # Design Decisions
//! - Denied headers are omitted entirely, never masked
//! - Matching is case-insensitive; output keys are lowercase
//! - Output is a sorted map so serialization is deterministic

use std::collections::{BTreeMap, HashSet};

use axum::http::HeaderMap;

/// Headers that are always removed, regardless of configuration.
pub const ALWAYS_DENIED: [&str; 2] = ["cookie", "authorization"];

/// Removes sensitive headers from an inbound header map.
#[derive(Debug, Clone)]
pub struct HeaderScrubber {
    deny: HashSet<String>,
}

impl HeaderScrubber {
    /// Build a scrubber denying the mandatory headers plus `extra`.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let deny = ALWAYS_DENIED
            .iter()
            .map(|h| h.to_string())
            .chain(extra.into_iter().map(|h| h.as_ref().trim().to_ascii_lowercase()))
            .collect();
        Self { deny }
    }

    pub fn is_denied(&self, name: &str) -> bool {
        self.deny.contains(&name.to_ascii_lowercase())
    }

    /// Produce the forwarded header map: first value per retained header.
    pub fn scrub(&self, headers: &HeaderMap) -> BTreeMap<String, String> {
        headers
            .keys()
            .filter(|name| !self.is_denied(name.as_str()))
            .filter_map(|name| {
                headers.get(name).map(|value| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
            })
            .collect()
    }
}

impl Default for HeaderScrubber {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}
