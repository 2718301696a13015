//! Cache key generation

use crate::client::Strategy;

/// Build the cache key for one audit: `strategy|locale|target`.
///
/// An absent locale and an empty locale share a key.
pub fn cache_key(strategy: Strategy, locale: Option<&str>, target: &str) -> String {
    format!("{}|{}|{}", strategy, locale.unwrap_or(""), target)
}
