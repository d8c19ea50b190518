// src/checker/ignore.rs
// =============================================================================
// Decides whether a URL falls under one of the configured exceptions.
//
// Two kinds of exceptions exist:
// - prefix ignores: the URL is never contacted at all
// - exact ignores: the URL is still contacted, but a different set of
//   status codes (or a failed TLS handshake) counts as success
//
// Prefix ignores are checked first and in the order they were declared.
// =============================================================================

use crate::config::{Ignore, PrefixIgnore};
use std::collections::HashMap;

/// Which exception, if any, applies to a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreMatch<'a> {
    /// No exception: the URL must answer with 2xx
    None,
    /// Skip the URL entirely
    Prefix(&'a PrefixIgnore),
    /// Check the URL with the exception's success criterion
    Exact(&'a Ignore),
}

impl<'a> IgnoreMatch<'a> {
    pub fn exact(self) -> Option<&'a Ignore> {
        match self {
            IgnoreMatch::Exact(ignore) => Some(ignore),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    exact: HashMap<String, Ignore>,
    prefixes: Vec<PrefixIgnore>,
}

impl IgnoreRules {
    // A later exact ignore for the same URL replaces an earlier one
    pub fn new(ignores: Vec<Ignore>, prefixes: Vec<PrefixIgnore>) -> Self {
        let exact = ignores
            .into_iter()
            .map(|ignore| (ignore.url.clone(), ignore))
            .collect();
        Self { exact, prefixes }
    }

    // `url` must already have its :title suffix stripped
    pub fn classify(&self, url: &str) -> IgnoreMatch<'_> {
        if let Some(prefix) = self.prefixes.iter().find(|p| url.starts_with(&p.prefix)) {
            return IgnoreMatch::Prefix(prefix);
        }
        match self.exact.get(url) {
            Some(ignore) => IgnoreMatch::Exact(ignore),
            None => IgnoreMatch::None,
        }
    }
}
