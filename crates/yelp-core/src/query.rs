//! Convenience builder for HTTP query strings.
//!
//! This module provides a lightweight helper for assembling a raw query
//! string from optional values, reducing boilerplate in client crates. Values
//! are rendered in insertion order using `application/x-www-form-urlencoded`
//! escaping (space becomes `+`), matching what the Fusion API expects.

use std::fmt::Display;
use url::form_urlencoded;

/// Percent-encode a single query value.
///
/// Uses the `application/x-www-form-urlencoded` byte serializer, so spaces
/// become `+` and reserved characters such as `,` and the leading `+` of an
/// international phone number are percent-escaped.
#[must_use]
pub fn escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Builder for assembling an ordered query string.
#[derive(Debug, Default, Clone)]
pub struct QueryString {
    pairs: Vec<(&'static str, String)>,
}

impl QueryString {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: ToString,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append using a mapping function when the value is present.
    pub fn push_opt_with<T, F>(&mut self, key: &'static str, value: Option<T>, mut map: F)
    where
        F: FnMut(T) -> String,
    {
        if let Some(value) = value {
            self.pairs.push((key, map(value)));
        }
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Render the collected pairs as a raw query string.
    ///
    /// Values are escaped; keys are emitted verbatim. The result carries no
    /// leading `?` so callers can splice it onto an endpoint themselves.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.pairs {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&escape(value));
        }
        out
    }
}
