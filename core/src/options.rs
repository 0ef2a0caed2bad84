//! Per-call request options.
//!
//! A `RequestOption` is a small value that mutates the outgoing request's
//! `RequestConfig` (headers, query, context). Options are applied in the
//! order the caller supplied them:
//!
//! - headers accumulate, so two `Header` options with the same name send
//!   both values;
//! - query parameters and context values are last-write-wins per key.
//!
//! Every operation's option struct implements `WithRequestOptions`, so raw
//! request options and field setters chain on the same builder:
//!
//! ```
//! use pipedrive_core::resources::notes::CreateNoteOptions;
//! use pipedrive_core::{RequestOption, WithRequestOptions};
//!
//! let opts = CreateNoteOptions::new()
//!     .content("Called back")
//!     .deal_id(42)
//!     .with(RequestOption::header("x-request-id", "abc"));
//! ```

use std::collections::BTreeMap;

/// One mutation of the outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOption {
    Header(String, String),
    Query(String, String),
    Context(String, String),
}

impl RequestOption {
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Header(name.into(), value.into())
    }

    pub fn query(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Query(name.into(), value.into())
    }

    pub fn context(key: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Context(key.into(), value.into())
    }

    fn apply(&self, config: &mut RequestConfig) {
        match self {
            RequestOption::Header(name, value) => {
                config.headers.push((name.clone(), value.clone()));
            }
            RequestOption::Query(name, value) => config.set_query(name, value.clone()),
            RequestOption::Context(key, value) => {
                config.context.insert(key.clone(), value.clone());
            }
        }
    }
}

/// The mutable request state options are folded into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub context: BTreeMap<String, String>,
}

impl RequestConfig {
    /// Replace every existing value for `name`, keeping its original position.
    pub fn set_query(&mut self, name: &str, value: String) {
        match self.query.iter().position(|(key, _)| key == name) {
            Some(index) => {
                self.query[index].1 = value;
                let mut seen = false;
                self.query.retain(|(key, _)| {
                    if key != name {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.query.push((name.to_string(), value)),
        }
    }
}

/// An ordered list of request options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions(Vec<RequestOption>);

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option. `None` is a no-op.
    pub fn push(&mut self, option: impl Into<Option<RequestOption>>) {
        if let Some(option) = option.into() {
            self.0.push(option);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fold every option into `config`, in insertion order.
    pub fn apply(&self, config: &mut RequestConfig) {
        for option in &self.0 {
            option.apply(config);
        }
    }
}

impl FromIterator<RequestOption> for RequestOptions {
    fn from_iter<I: IntoIterator<Item = RequestOption>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Option<RequestOption>> for RequestOptions {
    fn extend<I: IntoIterator<Item = Option<RequestOption>>>(&mut self, iter: I) {
        for option in iter {
            self.push(option);
        }
    }
}

/// Lets an operation's option struct carry raw request options alongside
/// its field setters.
pub trait WithRequestOptions: Sized {
    fn request_options(&self) -> &RequestOptions;

    fn request_options_mut(&mut self) -> &mut RequestOptions;

    /// Attach a request option. `None` is ignored.
    fn with(mut self, option: impl Into<Option<RequestOption>>) -> Self {
        self.request_options_mut().push(option);
        self
    }

    /// Attach several request options at once, in order.
    fn with_all<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = Option<RequestOption>>,
    {
        self.request_options_mut().extend(options);
        self
    }
}

impl WithRequestOptions for RequestOptions {
    fn request_options(&self) -> &RequestOptions {
        self
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        self
    }
}
