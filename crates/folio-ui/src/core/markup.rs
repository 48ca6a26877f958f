//! Caller-supplied HTML and the policy used to render it.
//!
//! Page authors embed markup in data attributes and option objects. The default
//! policy renders it verbatim; sites that surface untrusted content switch to
//! [`MarkupPolicy::Escaped`].

use serde::{Deserialize, Serialize};

/// Rendering policy for caller-supplied markup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupPolicy {
    /// Insert the markup as HTML.
    #[default]
    Trusted,
    /// Escape the markup and insert it as text.
    Escaped,
}

/// HTML fragment supplied by page content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Wrap a raw fragment.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw fragment as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Whether the fragment has no visible content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// HTML suitable for `innerHTML` under the given policy.
    #[must_use]
    pub fn render(&self, policy: MarkupPolicy) -> String {
        match policy {
            MarkupPolicy::Trusted => self.0.clone(),
            MarkupPolicy::Escaped => escape_html(&self.0),
        }
    }
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
