//! # Textmill Normalize
//!
//! Boilerplate scrubbing for text rendered out of web pages and HTML
//! documents.
//!
//! A fixed, ordered table of cleanup rules strips the noise that survives
//! HTML-to-text rendering: phone numbers, email addresses, underscore rules,
//! bare links, footnote markers, copyright and "all rights reserved" lines,
//! literal dates, bullet lines, social "follow us" lines, repeated spaces and
//! blank-line runs. The result is trimmed, and normalizing it again changes
//! nothing.
//!
//! ## Example
//!
//! ```rust
//! use textmill_normalize::normalize;
//!
//! let cleaned = normalize("Read more at https://example.com/a\n\n\n\nThanks");
//! assert_eq!(cleaned, "Read more at \nThanks");
//! ```
//!
//! The rule table is compiled once and shared read-only, so [`normalize`] is
//! safe to call from any number of threads. It never panics: if the table
//! cannot be built the input comes back unchanged.

pub mod rules;

use once_cell::sync::Lazy;
use tracing::warn;

pub use rules::{Rule, RuleKind};

static RULES: Lazy<Option<Vec<Rule>>> = Lazy::new(|| match rules::compile() {
    Ok(rules) => Some(rules),
    Err(err) => {
        warn!(error = %err, "normalizer rule table failed to compile");
        None
    }
});

/// Run every cleanup rule over `text`, in order, then trim.
///
/// Removing one match can expose another (a stripped link leaving a bullet
/// line behind), so the table is reapplied until the text stops changing.
/// Every rule only shortens the text, which bounds the loop.
pub fn normalize(text: &str) -> String {
    let Some(rules) = RULES.as_ref() else {
        return text.to_string();
    };

    let mut current = apply_all(rules, text);
    loop {
        let next = apply_all(rules, &current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn apply_all(rules: &[Rule], text: &str) -> String {
    let mut current = text.to_string();
    for rule in rules {
        current = rule.apply(&current);
    }
    current.trim().to_string()
}

/// The rule kinds applied by [`normalize`], in application order
pub fn rule_order() -> Vec<RuleKind> {
    rules::order().collect()
}
