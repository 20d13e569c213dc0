//! Conditional visibility for rendered HTML forms.
//!
//! A [`Page`] parses a form fragment, binds a [`FormVisibilityController`]
//! to its radio groups and checkboxes, and keeps three rules in force:
//! yes/no radio panes, "other, please specify" panes, and select-all
//! checkboxes that stay consistent with their members.

use std::error::Error as StdError;
use std::fmt;

mod config;
mod controller;
mod dom;
mod html;
mod ids;
mod page;
mod pattern;
mod selector;

pub use config::{ControllerConfig, LinkedPane, ToggleLabel};
pub use controller::{FormVisibilityController, RadioAnswer, RuleOutcome};
pub use dom::{Dom, NodeId};
pub use ids::{OtherPaneId, RadioGroupIds, escape_selector_ident};
pub use page::Page;
pub use pattern::{Regex, RegexError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    InvalidConfig(String),
    MissingCounterpart {
        id: String,
        referenced_by: String,
    },
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::InvalidConfig(msg) => write!(f, "invalid controller config: {msg}"),
            Self::MissingCounterpart { id, referenced_by } => {
                write!(f, "missing element #{id} referenced by {referenced_by}")
            }
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_missing_counterpart() {
        let err = Error::MissingCounterpart {
            id: "other-pets".into(),
            referenced_by: "other checkbox #pets_99".into(),
        };
        assert_eq!(
            err.to_string(),
            "missing element #other-pets referenced by other checkbox #pets_99"
        );
    }

    #[test]
    fn truncate_chars_marks_cut_output() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }
}
