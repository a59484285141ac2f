//! Ordered categorization rules
//!
//! A rule is a set of matchers (any one suffices) paired with the
//! categorization it yields. Rules are evaluated top to bottom and the first
//! match wins; when nothing matches the result is [`Categorization::unknown`].
//! Matching is case-sensitive and an empty field never matches.

use crate::category::{Categorization, ErrorType, Severity, SuggestedAction};
use crate::failure::Failure;

/// Predicate over a failure's name or message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// `failure.name` equals the value
    NameIs(&'static str),
    /// `failure.message` contains the value
    MessageContains(&'static str),
}

impl Matcher {
    /// Evaluate against a failure
    #[inline]
    #[must_use]
    pub fn matches(&self, failure: &Failure) -> bool {
        match self {
            Matcher::NameIs(name) => !failure.name.is_empty() && failure.name == *name,
            Matcher::MessageContains(needle) => {
                !needle.is_empty() && failure.message.contains(needle)
            }
        }
    }
}

/// One entry of the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Any of these matching selects the rule
    pub matchers: &'static [Matcher],
    /// Categorization produced on match
    pub categorization: Categorization,
}

impl Rule {
    /// Whether any matcher accepts the failure
    #[inline]
    #[must_use]
    pub fn matches(&self, failure: &Failure) -> bool {
        self.matchers.iter().any(|m| m.matches(failure))
    }
}

/// The Deal Wizard rule table, in priority order
pub static STANDARD_RULES: [Rule; 5] = [
    Rule {
        matchers: &[Matcher::NameIs("NetworkError"), Matcher::MessageContains("fetch")],
        categorization: Categorization::new(
            ErrorType::Network,
            Severity::High,
            SuggestedAction::Retry,
        ),
    },
    Rule {
        matchers: &[
            Matcher::NameIs("ValidationError"),
            Matcher::MessageContains("validation"),
        ],
        categorization: Categorization::new(
            ErrorType::Validation,
            Severity::Low,
            SuggestedAction::FixInput,
        ),
    },
    Rule {
        matchers: &[Matcher::NameIs("TypeError"), Matcher::MessageContains("undefined")],
        categorization: Categorization::new(
            ErrorType::Runtime,
            Severity::Medium,
            SuggestedAction::Refresh,
        ),
    },
    Rule {
        matchers: &[Matcher::NameIs("ReferenceError")],
        categorization: Categorization::new(
            ErrorType::Runtime,
            Severity::High,
            SuggestedAction::Refresh,
        ),
    },
    Rule {
        matchers: &[
            Matcher::MessageContains("permission"),
            Matcher::MessageContains("unauthorized"),
        ],
        categorization: Categorization::new(
            ErrorType::Authorization,
            Severity::High,
            SuggestedAction::Login,
        ),
    },
];

/// Rule-table categorizer
#[derive(Debug, Clone, Copy)]
pub struct Categorizer {
    rules: &'static [Rule],
}

impl Categorizer {
    /// Categorizer over a custom rule table
    #[inline]
    #[must_use]
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Categorizer over [`STANDARD_RULES`]
    #[inline]
    #[must_use]
    pub const fn standard() -> Self {
        Self::new(&STANDARD_RULES)
    }

    /// Classify a failure. Total and pure.
    #[must_use]
    pub fn classify(&self, failure: &Failure) -> Categorization {
        self.rules
            .iter()
            .find(|rule| rule.matches(failure))
            .map_or_else(Categorization::unknown, |rule| rule.categorization)
    }

    /// Rules in evaluation order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::standard()
    }
}

/// Classify with the standard rule table
#[inline]
#[must_use]
pub fn classify(failure: &Failure) -> Categorization {
    Categorizer::standard().classify(failure)
}
