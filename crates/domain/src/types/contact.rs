//! Address-book contacts and resolution results

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// One address-book entry owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub account_id: String,
    pub display_name: String,
    pub given_name: Option<String>,
    pub email: String,
}

/// Rule of the scoring cascade that produced a confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    EmailLiteral,
    ExactName,
    FirstWord,
    NamePrefix,
    GivenNamePrefix,
    Substring,
    WordOverlap,
    Fallback,
}

impl_domain_status_conversions!(MatchRule {
    EmailLiteral => "email_literal",
    ExactName => "exact_name",
    FirstWord => "first_word",
    NamePrefix => "name_prefix",
    GivenNamePrefix => "given_name_prefix",
    Substring => "substring",
    WordOverlap => "word_overlap",
    Fallback => "fallback",
});

/// A scored contact offered for a search token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCandidate {
    pub name: String,
    pub email: String,
    pub confidence: f32,
    pub rule: MatchRule,
}

/// Outcome of resolving one free-text attendee token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ContactResolution {
    Resolved {
        search_token: String,
        email: String,
        name: Option<String>,
        confidence: f32,
        rule: MatchRule,
    },
    /// Too close to call; the caller must pick one.
    Ambiguous {
        search_token: String,
        candidates: Vec<ContactCandidate>,
    },
    NoMatch {
        search_token: String,
    },
}

impl ContactResolution {
    pub fn search_token(&self) -> &str {
        match self {
            Self::Resolved { search_token, .. }
            | Self::Ambiguous { search_token, .. }
            | Self::NoMatch { search_token } => search_token,
        }
    }

    pub fn resolved_email(&self) -> Option<&str> {
        match self {
            Self::Resolved { email, .. } => Some(email),
            _ => None,
        }
    }
}
