//! Contact resolver - maps attendee tokens to e-mail addresses
//!
//! Each contact is scored against a token with an ordered rule cascade (the
//! highest-priority matching rule wins). A token resolves automatically only
//! when the best candidate is both confident and clearly ahead of the
//! runner-up; otherwise every candidate above the floor is returned so the
//! user can choose.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use showup_common::EmailValidator;
use showup_domain::constants::{
    AUTO_ACCEPT_MARGIN, AUTO_ACCEPT_MIN_CONFIDENCE, CONFIDENCE_EXACT_NAME, CONFIDENCE_FIRST_WORD,
    CONFIDENCE_FLOOR, CONFIDENCE_GIVEN_NAME_PREFIX, CONFIDENCE_NAME_PREFIX, CONFIDENCE_SUBSTRING,
    CONFIDENCE_WORD_OVERLAP_MAX, MIN_CANDIDATE_CONFIDENCE,
};
use showup_domain::{Contact, ContactCandidate, ContactResolution, MatchRule, Result};
use tracing::debug;

use super::ports::ContactRepository;

/// Tolerance for comparing confidences that come from f32 constants.
const CONFIDENCE_EPSILON: f32 = 1e-4;

/// Resolves attendee tokens against an account's address book
pub struct ContactResolver {
    contacts: Arc<dyn ContactRepository>,
}

impl ContactResolver {
    pub fn new(contacts: Arc<dyn ContactRepository>) -> Self {
        Self { contacts }
    }

    /// Resolve every token against the account's contacts, preserving order.
    pub async fn resolve(
        &self,
        account_id: &str,
        tokens: &[String],
    ) -> Result<Vec<ContactResolution>> {
        let contacts = self.contacts.list_contacts(account_id).await?;
        debug!(account_id, contacts = contacts.len(), tokens = tokens.len(), "resolving contacts");

        Ok(tokens.iter().map(|token| resolve_token(token, &contacts)).collect())
    }
}

/// Resolve one token against a fixed contact list.
pub fn resolve_token(token: &str, contacts: &[Contact]) -> ContactResolution {
    let search_token = token.trim().to_string();

    if EmailValidator::is_email(&search_token) {
        let name = contacts
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(&search_token))
            .map(|c| c.display_name.clone());
        return ContactResolution::Resolved {
            email: search_token.clone(),
            search_token,
            name,
            confidence: CONFIDENCE_EXACT_NAME,
            rule: MatchRule::EmailLiteral,
        };
    }

    let normalized = normalize(&search_token);
    if normalized.is_empty() {
        return ContactResolution::NoMatch { search_token };
    }

    let candidates = rank_candidates(&normalized, contacts);
    match candidates.as_slice() {
        [] => ContactResolution::NoMatch { search_token },
        [best, rest @ ..] if is_dominant(best, rest.first()) => ContactResolution::Resolved {
            search_token,
            email: best.email.clone(),
            name: Some(best.name.clone()),
            confidence: best.confidence,
            rule: best.rule,
        },
        _ => ContactResolution::Ambiguous { search_token, candidates },
    }
}

/// Score one contact against an already-normalized token.
pub fn score_contact(normalized_token: &str, contact: &Contact) -> (f32, MatchRule) {
    let name = normalize(&contact.display_name);
    let first_word = name.split(' ').next().unwrap_or_default();

    if name == normalized_token {
        return (CONFIDENCE_EXACT_NAME, MatchRule::ExactName);
    }
    if first_word == normalized_token {
        return (CONFIDENCE_FIRST_WORD, MatchRule::FirstWord);
    }
    if name.starts_with(normalized_token) {
        return (CONFIDENCE_NAME_PREFIX, MatchRule::NamePrefix);
    }
    if contact
        .given_name
        .as_deref()
        .map(normalize)
        .is_some_and(|given| !given.is_empty() && given.starts_with(normalized_token))
    {
        return (CONFIDENCE_GIVEN_NAME_PREFIX, MatchRule::GivenNamePrefix);
    }
    if name.contains(normalized_token) {
        return (CONFIDENCE_SUBSTRING, MatchRule::Substring);
    }

    let token_words: Vec<&str> = normalized_token.split(' ').collect();
    let name_words: Vec<&str> = name.split(' ').collect();
    let matched = token_words.iter().filter(|word| name_words.contains(word)).count();
    if matched > 0 {
        #[allow(clippy::cast_precision_loss)]
        let fraction = matched as f32 / token_words.len() as f32;
        return (CONFIDENCE_WORD_OVERLAP_MAX * fraction, MatchRule::WordOverlap);
    }

    (CONFIDENCE_FLOOR, MatchRule::Fallback)
}

/// Candidates above the floor, one per e-mail, in deterministic order.
fn rank_candidates(normalized_token: &str, contacts: &[Contact]) -> Vec<ContactCandidate> {
    let mut by_email: HashMap<String, ContactCandidate> = HashMap::new();

    for contact in contacts {
        let (confidence, rule) = score_contact(normalized_token, contact);
        if confidence < MIN_CANDIDATE_CONFIDENCE {
            continue;
        }
        let candidate = ContactCandidate {
            name: contact.display_name.clone(),
            email: contact.email.clone(),
            confidence,
            rule,
        };
        let key = contact.email.to_lowercase();
        match by_email.get(&key) {
            Some(existing) if compare_candidates(existing, &candidate) != Ordering::Greater => {}
            _ => {
                by_email.insert(key, candidate);
            }
        }
    }

    let mut candidates: Vec<ContactCandidate> = by_email.into_values().collect();
    candidates.sort_by(compare_candidates);
    candidates
}

/// Confidence descending, then name, then e-mail.
fn compare_candidates(a: &ContactCandidate, b: &ContactCandidate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.email.cmp(&b.email))
}

fn is_dominant(best: &ContactCandidate, runner_up: Option<&ContactCandidate>) -> bool {
    if best.confidence + CONFIDENCE_EPSILON < AUTO_ACCEPT_MIN_CONFIDENCE {
        return false;
    }
    runner_up.map_or(true, |next| {
        best.confidence - next.confidence + CONFIDENCE_EPSILON >= AUTO_ACCEPT_MARGIN
    })
}

/// Lowercase and collapse internal whitespace.
fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, given: Option<&str>, email: &str) -> Contact {
        Contact {
            account_id: "org@example.com".to_string(),
            display_name: name.to_string(),
            given_name: given.map(str::to_string),
            email: email.to_string(),
        }
    }

    fn book() -> Vec<Contact> {
        vec![
            contact("Tom Jones", Some("Tom"), "tom.jones@example.com"),
            contact("Tom Smith", Some("Tom"), "tom.smith@example.com"),
            contact("Alice Walker", Some("Alice"), "alice@example.com"),
            contact("Dr. Maria Lopez", Some("Maria"), "maria@example.com"),
        ]
    }

    #[test]
    fn test_cascade_scores() {
        let jones = contact("Tom Jones", Some("Tom"), "tom.jones@example.com");
        assert_eq!(score_contact("tom jones", &jones), (1.0, MatchRule::ExactName));
        assert_eq!(score_contact("tom", &jones), (0.95, MatchRule::FirstWord));
        assert_eq!(score_contact("tom j", &jones), (0.8, MatchRule::NamePrefix));
        assert_eq!(score_contact("jones", &jones), (0.6, MatchRule::Substring));
        assert_eq!(score_contact("xyz", &jones), (0.1, MatchRule::Fallback));

        let maria = contact("Dr. Maria Lopez", Some("Maria"), "maria@example.com");
        assert_eq!(score_contact("mar", &maria), (0.75, MatchRule::GivenNamePrefix));
    }

    #[test]
    fn test_word_overlap_is_scaled_and_capped() {
        let jones = contact("Tom Jones", Some("Tom"), "tom.jones@example.com");
        let (score, rule) = score_contact("jones family", &jones);
        assert_eq!(rule, MatchRule::WordOverlap);
        assert!((score - 0.25).abs() < f32::EPSILON);
        assert!(score < CONFIDENCE_SUBSTRING);
    }

    #[test]
    fn test_two_toms_are_ambiguous() {
        let contacts = vec![
            contact("Tom Jones", None, "tom.jones@example.com"),
            contact("Tom Smith", None, "tom.smith@example.com"),
        ];

        match resolve_token("Tom", &contacts) {
            ContactResolution::Ambiguous { search_token, candidates } => {
                assert_eq!(search_token, "Tom");
                let emails: Vec<&str> = candidates.iter().map(|c| c.email.as_str()).collect();
                assert_eq!(emails, vec!["tom.jones@example.com", "tom.smith@example.com"]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_dominant_match_resolves() {
        let resolution = resolve_token("alice walker", &book());
        assert_eq!(resolution.resolved_email(), Some("alice@example.com"));
        assert!(matches!(
            resolution,
            ContactResolution::Resolved { rule: MatchRule::ExactName, .. }
        ));

        let contacts = vec![
            contact("Tom Jones", None, "tom.jones@example.com"),
            contact("Tommy Lee", None, "tommy@example.com"),
        ];
        assert_eq!(resolve_token("tom", &contacts).resolved_email(), Some("tom.jones@example.com"));
    }

    #[test]
    fn test_weak_single_candidate_is_not_auto_accepted() {
        let contacts = vec![contact("Tom Jones", None, "tom.jones@example.com")];
        let resolution = resolve_token("jones family", &contacts);
        assert!(matches!(resolution, ContactResolution::NoMatch { .. }));

        let resolution = resolve_token("jones tom", &contacts);
        match resolution {
            ContactResolution::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 1),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_email_passes_through() {
        let resolution = resolve_token(" Tom.Jones@example.com ", &book());
        match resolution {
            ContactResolution::Resolved { email, name, confidence, rule, .. } => {
                assert_eq!(email, "Tom.Jones@example.com");
                assert_eq!(rule, MatchRule::EmailLiteral);
                assert_eq!(name.as_deref(), Some("Tom Jones"));
                assert!((confidence - 1.0).abs() < f32::EPSILON);
            }
            other => panic!("expected resolved, got {other:?}"),
        }
        assert!(resolve_token("new.person@example.org", &[]).resolved_email().is_some());
    }

    #[test]
    fn test_no_contacts_or_no_relation_is_no_match() {
        assert!(matches!(resolve_token("Tom", &[]), ContactResolution::NoMatch { .. }));
        assert!(matches!(resolve_token("Zed", &book()), ContactResolution::NoMatch { .. }));
        assert!(matches!(resolve_token("   ", &book()), ContactResolution::NoMatch { .. }));
    }

    #[test]
    fn test_duplicate_emails_collapse_to_best_score() {
        let contacts = vec![
            contact("Tom Jones", None, "tom@example.com"),
            contact("Tom Jones Sr.", None, "TOM@example.com"),
        ];
        let resolution = resolve_token("tom jones", &contacts);
        assert_eq!(resolution.resolved_email(), Some("tom@example.com"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut reversed = book();
        reversed.reverse();
        assert_eq!(resolve_token("tom", &book()), resolve_token("tom", &reversed));
    }
}
