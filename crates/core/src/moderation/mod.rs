//! Request moderation.
//!
//! Two pure predicates evaluated before any download work: an exact
//! match against banned account identifiers, and a case-insensitive
//! whole-word match of banned terms against the request title.

use std::collections::HashSet;

use crate::config::ModerationConfig;

/// Why a request was rejected by policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The requesting account is on the ban list.
    BannedAccount,
    /// The declared title contains a banned term.
    BannedTitle,
}

impl RejectReason {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::BannedAccount => "banned_account",
            RejectReason::BannedTitle => "banned_title",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ban-list filter. Built once from configuration, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModerationFilter {
    banned_accounts: HashSet<String>,
    banned_terms: HashSet<String>,
}

impl ModerationFilter {
    pub fn new(config: &ModerationConfig) -> Self {
        Self {
            banned_accounts: config.banned_accounts.iter().cloned().collect(),
            // Terms are matched against lowercased title tokens.
            banned_terms: config
                .banned_terms
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// True iff the account identifier exactly matches a banned entry.
    pub fn is_account_banned(&self, account_id: &str) -> bool {
        self.banned_accounts.contains(account_id)
    }

    /// True iff any whitespace-separated token of the lowercased title
    /// exactly equals a banned term. Substrings do not match.
    pub fn is_title_banned(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();
        lowered
            .split_whitespace()
            .any(|word| self.banned_terms.contains(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(terms: &[&str], accounts: &[&str]) -> ModerationFilter {
        ModerationFilter::new(&ModerationConfig {
            banned_terms: terms.iter().map(|s| s.to_string()).collect(),
            banned_accounts: accounts.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_banned_account_exact_match() {
        let f = filter(&[], &["account01", "account02"]);
        assert!(f.is_account_banned("account01"));
        assert!(!f.is_account_banned("account03"));
        // No partial matching on identifiers.
        assert!(!f.is_account_banned("account0"));
        assert!(!f.is_account_banned("account011"));
    }

    #[test]
    fn test_banned_title_whole_word_case_insensitive() {
        let f = filter(&["idiot"], &[]);
        assert!(f.is_title_banned("This is an IDIOT video"));
        assert!(f.is_title_banned("idiot"));
        assert!(!f.is_title_banned("idiotic"));
        assert!(!f.is_title_banned("This is fine"));
    }

    #[test]
    fn test_banned_term_configured_in_any_case() {
        let f = filter(&["Idiot"], &[]);
        assert!(f.is_title_banned("an idiot video"));
    }

    #[test]
    fn test_empty_lists_reject_nothing() {
        let f = ModerationFilter::default();
        assert!(!f.is_account_banned("anyone"));
        assert!(!f.is_title_banned("any title at all"));
    }

    #[test]
    fn test_title_tokenized_on_whitespace_only() {
        let f = filter(&["fart"], &[]);
        // Punctuation sticks to the token, so this does not match.
        assert!(!f.is_title_banned("fart, the musical"));
        assert!(f.is_title_banned("fart the musical"));
        assert!(f.is_title_banned("the\tfart\nmusical"));
    }
}
