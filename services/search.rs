/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Inclusion-only fuzzy matching for catalog search.
//!
//! There is no scoring: a candidate either matches or it does not, and
//! callers keep their own ordering. Three strategies are tried from strictest
//! to loosest and the first hit wins:
//!
//! 1. case-insensitive substring,
//! 2. prefix of any word (words split on whitespace, `-`, `(` and `)`),
//! 3. in-order subsequence where consecutive hits are at most
//!    [`SUBSEQUENCE_GAP_LIMIT`] characters apart.

/// Maximum distance between two consumed characters in the subsequence pass.
pub const SUBSEQUENCE_GAP_LIMIT: usize = 3;

pub fn matches(query: &str, text: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let query = query.to_lowercase();
    let text = text.to_lowercase();

    text.contains(&query)
        || matches_word_prefix(&query, &text)
        || matches_gapped_subsequence(&query, &text)
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '(' | ')')
}

fn matches_word_prefix(query: &str, text: &str) -> bool {
    text.split(is_word_separator)
        .filter(|word| !word.is_empty())
        .any(|word| word.starts_with(query))
}

/// A gap overrun restarts the query from its first character but does not
/// re-test the overrunning text character against it; scanning simply moves
/// on. `matches("aa", "axxxxaxa")` is therefore `false`.
fn matches_gapped_subsequence(query: &str, text: &str) -> bool {
    let query: Vec<char> = query.chars().collect();
    let mut query_index = 0;
    let mut last_hit: Option<usize> = None;

    for (position, c) in text.chars().enumerate() {
        if query_index == query.len() {
            break;
        }
        if c != query[query_index] {
            continue;
        }
        match last_hit {
            Some(last) if position - last > SUBSEQUENCE_GAP_LIMIT => {
                query_index = 0;
                last_hit = None;
            }
            _ => {
                query_index += 1;
                last_hit = Some(position);
            }
        }
    }

    query_index == query.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("usw", "us-west-1 US West (Oregon)")]
    #[case("fra", "eu-central-1 Europe (Frankfurt)")]
    #[case("FRANK", "eu-central-1 Europe (Frankfurt)")]
    #[case("", "us-east-1 US East (N. Virginia)")]
    #[case("ore", "us-west-2 US West (Oregon)")]
    #[case("virg", "us-east-1 US East (N. Virginia)")]
    #[case("ap-so", "ap-south-1 Asia Pacific (Mumbai)")]
    fn matching_candidates(#[case] query: &str, #[case] text: &str) {
        assert!(matches(query, text), "{query:?} should match {text:?}");
    }

    #[rstest]
    #[case("xyz123notfound", "us-east-1 US East (N. Virginia)")]
    #[case("tokyo", "eu-west-1 Europe (Ireland)")]
    #[case("zz", "us-east-1 US East (N. Virginia)")]
    fn rejected_candidates(#[case] query: &str, #[case] text: &str) {
        assert!(!matches(query, text), "{query:?} should not match {text:?}");
    }

    #[test]
    fn word_prefix_splits_on_hyphen_and_parentheses() {
        assert!(matches_word_prefix("oreg", "us-west-2 us west (oregon)"));
        assert!(matches_word_prefix("2", "us-west-2 us west (oregon)"));
        assert!(!matches_word_prefix("west-2", "us-west-2 us west (oregon)"));
    }

    #[test]
    fn subsequence_respects_gap_limit() {
        // u(0) s(1) w(3)
        assert!(matches_gapped_subsequence("usw", "us-west-1"));
        // a(0) then b four positions later
        assert!(!matches_gapped_subsequence("ab", "a123b"));
        // exactly at the limit
        assert!(matches_gapped_subsequence("ab", "a12b"));
    }

    #[test]
    fn subsequence_recovers_after_gap_overrun() {
        // The first `a`/`b` pair is too far apart; the pass restarts and
        // succeeds on the later run.
        assert!(matches_gapped_subsequence("abc", "axxxxbyc abzc"));
        assert!(matches("abc", "axxxxbyc abzc"));
    }

    #[test]
    fn gap_overrun_does_not_retest_the_overrunning_character() {
        // The second `a` overruns the gap and resets the query without being
        // reconsidered as a fresh first hit, so only the third `a` is
        // consumed and the match fails.
        assert!(!matches_gapped_subsequence("aa", "axxxxaxa"));
        assert!(!matches("aa", "axxxxaxa"));
    }

    proptest! {
        #[test]
        fn empty_query_matches_everything(text in ".*") {
            prop_assert!(matches("", &text));
        }

        #[test]
        fn every_substring_matches(
            text in "[a-z ()-]{1,24}",
            start in 0usize..24,
            len in 1usize..8,
        ) {
            let chars: Vec<char> = text.chars().collect();
            let start = start.min(chars.len() - 1);
            let end = (start + len).min(chars.len());
            let query: String = chars[start..end].iter().collect();
            prop_assert!(matches(&query, &text));
        }

        #[test]
        fn matching_ignores_case(text in "[a-zA-Z ]{1,24}", query in "[a-zA-Z]{1,4}") {
            prop_assert_eq!(
                matches(&query, &text),
                matches(&query.to_uppercase(), &text.to_lowercase())
            );
        }
    }
}
