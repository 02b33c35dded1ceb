//! English-locale string ordering for plan identifiers.
//!
//! Uses CLDR collation for `en`: punctuation sorts before digits and digits
//! before letters, accents break ties after the base letters, and case breaks
//! ties last with lowercase first.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;

fn english() -> Option<Collator> {
    Collator::try_new(&locale!("en").into(), CollatorOptions::new())
        .map_err(|e| tracing::warn!(error = ?e, "English collation unavailable"))
        .ok()
}

/// Compare two strings in English-locale order
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    english().map_or_else(|| a.cmp(b), |collator| collator.compare(a, b))
}

/// Sort `items` by `key` in English-locale order, building the collator once.
pub fn sort_by_locale<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    match english() {
        Some(collator) => items.sort_by(|a, b| collator.compare(key(a), key(b))),
        None => items.sort_by(|a, b| key(a).cmp(key(b))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(ids: &[&str]) -> Vec<String> {
        let mut ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        sort_by_locale(&mut ids, String::as_str);
        ids
    }

    #[test]
    fn test_lexical_order() {
        assert_eq!(sorted(&["pro", "basic"]), vec!["basic", "pro"]);
        assert_eq!(
            sorted(&["plan:pro@0", "plan:free@0", "plan:team@1"]),
            vec!["plan:free@0", "plan:pro@0", "plan:team@1"]
        );
    }

    #[test]
    fn test_case_breaks_ties_last() {
        assert_eq!(sorted(&["Pro", "basic"]), vec!["basic", "Pro"]);
        assert_eq!(sorted(&["Basic", "basic"]), vec!["basic", "Basic"]);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_punctuation_before_digits_before_letters() {
        assert_eq!(
            sorted(&["plan:pro2@0", "plan:pro@1"]),
            vec!["plan:pro@1", "plan:pro2@0"]
        );
        assert_eq!(locale_cmp("a-1", "a1"), Ordering::Less);
        assert_eq!(locale_cmp("a1", "ab"), Ordering::Less);
    }

    #[test]
    fn test_accents_sort_with_their_base_letter() {
        assert_eq!(
            sorted(&["plan:f@0", "plan:é@0", "plan:e@0"]),
            vec!["plan:e@0", "plan:é@0", "plan:f@0"]
        );
    }
}
