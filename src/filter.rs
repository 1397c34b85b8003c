//! Search and category filtering over the catalog.

use crate::catalog::{Catalog, Category, Emoji};

/// Returns the catalog entries matching `query` and `categories`, in catalog
/// order.
///
/// A non-empty query must appear (case-insensitively) in the name or in one of
/// the keywords. A non-empty category set restricts results to those
/// categories. Empty inputs disable their predicate.
pub fn filter(catalog: &Catalog, query: &str, categories: &[Category]) -> Vec<&'static Emoji> {
    let needle = query.to_lowercase();

    catalog
        .all()
        .iter()
        .filter(|emoji| needle.is_empty() || matches_query(emoji, &needle))
        .filter(|emoji| categories.is_empty() || categories.contains(&emoji.category))
        .collect()
}

/// `needle` must already be lowercase.
fn matches_query(emoji: &Emoji, needle: &str) -> bool {
    emoji.name.to_lowercase().contains(needle)
        || emoji
            .keywords
            .iter()
            .any(|keyword| keyword.to_lowercase().contains(needle))
}

/// Adds `category` if absent, removes it if present.
pub fn toggle_category(categories: &mut Vec<Category>, category: Category) {
    if let Some(pos) = categories.iter().position(|c| *c == category) {
        categories.remove(pos);
    } else {
        categories.push(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn names(emojis: &[&Emoji]) -> Vec<&'static str> {
        emojis.iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_empty_inputs_return_everything() {
        let catalog = Catalog::builtin();
        assert_eq!(filter(&catalog, "", &[]).len(), catalog.len());
    }

    #[test]
    fn test_query_matches_keywords_case_insensitively() {
        let catalog = Catalog::builtin();
        let found = filter(&catalog, "ROFL", &[]);
        assert_eq!(names(&found), vec!["Rolling on the Floor Laughing"]);
    }

    #[test]
    fn test_query_and_category_are_anded() {
        let catalog = Catalog::builtin();
        let found = filter(&catalog, "bear", &[Category::Animals]);
        assert_eq!(names(&found), vec!["Bear", "Panda", "Koala"]);

        let none = filter(&catalog, "bear", &[Category::Food]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_category_only() {
        let catalog = Catalog::builtin();
        let found = filter(&catalog, "", &[Category::Gestures, Category::Symbols]);
        assert!(found
            .iter()
            .all(|e| matches!(e.category, Category::Gestures | Category::Symbols)));
        assert_eq!(found.len(), 18);
    }

    #[test]
    fn test_multi_word_keywords() {
        let catalog = Catalog::builtin();
        let found = filter(&catalog, "mind blown", &[]);
        assert_eq!(names(&found), vec!["Exploding Head"]);
    }

    #[test]
    fn test_toggle_category() {
        let mut selected = vec![];
        toggle_category(&mut selected, Category::Food);
        toggle_category(&mut selected, Category::Travel);
        assert_eq!(selected, vec![Category::Food, Category::Travel]);
        toggle_category(&mut selected, Category::Food);
        assert_eq!(selected, vec![Category::Travel]);
    }

    fn category_strategy() -> impl Strategy<Value = Vec<Category>> {
        proptest::sample::subsequence(Category::ALL.to_vec(), 0..=Category::ALL.len())
    }

    proptest! {
        #[test]
        fn prop_results_are_an_ordered_subset(query in "[a-zA-Z ]{0,6}", categories in category_strategy()) {
            let catalog = Catalog::builtin();
            let found = filter(&catalog, &query, &categories);

            let mut cursor = catalog.all().iter();
            for emoji in &found {
                prop_assert!(cursor.any(|candidate| candidate.codepoint == emoji.codepoint));
            }

            let needle = query.to_lowercase();
            for emoji in &found {
                if !needle.is_empty() {
                    prop_assert!(matches_query(emoji, &needle));
                }
                if !categories.is_empty() {
                    prop_assert!(categories.contains(&emoji.category));
                }
            }
        }

        #[test]
        fn prop_filter_is_deterministic(query in "[a-z]{0,4}") {
            let catalog = Catalog::builtin();
            prop_assert_eq!(filter(&catalog, &query, &[]), filter(&catalog, &query, &[]));
        }
    }
}
