//! crates/lovecraft_core/src/matching.rs
//!
//! Lenient comparison used to check what a recipient types against what the
//! author stored.

/// Case-folded, bidirectional substring containment.
///
/// Accepts when either side contains the other, so partial or overlong typing
/// still matches ("eve" and "Steve" both match "Eve"). An empty input never
/// matches a non-empty expected value.
pub fn fuzzy_match(input: &str, expected: &str) -> bool {
    let typed = input.trim().to_lowercase();
    let stored = expected.trim().to_lowercase();
    if typed.is_empty() {
        return stored.is_empty();
    }
    typed.contains(&stored) || stored.contains(&typed)
}

/// Quiz acceptance: anything goes when the author left the answer blank.
pub fn answer_matches(input: &str, expected: Option<&str>) -> bool {
    match expected.map(str::trim) {
        None | Some("") => true,
        Some(answer) => fuzzy_match(input, answer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_matches_in_both_directions() {
        assert!(fuzzy_match("eve", "Eve"));
        assert!(fuzzy_match("Steve", "Eve"));
        assert!(fuzzy_match("Ev", "Eve"));
        assert!(!fuzzy_match("Bob", "Eve"));
    }

    #[test]
    fn folding_is_unicode_aware() {
        assert!(fuzzy_match("ÉLODIE", "élodie"));
        assert!(fuzzy_match("  chloé ", "Chloé"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(!fuzzy_match("", "Eve"));
        assert!(!fuzzy_match("   ", "Eve"));
    }

    #[test]
    fn blank_answer_accepts_anything() {
        assert!(answer_matches("whatever", None));
        assert!(answer_matches("", Some("")));
        assert!(answer_matches("x", Some("  ")));
    }

    #[test]
    fn answer_uses_the_same_containment() {
        assert!(answer_matches("max", Some("Max")));
        assert!(answer_matches("maxime", Some("Max")));
        assert!(!answer_matches("", Some("Max")));
        assert!(!answer_matches("Leo", Some("Max")));
    }
}
