//! Debounce heuristics driven by what was typed.

/// Adjusted debounce delay in ms.
///
/// Many new words or a large addition shorten the wait; a few or only
/// short words lengthen it.
pub fn smart_debounce_delay(new_words: &[String], incremental_content: Option<&str>, base_ms: u64) -> u64 {
    let base = base_ms as f64;
    if new_words.len() > 10 {
        return (base * 0.8).max(400.0) as u64;
    }
    if incremental_content.map_or(false, |c| c.chars().count() > 200) {
        return (base * 0.9).max(450.0) as u64;
    }
    if new_words.len() <= 3 {
        return base_ms.saturating_mul(2);
    }
    if new_words.iter().all(|w| w.chars().count() <= 4) {
        return (base * 1.5) as u64;
    }
    base_ms
}

/// At least one alphabetic word of 3+ chars, or at least two words of any kind
pub fn has_significant_content(new_words: &[String]) -> bool {
    let meaningful = new_words
        .iter()
        .filter(|w| w.len() >= 3 && w.bytes().all(|b| b.is_ascii_alphabetic()))
        .count();
    meaningful >= 1 || new_words.len() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_many_words_shorten_delay() {
        let twelve = words(&["alpha"; 12]);
        assert!(smart_debounce_delay(&twelve, None, 500) <= 500);
        assert_eq!(smart_debounce_delay(&twelve, None, 500), 400);
        // Floor kicks in for small bases
        assert_eq!(smart_debounce_delay(&twelve, None, 300), 400);
    }

    #[test]
    fn test_few_short_words_lengthen_delay() {
        let two = words(&["ab", "cd"]);
        let delay = smart_debounce_delay(&two, None, 500);
        assert!(delay as f64 >= 1.5 * 500.0);
        assert_eq!(delay, 1000);
    }

    #[test]
    fn test_large_content_shortens_delay() {
        let content = "x".repeat(201);
        assert_eq!(smart_debounce_delay(&[], Some(&content), 600), 540);
    }

    #[test]
    fn test_short_words_multiplier() {
        let four_short = words(&["john", "ann", "bob", "eve"]);
        assert_eq!(smart_debounce_delay(&four_short, None, 500), 750);
        let mixed = words(&["john", "annabel", "bob", "eve"]);
        assert_eq!(smart_debounce_delay(&mixed, None, 500), 500);
    }

    #[test]
    fn test_significant_content() {
        assert!(has_significant_content(&words(&["john"])));
        assert!(has_significant_content(&words(&["a1", "b2"])));
        assert!(!has_significant_content(&words(&["a1"])));
        assert!(!has_significant_content(&[]));
    }

    #[test]
    fn test_huge_base_saturates() {
        assert_eq!(smart_debounce_delay(&words(&["john"]), None, u64::MAX), u64::MAX);
    }
}
