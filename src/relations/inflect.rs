//! Naive English pluralization used by the relationship heuristic.
//!
//! These are deterministic string transforms, not a dictionary-backed
//! inflector; irregular nouns do not round-trip.

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

fn ends_with_sibilant(word: &str) -> bool {
    word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
}

/// `user` → `users`, `box` → `boxes`, `city` → `cities`.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if ends_with_sibilant(word) {
        return format!("{word}es");
    }
    if word.ends_with('y') {
        // A `y` after a consonant (or after nothing) takes `ies`.
        let before = word.chars().rev().nth(1);
        if !before.is_some_and(|c| VOWELS.contains(&c)) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{word}s")
}

/// `users` → `user`, `boxes` → `box`, `cities` → `city`. Words not ending in
/// `s` (and `ss` endings) are returned unchanged.
#[must_use]
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("es") {
        return stem.to_string();
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}
