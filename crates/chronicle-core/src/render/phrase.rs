//! Identifier-to-phrase splitting for prose output
//!
//! Splits `camelCase`, `PascalCase`, and `snake_case` identifiers into
//! lowercase words. Hand-rolled: the lookaround pattern the split needs is
//! not expressible in the `regex` crate.

pub(crate) fn split_words(ident: &str) -> Vec<String> {
    let mut words = Vec::new();
    for segment in ident.split('_').filter(|s| !s.is_empty()) {
        let mut word = String::new();
        let mut prev_lower = false;
        for c in segment.chars() {
            if c.is_uppercase() && prev_lower && !word.is_empty() {
                words.push(word.to_lowercase());
                word = String::new();
            }
            prev_lower = c.is_lowercase();
            word.push(c);
        }
        if !word.is_empty() {
            words.push(word.to_lowercase());
        }
    }
    words
}

pub(crate) fn to_phrase(ident: &str) -> String {
    split_words(ident).join(" ")
}
