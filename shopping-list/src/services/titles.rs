//! Title normalization shared by suggestion tracking and ranking

/// Comparison key: trimmed and lower-cased
pub fn normalize_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Upper-case the first letter of every whitespace-separated word and
/// lower-case the rest, preserving the original spacing.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Display form of a title: trimmed and capitalized per word
pub fn display_title(title: &str) -> String {
    capitalize_words(&normalize_key(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  MiLK \n"), "milk");
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("green  apples"), "Green  Apples");
        assert_eq!(capitalize_words("PEANUT BUTTER"), "Peanut Butter");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_display_title_is_case_insensitive() {
        assert_eq!(display_title("milk "), "Milk");
        assert_eq!(display_title("MILK"), "Milk");
        assert_eq!(display_title(" Milk"), "Milk");
        assert_eq!(display_title("éclair"), "Éclair");
    }
}
