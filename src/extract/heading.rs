//! Heading-likeness checks shared by title and outline rules.

/// Words that mark a line as a section heading.
pub(crate) const SECTION_WORDS: [&str; 15] = [
    "abstract",
    "introduction",
    "overview",
    "background",
    "summary",
    "conclusion",
    "conclusions",
    "references",
    "bibliography",
    "appendix",
    "acknowledgements",
    "acknowledgments",
    "chapter",
    "section",
    "index",
];

/// Whether a line looks like a heading rather than running text.
///
/// Rejects bare numbers and numeric dates; accepts all-caps lines, title
/// case lines up to 100 characters, numbered lines ("2.1 Scope") and lines
/// containing a section word.
pub fn is_heading_text(text: &str) -> bool {
    let text = text.trim();
    let len = text.chars().count();
    if len < 3 {
        return false;
    }
    if is_numeric_noise(text) {
        return false;
    }
    if is_upper(text) {
        return true;
    }
    if is_title_case(text) && len <= 100 {
        return true;
    }
    if is_numbered(text) {
        return true;
    }
    let lower = text.to_lowercase();
    SECTION_WORDS.iter().any(|word| contains_word(&lower, word))
}

/// Bare numbers ("12") and slash dates ("1/2/2024").
fn is_numeric_noise(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit())
        || (text.split('/').count() == 3
            && text
                .split('/')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())))
}

/// At least one cased character and no lowercase ones.
fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

/// Every word starts uppercase and continues lowercase.
fn is_title_case(text: &str) -> bool {
    let mut cased_seen = false;
    let mut prev_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased_seen = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased_seen = true;
        } else {
            prev_cased = false;
        }
    }
    cased_seen
}

/// Digits and dots, whitespace, then an uppercase letter: "3. Results".
fn is_numbered(text: &str) -> bool {
    let prefix_len = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c.is_whitespace()))
        .unwrap_or(text.len());
    let prefix = &text[..prefix_len];
    prefix.chars().next().is_some_and(|c| c.is_ascii_digit())
        && prefix.ends_with(char::is_whitespace)
        && text[prefix_len..].chars().next().is_some_and(char::is_uppercase)
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_noise() {
        assert!(!is_heading_text("12"));
        assert!(!is_heading_text("2024"));
        assert!(!is_heading_text("01/02/2024"));
        assert!(!is_heading_text("ab"));
        assert!(!is_heading_text("   "));
    }

    #[test]
    fn test_accepts_heading_shapes() {
        assert!(is_heading_text("WORK EXPERIENCE"));
        assert!(is_heading_text("Jane Doe"));
        assert!(is_heading_text("2.1 Scope of work"));
        assert!(is_heading_text("1. Introduction"));
        assert!(is_heading_text("the introduction"));
    }

    #[test]
    fn test_rejects_running_text() {
        assert!(!is_heading_text("Email: jane@example.com"));
        assert!(!is_heading_text("this sentence continues the previous paragraph"));
        assert!(!is_heading_text("Results were mixed across sites"));
    }

    #[test]
    fn test_title_case() {
        assert!(is_title_case("Annual Report"));
        assert!(is_title_case("Q3 Report"));
        assert!(!is_title_case("Annual report"));
        assert!(!is_title_case("McDonald Farm"));
        assert!(!is_title_case("1234"));
    }

    #[test]
    fn test_section_word_is_whole_word() {
        assert!(contains_word("see appendix a", "appendix"));
        assert!(!contains_word("sectional couch", "section"));
    }
}
