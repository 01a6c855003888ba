use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap());
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Turn a display name into a file-safe identifier.
///
/// Lowercases, turns whitespace runs into `-`, drops everything outside
/// `[A-Za-z0-9_-]`, collapses repeated hyphens and trims them from both ends.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(&lower, "-");
    let stripped = NON_WORD_RE.replace_all(&dashed, "");
    let collapsed = HYPHENS_RE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Format a value with comma thousands separators. `None` yields an empty string.
pub fn number_with_commas<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => group_thousands(&v.to_string()),
        None => String::new(),
    }
}

/// Insert commas between groups of three digits in the integer part of a
/// numeric string. Sign and fractional part are kept as they are.
pub fn group_thousands(numeric: &str) -> String {
    let (sign, rest) = match numeric.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", numeric),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return numeric.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_names() {
        assert_eq!(slugify("Acme"), "acme");
        assert_eq!(slugify("Green Orbit Digital"), "green-orbit-digital");
        assert_eq!(slugify("  Café & Co.  "), "caf-co");
        assert_eq!(slugify("Foo -- Bar"), "foo-bar");
        assert_eq!(slugify("snake_case Ltd"), "snake_case-ltd");
        assert_eq!(slugify("🌳🌳"), "");
    }

    #[test]
    fn slugify_is_idempotent() {
        for s in [
            "Acme",
            " -Leading and trailing- ",
            "Multiple   spaces\tand\nlines",
            "Ünïcödé Öŕg",
            "a--b---c",
            "!!!",
        ] {
            let once = slugify(s);
            assert_eq!(slugify(&once), once, "input {:?}", s);
            assert!(!once.starts_with('-') && !once.ends_with('-'));
            assert!(!once.contains("--"));
            assert!(once
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn commas_on_integers() {
        assert_eq!(number_with_commas(Some(0)), "0");
        assert_eq!(number_with_commas(Some(999)), "999");
        assert_eq!(number_with_commas(Some(1000)), "1,000");
        assert_eq!(number_with_commas(Some(1234567)), "1,234,567");
        assert_eq!(number_with_commas(Some(2048000.0)), "2,048,000");
        assert_eq!(number_with_commas(None::<u64>), "");
    }

    #[test]
    fn commas_on_numeric_strings() {
        assert_eq!(group_thousands("100.0"), "100.0");
        assert_eq!(group_thousands("12345.6"), "12,345.6");
        assert_eq!(group_thousands("-1234"), "-1,234");
        assert_eq!(group_thousands("n/a"), "n/a");
    }
}
