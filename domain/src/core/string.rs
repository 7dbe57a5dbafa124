//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Join names into a human-readable list (`a, b, c`), or `"none"` when empty.
pub fn join_or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'の' is 3 bytes; cutting inside it backs up to the previous boundary
        assert_eq!(truncate("あのねあのね", 30), "あのねあのね");
        assert_eq!(truncate("あのねあのね", 10), "あの...");
    }

    #[test]
    fn test_join_or_none() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(join_or_none(&empty), "none");
        assert_eq!(join_or_none(&["read_file", "grep_search"]), "read_file, grep_search");
    }
}
