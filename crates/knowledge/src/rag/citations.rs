//! Citation building.

use crate::types::{Citation, Passage};

/// Maximum snippet length in characters before the ellipsis.
pub const MAX_SNIPPET_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

/// Truncate `text` to `max_chars` characters, appending `"..."` when cut.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// One citation per passage, same order.
pub fn build_citations(passages: &[Passage]) -> Vec<Citation> {
    passages
        .iter()
        .map(|passage| Citation {
            passage_id: passage.id.clone(),
            section: passage.section.clone(),
            snippet: Some(truncate_snippet(&passage.text, MAX_SNIPPET_CHARS)),
            page: passage.page,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(
            truncate_snippet("Check tire pressure monthly.", MAX_SNIPPET_CHARS),
            "Check tire pressure monthly."
        );
    }

    #[test]
    fn test_exact_length_unchanged() {
        let text = "a".repeat(MAX_SNIPPET_CHARS);
        assert_eq!(truncate_snippet(&text, MAX_SNIPPET_CHARS), text);
    }

    #[test]
    fn test_long_text_truncated() {
        let text = "b".repeat(450);
        let snippet = truncate_snippet(&text, MAX_SNIPPET_CHARS);
        assert_eq!(snippet.chars().count(), MAX_SNIPPET_CHARS + 3);
        assert!(snippet.ends_with("..."));
        assert!(text.starts_with(&snippet[..MAX_SNIPPET_CHARS]));
    }

    #[test]
    fn test_truncation_on_char_boundary() {
        let text = "ü".repeat(250);
        let snippet = truncate_snippet(&text, MAX_SNIPPET_CHARS);
        assert_eq!(snippet.chars().count(), MAX_SNIPPET_CHARS + 3);
    }

    #[test]
    fn test_truncation_is_idempotent() {
        for long in ["k".repeat(450), "ö".repeat(450), "日本語".repeat(100)] {
            let once = truncate_snippet(&long, MAX_SNIPPET_CHARS);
            let twice = truncate_snippet(&once, MAX_SNIPPET_CHARS);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_short_inputs_returned_unchanged() {
        let accented = "é".repeat(MAX_SNIPPET_CHARS);
        for text in ["", "Coolant level should be between MIN and MAX.", accented.as_str()] {
            assert_eq!(truncate_snippet(text, MAX_SNIPPET_CHARS), text);
        }
    }

    #[test]
    fn test_build_citations_preserves_order_and_fields() {
        let passages = vec![
            Passage::new("p2", "Second", "m1", "x").unwrap().with_page(9),
            Passage::new("p1", "First", "m1", "x").unwrap().with_section("Intro"),
        ];

        let citations = build_citations(&passages);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].passage_id, "p2");
        assert_eq!(citations[0].page, Some(9));
        assert_eq!(citations[0].section, None);
        assert_eq!(citations[1].section.as_deref(), Some("Intro"));
        assert_eq!(citations[1].snippet.as_deref(), Some("First"));
    }
}
