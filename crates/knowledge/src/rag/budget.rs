//! Context budgeting for retrieved passages.

use crate::types::Passage;

/// Longest prefix of `passages` whose cumulative text length (in chars) fits
/// within `max_chars`.
///
/// The first passage is always included, even if it alone exceeds the
/// budget. Selection stops at the first passage that would overflow; later,
/// shorter passages are not considered.
pub fn select_within_budget(passages: &[Passage], max_chars: usize) -> &[Passage] {
    let mut total = 0usize;
    let mut end = 0usize;

    for passage in passages {
        let len = passage.text.chars().count();
        if end > 0 && total + len > max_chars {
            break;
        }
        total += len;
        end += 1;
    }

    &passages[..end]
}
