//! Byte-range text edits and their application.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Replace `source[start..end]` with `replacement`. `start == end` inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Check edit invariants against a source of `source_len` bytes:
/// - `start <= end <= source_len`
/// - ranges do not overlap (an insertion may touch a replaced range)
/// - at most one insertion per offset
pub fn validate_edits(edits: &[TextEdit], source_len: usize) -> Vec<String> {
    let mut errors = Vec::new();

    for edit in edits {
        if edit.start > edit.end {
            errors.push(format!("edit {}..{}: start after end", edit.start, edit.end));
        }
        if edit.end > source_len {
            errors.push(format!(
                "edit {}..{}: past end of source ({source_len} bytes)",
                edit.start, edit.end
            ));
        }
    }

    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.start, edit.end));
    for pair in sorted.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if left.is_insertion() && right.is_insertion() && left.start == right.start {
            errors.push(format!("multiple insertions at {}", left.start));
        } else if !left.is_insertion() && !right.is_insertion() && right.start < left.end {
            errors.push(format!(
                "edits {}..{} and {}..{} overlap",
                left.start, left.end, right.start, right.end
            ));
        } else if left.is_insertion() && right.start < left.start && left.start < right.end {
            errors.push(format!(
                "insertion at {} falls inside {}..{}",
                left.start, right.start, right.end
            ));
        } else if right.is_insertion() && left.start < right.start && right.start < left.end {
            errors.push(format!(
                "insertion at {} falls inside {}..{}",
                right.start, left.start, left.end
            ));
        }
    }

    errors
}

/// Apply `edits` to `source`, returning the rewritten text.
///
/// Edits are applied from the highest offset down so earlier offsets stay
/// valid. For equal starts the wider range goes first, which leaves an
/// insertion at `p` in front of a replacement starting at `p`.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String> {
    let errors = validate_edits(edits, source.len());
    if !errors.is_empty() {
        bail!("invalid edits:\n- {}", errors.join("\n- "));
    }
    for edit in edits {
        if !source.is_char_boundary(edit.start) || !source.is_char_boundary(edit.end) {
            bail!(
                "edit {}..{} does not fall on a character boundary",
                edit.start,
                edit.end
            );
        }
    }

    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start).then_with(|| b.end.cmp(&a.end)));

    let mut rewritten = source.to_string();
    for edit in ordered {
        rewritten.replace_range(edit.start..edit.end, &edit.replacement);
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_replacements_back_to_front() {
        let source = "a + a";
        let edits = vec![TextEdit::replace(0, 1, "bb"), TextEdit::replace(4, 5, "bb")];
        assert_eq!(apply_edits(source, &edits).expect("apply"), "bb + bb");
    }

    #[test]
    fn insertion_lands_before_replacement_at_same_offset() {
        let source = "x + y;";
        let edits = vec![
            TextEdit::replace(0, 5, "sum"),
            TextEdit::insert(0, "var sum = x + y;\n"),
        ];
        assert_eq!(
            apply_edits(source, &edits).expect("apply"),
            "var sum = x + y;\nsum;"
        );
    }

    #[test]
    fn rejects_overlapping_edits() {
        let edits = vec![TextEdit::replace(0, 4, "a"), TextEdit::replace(2, 6, "b")];
        let err = apply_edits("0123456789", &edits).expect_err("overlap");
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn rejects_out_of_bounds_and_inverted_ranges() {
        let errors = validate_edits(
            &[TextEdit::replace(3, 1, ""), TextEdit::replace(2, 20, "")],
            10,
        );
        assert!(errors.iter().any(|err| err.contains("start after end")));
        assert!(errors.iter().any(|err| err.contains("past end of source")));
    }

    #[test]
    fn rejects_insertion_inside_replacement() {
        let errors = validate_edits(&[TextEdit::replace(0, 4, "a"), TextEdit::insert(2, "b")], 10);
        assert!(errors.iter().any(|err| err.contains("falls inside")));
    }

    #[test]
    fn rejects_split_multibyte_character() {
        let err = apply_edits("é", &[TextEdit::replace(1, 2, "e")]).expect_err("boundary");
        assert!(err.to_string().contains("character boundary"));
    }

    #[test]
    fn empty_edit_list_is_identity() {
        assert_eq!(apply_edits("unchanged", &[]).expect("apply"), "unchanged");
    }
}
