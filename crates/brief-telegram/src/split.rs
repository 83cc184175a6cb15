//! Three-tier message splitting
//!
//! Segments are exact substrings of the input: cut preferentially at
//! section boundaries (lines starting with `<b>`), then at blank-line
//! paragraph boundaries, then hard at the last char boundary under the
//! ceiling. Concatenating the segments reproduces the input byte-for-byte.

/// Marker that opens a logical report section
const SECTION_MARKER: &str = "<b>";

/// Split `text` into segments no longer than `ceiling` bytes
pub fn split_message(text: &str, ceiling: usize) -> Vec<String> {
    assert!(ceiling > 0, "ceiling must be positive");

    if text.len() <= ceiling {
        return vec![text.to_string()];
    }

    let section_cuts = section_cuts(text);
    let paragraph_cuts = paragraph_cuts(text);

    let mut segments = Vec::new();
    let mut start = 0;
    while text.len() - start > ceiling {
        let window_end = floor_char_boundary(text, start + ceiling);

        let mut cut = best_cut(&section_cuts, start, window_end)
            .or_else(|| best_cut(&paragraph_cuts, start, window_end))
            .unwrap_or(window_end);
        if cut <= start {
            // Ceiling smaller than one char; take the char anyway rather
            // than loop forever
            cut = ceil_char_boundary(text, start + 1);
        }

        segments.push(text[start..cut].to_string());
        start = cut;
    }
    segments.push(text[start..].to_string());
    segments
}

/// Byte offsets of lines that open a section
fn section_cuts(text: &str) -> Vec<usize> {
    text.match_indices(SECTION_MARKER)
        .filter(|(i, _)| *i > 0 && text.as_bytes()[i - 1] == b'\n')
        .map(|(i, _)| i)
        .collect()
}

/// Byte offsets just past each blank-line separator
fn paragraph_cuts(text: &str) -> Vec<usize> {
    text.match_indices("\n\n").map(|(i, _)| i + 2).collect()
}

/// The largest candidate cut in `(start, limit]`, if any
fn best_cut(cuts: &[usize], start: usize, limit: usize) -> Option<usize> {
    cuts.iter()
        .rev()
        .find(|&&cut| cut > start && cut <= limit)
        .copied()
}

/// Largest char boundary at or below `index`
fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary at or above `index`
fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
