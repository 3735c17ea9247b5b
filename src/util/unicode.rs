use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '\u{2026}';

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_cells` cells on a grapheme boundary, ending
/// with `…` when anything was dropped.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let Some(budget) = max_cells.checked_sub(1) else {
        return String::new();
    };
    let mut used = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(grapheme);
    }
    out.push(ELLIPSIS);
    out
}

/// Right-pad `s` with spaces to `cells` cells (no-op if already wider)
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let pad = cells.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(pad))
}
