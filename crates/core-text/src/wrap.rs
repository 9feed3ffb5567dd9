//! Greedy soft-wrap of a rendered string into physical terminal lines.

use crate::width::cell_width;

/// Wrap `text` into physical lines of at most `max_width` cells.
///
/// Accumulates scalars into the current line until appending the next one
/// would exceed the width, then opens a new line. A wide scalar is atomic:
/// when it does not fit it moves to the next line whole. Zero-width scalars
/// never open a line, so combining marks stay attached to their base.
///
/// `first_line_offset` narrows only the first produced line, accounting for
/// prompt text already occupying columns. An embedded `'\n'` forces a line
/// break (prompt text may be multi-line); the newline itself is not kept.
///
/// Always produces at least one line; empty input yields one empty line.
/// A `max_width` of zero is treated as one cell rather than rejected.
pub fn wrap_to_width(text: &str, max_width: usize, first_line_offset: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0usize;
    // The prompt may consume the whole first line; the first scalar then
    // opens line two immediately via the overflow check below.
    let mut avail = max_width.saturating_sub(first_line_offset);

    for ch in text.chars() {
        if ch == '\n' {
            lines.push(std::mem::take(&mut current));
            used = 0;
            avail = max_width;
            continue;
        }
        let w = cell_width(ch) as usize;
        if w > 0 && used + w > avail {
            lines.push(std::mem::take(&mut current));
            used = 0;
            avail = max_width;
        }
        current.push(ch);
        used += w;
    }
    lines.push(current);
    lines
}
