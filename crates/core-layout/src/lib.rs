//! Positioning engine: maps the logical cursor index to screen
//! coordinates under both wrap modes, and compensates for terminal
//! scrolling when the wrapped rendering reaches past the bottom row.
//!
//! Geometry model:
//! - Usable columns are `[0, width - right_margin)`; call the upper bound
//!   the *limit*.
//! - The first physical line of input starts at `prompt_origin.col`
//!   (prompt last line plus left margin); continuation lines start at
//!   `left_margin`.
//! - The cursor walk mirrors `wrap_to_width` exactly: a scalar that would
//!   pass the limit moves whole to the next line, zero-width scalars
//!   never wrap. A cursor landing exactly on the limit is displayed at
//!   the start of a new physical line, matching how terminals wrap on
//!   write.
//!
//! Scroll compensation invariant: once a redraw would extend past the
//! bottom row the terminal scrolls, so `prompt_origin.row` (and
//! `prompt_start.row`) shift up by the overflow *before* any cursor row
//! is derived. `reposition` encodes that ordering; nothing else computes
//! cursor rows.
//!
//! Failure semantics: every entry point clamps out-of-range arguments to
//! the nearest valid boundary; nothing here panics for any cursor index
//! in `[0, buffer.len()]`.

use core_state::ReaderState;
use core_text::{ScreenPos, cell_width, str_width, wrap_to_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Absolute column one past the last usable cell.
fn limit(state: &ReaderState, vp: Viewport) -> usize {
    (vp.width as usize)
        .saturating_sub(state.settings.right_margin as usize)
        .max(1)
}

/// Cell budget of a continuation line.
fn continuation_budget(state: &ReaderState, vp: Viewport) -> usize {
    limit(state, vp)
        .saturating_sub(state.settings.left_margin as usize)
        .max(1)
}

/// Extra first-line columns consumed by the prompt beyond the left margin.
fn first_line_offset(state: &ReaderState) -> usize {
    (state.prompt_origin.col as usize).saturating_sub(state.settings.left_margin as usize)
}

/// The rendered buffer wrapped into physical lines for the current
/// geometry (multi-line mode).
pub fn wrapped_lines(state: &ReaderState, vp: Viewport) -> Vec<String> {
    wrap_to_width(
        &state.rendered_text(),
        continuation_budget(state, vp),
        first_line_offset(state),
    )
}

/// Walk the rendered text up to the cursor index and return where the
/// cursor falls on screen. Assumes `prompt_origin` already reflects any
/// scroll shift (see `reposition`).
pub fn locate_cursor(state: &ReaderState, vp: Viewport) -> ScreenPos {
    // API misuse, not a user-input edge case: the state's mutators make
    // this unrepresentable.
    debug_assert!(
        state.cursor_index() <= state.buffer.len(),
        "cursor index escaped the buffer"
    );
    let limit = limit(state, vp);
    let left = state.settings.left_margin as usize;
    let rendered = state.rendered_text();
    let mut col = state.prompt_origin.col as usize;
    let mut row = state.prompt_origin.row as usize;
    for ch in rendered.chars().take(state.cursor_index()) {
        let w = cell_width(ch) as usize;
        if w > 0 && col + w > limit {
            row += 1;
            col = left;
        }
        col += w;
    }
    // Exactly-full line: the cursor sits at the start of a fresh physical
    // line, not one past the final column.
    if col >= limit {
        row += 1;
        col = left;
    }
    ScreenPos::new(col.min(u16::MAX as usize) as u16, row.min(u16::MAX as usize) as u16)
}

/// Rows the prompt must shift up so that both the wrapped rendering and
/// the cursor fit above the bottom row. Pure; 0 when everything fits.
///
/// The cursor row matters independently: with the last physical line
/// exactly full, the cursor occupies a fresh row below the text.
pub fn required_shift(state: &ReaderState, vp: Viewport) -> u16 {
    let rows = wrapped_lines(state, vp).len();
    let text_last = state.prompt_origin.row as usize + rows.saturating_sub(1);
    let cursor_row = locate_cursor(state, vp).row as usize;
    let last_row = text_last.max(cursor_row);
    let bottom = vp.height as usize - 1;
    last_row.saturating_sub(bottom).min(u16::MAX as usize) as u16
}

/// Shift the prompt rows up when the wrapped rendering (or the cursor)
/// would pass the bottom of the terminal. Returns the shift applied.
pub fn handle_bottom_overflow(state: &mut ReaderState, vp: Viewport) -> u16 {
    let shift = required_shift(state, vp);
    if shift == 0 {
        return 0;
    }
    state.prompt_origin.row = state.prompt_origin.row.saturating_sub(shift);
    state.prompt_start.row = state.prompt_start.row.saturating_sub(shift);
    tracing::trace!(
        target: "reader.layout",
        shift,
        origin_row = state.prompt_origin.row,
        "bottom_overflow_shift"
    );
    shift
}

/// Recompute `cursor_screen` from `cursor_index`, accounting first for any
/// bottom-overflow shift. The single entry point after every mutation.
pub fn reposition(state: &mut ReaderState, vp: Viewport) {
    if state.one_line_wrap {
        reposition_one_line(state, vp);
        return;
    }
    handle_bottom_overflow(state, vp);
    state.cursor_screen = locate_cursor(state, vp);
}

/// Move the cursor forward `count` scalars (clamped) and reposition.
pub fn advance(state: &mut ReaderState, vp: Viewport, count: usize) {
    state.set_cursor_index(state.cursor_index().saturating_add(count));
    reposition(state, vp);
}

/// Move the cursor backward `count` scalars (clamped) and reposition.
pub fn retreat(state: &mut ReaderState, vp: Viewport, count: usize) {
    state.set_cursor_index(state.cursor_index().saturating_sub(count));
    reposition(state, vp);
}

// ---------------------------------------------------------------------------
// One-line wrap mode: a single horizontally-scrolling row.
// ---------------------------------------------------------------------------

/// Cell budget of the one-line viewport.
pub fn one_line_budget(state: &ReaderState, vp: Viewport) -> usize {
    (vp.width as usize)
        .saturating_sub(state.settings.right_margin as usize)
        .saturating_sub(state.prompt_origin.col as usize)
        .saturating_sub(1)
        .max(1)
}

/// The visible scalar range `[start, end)` — the wrap chunk containing the
/// cursor, so the cursor always stays within the window.
pub fn one_line_window(state: &ReaderState, vp: Viewport) -> (usize, usize) {
    let budget = one_line_budget(state, vp);
    let rendered = state.rendered_text();
    let chunks = wrap_to_width(&rendered, budget, 0);
    let target = state.cursor_index();
    let mut start = 0usize;
    for chunk in &chunks {
        let len = chunk.chars().count();
        // A cursor on a chunk boundary belongs to the earlier chunk.
        if target <= start + len {
            return (start, start + len);
        }
        start += len;
    }
    (start, state.buffer.len())
}

/// The substring currently visible in one-line-wrap mode.
pub fn one_line_visible(state: &ReaderState, vp: Viewport) -> String {
    let (start, end) = one_line_window(state, vp);
    state
        .rendered_text()
        .chars()
        .skip(start)
        .take(end - start)
        .collect()
}

fn reposition_one_line(state: &mut ReaderState, vp: Viewport) {
    let (start, _) = one_line_window(state, vp);
    let rendered = state.rendered_text();
    let prefix: String = rendered
        .chars()
        .skip(start)
        .take(state.cursor_index() - start)
        .collect();
    let col = state.prompt_origin.col as usize + str_width(&prefix);
    state.cursor_screen = ScreenPos::new(
        col.min(u16::MAX as usize) as u16,
        state.prompt_origin.row,
    );
}
