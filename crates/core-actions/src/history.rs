//! History recall: wholesale buffer replacement from previously submitted
//! inputs, with the in-progress input preserved at the detached position.
//!
//! `history_pos` walks `[-1, len-1]` where `-1` means "not browsing": the
//! live input, stashed when browsing begins and restored when navigating
//! back past the newest entry. Wheel events recall history too, so these
//! two bindings carry pointer patterns.

use anyhow::Result;

use core_events::{KeyCode, PointerAction, PointerButton};
use core_keymap::{Binding, KeySpec, PointerSpec, ReaderCtx};
use core_layout as layout;
use core_state::{HISTORY_DETACHED, ReaderState};
use core_text::str_width;

use crate::render;

/// Replace the buffer with `text`, blanking whatever the longer previous
/// rendering leaves behind.
fn swap_buffer(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>, text: &str) -> Result<()> {
    let vp = render::viewport(ctx)?;
    let prev_rows = layout::wrapped_lines(state, vp).len();
    let prev_cells = str_width(&state.rendered_text());
    state.replace_buffer(text);
    let pad = prev_cells.saturating_sub(str_width(&state.rendered_text()));
    render::redraw_text(state, ctx, vp, pad)?;
    render::erase_collapsed_rows(state, ctx, vp, prev_rows)?;
    layout::reposition(state, vp);
    render::place_cursor(state, ctx)
}

pub struct HistoryUp;

impl Binding for HistoryUp {
    fn name(&self) -> &'static str {
        "history-up"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Up)];
        &KEYS
    }

    fn pointer_keys(&self) -> &[PointerSpec] {
        const SPECS: [PointerSpec; 1] =
            [PointerSpec::new(PointerButton::None, PointerAction::WheelUp)];
        &SPECS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        if state.history.is_empty() {
            state.mark_invalid();
            return Ok(());
        }
        let pos = if state.history_pos == HISTORY_DETACHED {
            state.pending_input = Some(state.buffer.text());
            state.history.len() as isize - 1
        } else if state.history_pos > 0 {
            state.history_pos - 1
        } else {
            // Already at the oldest entry.
            state.mark_invalid();
            return Ok(());
        };
        state.history_pos = pos;
        let entry = state.history[pos as usize].clone();
        tracing::debug!(target: "reader.history", pos, "history_recall_up");
        swap_buffer(state, ctx, &entry)
    }
}

pub struct HistoryDown;

impl Binding for HistoryDown {
    fn name(&self) -> &'static str {
        "history-down"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Down)];
        &KEYS
    }

    fn pointer_keys(&self) -> &[PointerSpec] {
        const SPECS: [PointerSpec; 1] =
            [PointerSpec::new(PointerButton::None, PointerAction::WheelDown)];
        &SPECS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        if state.history_pos == HISTORY_DETACHED {
            state.mark_invalid();
            return Ok(());
        }
        let next = state.history_pos + 1;
        if next >= state.history.len() as isize {
            // Walked past the newest entry: restore the stashed input.
            state.history_pos = HISTORY_DETACHED;
            let restored = state.pending_input.take().unwrap_or_default();
            tracing::debug!(target: "reader.history", "history_restore_pending");
            return swap_buffer(state, ctx, &restored);
        }
        state.history_pos = next;
        let entry = state.history[next as usize].clone();
        tracing::debug!(target: "reader.history", pos = next, "history_recall_down");
        swap_buffer(state, ctx, &entry)
    }
}
