//! Rubout (backspace) and delete.

use anyhow::Result;

use core_keymap::{Binding, KeySpec, ReaderCtx};
use core_layout as layout;
use core_state::ReaderState;
use core_text::cell_width;

use core_events::KeyCode;

use crate::render;

pub struct Rubout;

impl Binding for Rubout {
    fn name(&self) -> &'static str {
        "rubout"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Backspace)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        // At the start of the text: documented no-op, not an error.
        if state.cursor_index() == 0 {
            return Ok(());
        }
        let vp = render::viewport(ctx)?;
        let prev_rows = layout::wrapped_lines(state, vp).len();
        let Some(removed) = state.remove_before_cursor() else {
            return Ok(());
        };
        let pad = cell_width(removed).max(1) as usize;
        render::redraw_text(state, ctx, vp, pad)?;
        render::erase_collapsed_rows(state, ctx, vp, prev_rows)?;
        layout::reposition(state, vp);
        render::place_cursor(state, ctx)
    }
}

pub struct DeleteChar;

impl Binding for DeleteChar {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Delete)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        // At the end of the text: documented no-op.
        if state.cursor_index() == state.buffer.len() {
            return Ok(());
        }
        let vp = render::viewport(ctx)?;
        let prev_rows = layout::wrapped_lines(state, vp).len();
        let Some(removed) = state.remove_at_cursor() else {
            return Ok(());
        };
        let pad = cell_width(removed).max(1) as usize;
        render::redraw_text(state, ctx, vp, pad)?;
        render::erase_collapsed_rows(state, ctx, vp, prev_rows)?;
        layout::reposition(state, vp);
        render::place_cursor(state, ctx)
    }
}
