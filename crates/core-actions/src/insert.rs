//! Self-insert: the default action for key events no binding claims.
//!
//! Control characters are rejected except Tab, which expands to a fixed
//! run of spaces. Zero-width scalars are rejected. A UTF-16 high
//! surrogate blocks, synchronously draining key events until the matching
//! low half (or anything else, which invalidates the pair) arrives, then
//! inserts the completed scalar atomically — the buffer never holds half
//! a character.

use anyhow::Result;

use core_events::{KeyPayload, SURROGATE_COMPLETIONS};
use core_keymap::{Binding, KeySpec, ReaderCtx};
use core_state::ReaderState;
use core_text::cell_width;
use core_text::width::{combine_surrogates, is_high_surrogate, is_low_surrogate};

use crate::render;

pub struct SelfInsert;

impl Binding for SelfInsert {
    fn name(&self) -> &'static str {
        "self-insert"
    }

    // Fallback action: claims no keys of its own.
    fn bound_keys(&self) -> &[KeySpec] {
        &[]
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        let Some(ev) = state.pressed else {
            state.mark_invalid();
            return Ok(());
        };
        match ev.ch {
            Some(KeyPayload::Scalar(c)) => insert_scalar(state, ctx, c),
            Some(KeyPayload::Utf16(unit)) => insert_utf16(state, ctx, unit),
            None => {
                state.mark_invalid();
                Ok(())
            }
        }
    }
}

fn insert_scalar(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>, c: char) -> Result<()> {
    if c == '\t' {
        let spaces = " ".repeat(state.settings.tab_width);
        return commit(state, ctx, &spaces);
    }
    if c.is_control() || cell_width(c) == 0 {
        state.mark_invalid();
        return Ok(());
    }
    commit(state, ctx, &c.to_string())
}

/// A lone UTF-16 unit: pair a high half with the next unit, reject
/// everything else.
fn insert_utf16(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>, unit: u16) -> Result<()> {
    if !is_high_surrogate(unit) {
        state.mark_invalid();
        return Ok(());
    }
    // Block until the pair completes; the listener thread keeps feeding
    // the channel, so this wait is bounded by the very next key press.
    loop {
        if ctx.input.key_available() {
            let next = ctx.input.read_key()?;
            return match next.ch {
                Some(KeyPayload::Utf16(low)) if is_low_surrogate(low) => {
                    match combine_surrogates(unit, low) {
                        Some(c) => {
                            SURROGATE_COMPLETIONS
                                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                            commit(state, ctx, &c.to_string())
                        }
                        None => {
                            state.mark_invalid();
                            Ok(())
                        }
                    }
                }
                _ => {
                    state.mark_invalid();
                    Ok(())
                }
            };
        }
        std::thread::yield_now();
    }
}

/// Apply the insertion (insert or overwrite), rewrite the text, and
/// reposition. The whole run of scalars lands in one edit.
fn commit(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>, text: &str) -> Result<()> {
    let vp = render::viewport(ctx)?;
    for c in text.chars() {
        // Replace mode only overwrites mid-buffer; at the end it appends.
        if state.replace_mode && state.cursor_index() < state.buffer.len() {
            state.overwrite_at_cursor(c);
        } else {
            state.insert_at_cursor(c);
        }
    }
    render::redraw_text(state, ctx, vp, 0)?;
    core_layout::reposition(state, vp);
    render::place_cursor(state, ctx)
}
