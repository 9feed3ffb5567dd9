//! Kill-buffer operations: cut a word forward or backward, reinsert with
//! yank. Cut text accumulates in the session-lifetime kill buffer.

use anyhow::Result;

use core_events::{KeyCode, KeyMods};
use core_keymap::{Binding, KeySpec, ReaderCtx};
use core_layout as layout;
use core_state::ReaderState;
use core_text::str_width;

use crate::render;

/// Scan length of "whitespace run, then word" starting at `from`.
fn forward_word_steps(state: &ReaderState, from: usize) -> usize {
    let chars: Vec<char> = state.buffer.chars().collect();
    let mut steps = 0usize;
    let mut i = from;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            steps += 1;
        } else {
            steps += 1;
            if i == chars.len() - 1 || chars[i + 1].is_whitespace() {
                break;
            }
        }
        i += 1;
    }
    steps
}

/// Start index of "word, then trailing whitespace run" ending at `to`.
fn backward_word_start(state: &ReaderState, to: usize) -> usize {
    let chars: Vec<char> = state.buffer.chars().collect();
    let mut start = to.min(chars.len());
    while start > 0 && chars[start - 1].is_whitespace() {
        start -= 1;
    }
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    start
}

fn cut_range(
    state: &mut ReaderState,
    ctx: &mut ReaderCtx<'_>,
    start: usize,
    count: usize,
) -> Result<()> {
    let vp = render::viewport(ctx)?;
    let prev_rows = layout::wrapped_lines(state, vp).len();
    let removed = state.remove_range(start, count);
    if removed.is_empty() {
        return Ok(());
    }
    let pad = str_width(&removed).max(1);
    state.kill_buffer.push_str(&removed);
    state.set_cursor_index(start);
    tracing::debug!(
        target: "reader.kill",
        removed_len = removed.chars().count(),
        kill_len = state.kill_buffer.chars().count(),
        "cut"
    );
    render::redraw_text(state, ctx, vp, pad)?;
    render::erase_collapsed_rows(state, ctx, vp, prev_rows)?;
    layout::reposition(state, vp);
    render::place_cursor(state, ctx)
}

pub struct CutForwardWord;

impl Binding for CutForwardWord {
    fn name(&self) -> &'static str {
        "cut-forward-word"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::chord('d', KeyMods::ALT)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        if state.buffer.is_empty() {
            state.mark_invalid();
            return Ok(());
        }
        let cursor = state.cursor_index();
        if cursor == state.buffer.len() {
            return Ok(());
        }
        let steps = forward_word_steps(state, cursor);
        cut_range(state, ctx, cursor, steps)
    }
}

pub struct CutBackwardWord;

impl Binding for CutBackwardWord {
    fn name(&self) -> &'static str {
        "cut-backward-word"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::chord('w', KeyMods::CTRL)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        let cursor = state.cursor_index();
        if cursor == 0 {
            return Ok(());
        }
        let start = backward_word_start(state, cursor);
        cut_range(state, ctx, start, cursor - start)
    }
}

pub struct Yank;

impl Binding for Yank {
    fn name(&self) -> &'static str {
        "yank"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::chord('y', KeyMods::CTRL)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        if state.kill_buffer.is_empty() {
            state.mark_invalid();
            return Ok(());
        }
        let vp = render::viewport(ctx)?;
        let text = state.kill_buffer.clone();
        state.insert_str_at_cursor(&text);
        render::redraw_text(state, ctx, vp, 0)?;
        layout::reposition(state, vp);
        render::place_cursor(state, ctx)
    }
}
