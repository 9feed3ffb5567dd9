//! Cursor motions and the replace-mode toggle. Motions move the logical
//! cursor through the positioning engine and repark the terminal cursor;
//! no text is rewritten.

use anyhow::Result;

use core_events::KeyCode;
use core_keymap::{Binding, KeySpec, ReaderCtx};
use core_layout as layout;
use core_state::ReaderState;

use crate::render;

fn move_by(
    state: &mut ReaderState,
    ctx: &mut ReaderCtx<'_>,
    forward: bool,
    count: usize,
) -> Result<()> {
    let vp = render::viewport(ctx)?;
    if forward {
        layout::advance(state, vp, count);
    } else {
        layout::retreat(state, vp, count);
    }
    if state.one_line_wrap {
        // The visible window may have slid; repaint it.
        render::redraw_text(state, ctx, vp, 0)?;
        layout::reposition(state, vp);
    }
    render::place_cursor(state, ctx)
}

pub struct MoveLeft;

impl Binding for MoveLeft {
    fn name(&self) -> &'static str {
        "move-left"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Left)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        move_by(state, ctx, false, 1)
    }
}

pub struct MoveRight;

impl Binding for MoveRight {
    fn name(&self) -> &'static str {
        "move-right"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Right)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        move_by(state, ctx, true, 1)
    }
}

pub struct Home;

impl Binding for Home {
    fn name(&self) -> &'static str {
        "home"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Home)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        let back = state.cursor_index();
        move_by(state, ctx, false, back)
    }
}

pub struct End;

impl Binding for End {
    fn name(&self) -> &'static str {
        "end"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::End)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        let forward = state.buffer.len() - state.cursor_index();
        move_by(state, ctx, true, forward)
    }
}

pub struct ToggleReplace;

impl Binding for ToggleReplace {
    fn name(&self) -> &'static str {
        "toggle-replace"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Insert)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, _ctx: &mut ReaderCtx<'_>) -> Result<()> {
        state.replace_mode = !state.replace_mode;
        tracing::debug!(target: "reader.state", replace = state.replace_mode, "replace_mode_toggled");
        Ok(())
    }
}
