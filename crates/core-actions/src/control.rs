//! Loop control: submit, cancel, and full refresh.

use anyhow::Result;

use core_events::{KeyCode, KeyMods};
use core_keymap::{Binding, KeySpec, ReaderCtx};
use core_layout as layout;
use core_state::ReaderState;

use crate::render;

/// Accept the input: park the cursor after the text, move to a fresh
/// line, and let the loop return the buffer.
pub struct Submit;

impl Binding for Submit {
    fn name(&self) -> &'static str {
        "submit"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Enter)];
        &KEYS
    }

    fn is_exit(&self) -> bool {
        true
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        let vp = render::viewport(ctx)?;
        let to_end = state.buffer.len() - state.cursor_index();
        layout::advance(state, vp, to_end);
        render::place_cursor(state, ctx)?;
        ctx.renderer.write_raw("\r\n")?;
        state.exiting = true;
        Ok(())
    }
}

/// Abort the input: the loop returns an empty string and appends nothing
/// to history.
pub struct Cancel;

impl Binding for Cancel {
    fn name(&self) -> &'static str {
        "cancel"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::chord('c', KeyMods::CTRL)];
        &KEYS
    }

    fn is_exit(&self) -> bool {
        true
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        state.exiting = true;
        state.canceled = true;
        ctx.renderer.write_raw("\r\n")?;
        Ok(())
    }
}

/// Repaint prompt and buffer from the recorded prompt start.
pub struct Refresh;

impl Binding for Refresh {
    fn name(&self) -> &'static str {
        "refresh"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::chord('l', KeyMods::CTRL)];
        &KEYS
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        render::redraw_full(state, ctx)
    }
}
