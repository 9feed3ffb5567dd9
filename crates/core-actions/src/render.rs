//! Shared rendering mechanics for the binding set.
//!
//! Every redraw follows the same discipline: force any terminal scroll
//! first (so the model's origin shift and the screen agree), write the
//! wrapped lines from the prompt origin, blank whatever stale cells the
//! edit left behind, then park the cursor at its recomputed position.

use anyhow::Result;

use core_keymap::ReaderCtx;
use core_layout::{self as layout, Viewport};
use core_state::ReaderState;
use core_text::str_width;

pub(crate) fn viewport(ctx: &mut ReaderCtx<'_>) -> Result<Viewport> {
    let (w, h) = ctx.renderer.size()?;
    Ok(Viewport::new(w, h))
}

/// Park the terminal cursor at the model's cursor position.
pub(crate) fn place_cursor(state: &ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
    ctx.renderer
        .set_cursor(state.cursor_screen.col, state.cursor_screen.row)
}

/// When the wrapped rendering no longer fits above the bottom row, make
/// the terminal scroll by emitting newlines at the bottom, then shift the
/// model origin by the same amount. After this, every line row is a valid
/// on-screen coordinate.
fn sync_scroll(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>, vp: Viewport) -> Result<()> {
    let shift = layout::required_shift(state, vp);
    if shift > 0 {
        ctx.renderer.set_cursor(0, vp.height - 1)?;
        ctx.renderer.write_raw(&"\n".repeat(shift as usize))?;
        layout::handle_bottom_overflow(state, vp);
    }
    Ok(())
}

/// Rewrite the rendered buffer at the prompt origin, then blank
/// `pad_cells` cells to erase glyphs a shrinking edit left on screen.
pub(crate) fn redraw_text(
    state: &mut ReaderState,
    ctx: &mut ReaderCtx<'_>,
    vp: Viewport,
    pad_cells: usize,
) -> Result<()> {
    if state.one_line_wrap {
        let budget = layout::one_line_budget(state, vp);
        let visible = layout::one_line_visible(state, vp);
        let fill = budget.saturating_sub(str_width(&visible));
        ctx.renderer
            .set_cursor(state.prompt_origin.col, state.prompt_origin.row)?;
        ctx.renderer.write_raw(&visible)?;
        ctx.renderer.write_raw(&" ".repeat(fill))?;
        return Ok(());
    }

    sync_scroll(state, ctx, vp)?;
    let lines = layout::wrapped_lines(state, vp);
    let left = state.settings.left_margin;
    for (i, line) in lines.iter().enumerate() {
        let col = if i == 0 { state.prompt_origin.col } else { left };
        let row = state.prompt_origin.row.saturating_add(i as u16);
        ctx.renderer.set_cursor(col, row)?;
        ctx.renderer.write_raw(line)?;
    }
    if pad_cells > 0 {
        ctx.renderer.write_raw(&" ".repeat(pad_cells))?;
    }
    Ok(())
}

/// Blank rows a collapsing edit vacated: rows `[now, prev)` counted from
/// the prompt origin.
pub(crate) fn erase_collapsed_rows(
    state: &ReaderState,
    ctx: &mut ReaderCtx<'_>,
    vp: Viewport,
    prev_rows: usize,
) -> Result<()> {
    let rows = layout::wrapped_lines(state, vp).len();
    let left = state.settings.left_margin;
    let budget = (vp.width as usize)
        .saturating_sub(state.settings.right_margin as usize)
        .saturating_sub(left as usize);
    for r in rows..prev_rows {
        let row = state.prompt_origin.row as usize + r;
        if row < vp.height as usize {
            ctx.renderer.set_cursor(left, row as u16)?;
            ctx.renderer.write_raw(&" ".repeat(budget))?;
        }
    }
    Ok(())
}

/// Rewrite the prompt at `prompt_start` and rederive the input origin
/// from where the terminal cursor lands, plus the left margin.
pub(crate) fn redraw_prompt(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
    ctx.renderer
        .set_cursor(state.prompt_start.col, state.prompt_start.row)?;
    ctx.renderer.write_raw(&state.prompt_text)?;
    let left = state.settings.left_margin;
    if left > 0 {
        ctx.renderer.write_raw(&" ".repeat(left as usize))?;
    }
    let (col, row) = ctx.renderer.cursor_pos()?;
    state.prompt_origin = core_text::ScreenPos::new(col, row);
    Ok(())
}

/// Full redraw: prompt, buffer, cursor. Used at read start, by the
/// refresh binding, and after the suggestion panel relocates the prompt.
pub fn redraw_full(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
    let vp = viewport(ctx)?;
    redraw_prompt(state, ctx)?;
    redraw_text(state, ctx, vp, 0)?;
    layout::reposition(state, vp);
    place_cursor(state, ctx)
}
