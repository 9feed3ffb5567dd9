//! Suggestion panel and recall.
//!
//! `ShowSuggestions` invokes the configured generator. More than one
//! candidate renders a panel below the prompt: one per line when any
//! candidate is wider than one grid column, otherwise a five-column grid
//! of 15-cell columns; the prompt is then redrawn beneath the panel.
//! Exactly one candidate substitutes immediately (delegating to recall);
//! zero marks the operation invalid and renders nothing.
//!
//! Recall cycles `suggestions_pos` through the candidate list and
//! replaces the word around the cursor. The position survives its own
//! substitutions but resets on any other text change.

use anyhow::Result;

use core_events::{KeyCode, KeyMods};
use core_keymap::{Binding, KeySpec, ReaderCtx};
use core_layout as layout;
use core_state::ReaderState;
use core_text::{ScreenPos, str_width};

use crate::render;

const GRID_COLUMNS: usize = 5;
const COLUMN_CELLS: usize = 15;

fn generate(state: &ReaderState) -> Option<Vec<String>> {
    let generator = state.settings.suggestions.as_ref()?;
    Some(generator(
        &state.buffer.text(),
        state.cursor_index(),
        &state.settings.suggestion_delims,
    ))
}

/// Word span `[start, end)` around the cursor, bounded by the configured
/// delimiters.
fn word_span(state: &ReaderState) -> (usize, usize) {
    let chars: Vec<char> = state.buffer.chars().collect();
    let delims = &state.settings.suggestion_delims;
    let cursor = state.cursor_index().min(chars.len());
    let mut start = cursor;
    while start > 0 && !delims.contains(&chars[start - 1]) {
        start -= 1;
    }
    let mut end = cursor;
    while end < chars.len() && !delims.contains(&chars[end]) {
        end += 1;
    }
    (start, end)
}

/// Substitute the word around the cursor with the candidate at `pos`.
fn substitute(
    state: &mut ReaderState,
    ctx: &mut ReaderCtx<'_>,
    candidates: &[String],
    pos: isize,
) -> Result<()> {
    let vp = render::viewport(ctx)?;
    let prev_rows = layout::wrapped_lines(state, vp).len();
    let prev_cells = str_width(&state.rendered_text());
    let candidate = candidates[pos as usize].clone();
    let (start, end) = word_span(state);
    state.remove_range(start, end - start);
    state.set_cursor_index(start);
    state.insert_str_at_cursor(&candidate);
    // The mutation reset the suggestion cursor; recall keeps its place.
    state.suggestions_pos = pos;
    let pad = prev_cells.saturating_sub(str_width(&state.rendered_text()));
    render::redraw_text(state, ctx, vp, pad)?;
    render::erase_collapsed_rows(state, ctx, vp, prev_rows)?;
    layout::reposition(state, vp);
    render::place_cursor(state, ctx)
}

fn cycle(state: &mut ReaderState, ctx: &mut ReaderCtx<'_>, forward: bool) -> Result<()> {
    let Some(candidates) = generate(state) else {
        state.mark_invalid();
        return Ok(());
    };
    if candidates.is_empty() {
        state.mark_invalid();
        return Ok(());
    }
    let len = candidates.len() as isize;
    let pos = if state.suggestions_pos < 0 {
        if forward { 0 } else { len - 1 }
    } else if forward {
        (state.suggestions_pos + 1) % len
    } else {
        (state.suggestions_pos - 1 + len) % len
    };
    substitute(state, ctx, &candidates, pos)
}

/// Render the candidate panel below the current line. Returns with the
/// terminal cursor on the row where the prompt must be redrawn.
fn render_panel(ctx: &mut ReaderCtx<'_>, candidates: &[String]) -> Result<()> {
    ctx.renderer.write_raw("\r\n")?;
    let widest = candidates.iter().map(|s| str_width(s)).max().unwrap_or(0);
    if widest > COLUMN_CELLS {
        for candidate in candidates {
            ctx.renderer.write_raw(candidate)?;
            ctx.renderer.write_raw("\r\n")?;
        }
        return Ok(());
    }
    let row_cells = GRID_COLUMNS * COLUMN_CELLS;
    let mut line = String::new();
    for candidate in candidates {
        line.push_str(candidate);
        let fill = COLUMN_CELLS - (str_width(&line) % COLUMN_CELLS);
        line.push_str(&" ".repeat(fill));
        if str_width(&line) >= row_cells {
            ctx.renderer.write_raw(&line)?;
            ctx.renderer.write_raw("\r\n")?;
            line.clear();
        }
    }
    if !line.is_empty() {
        ctx.renderer.write_raw(&line)?;
        ctx.renderer.write_raw("\r\n")?;
    }
    Ok(())
}

pub struct ShowSuggestions;

impl Binding for ShowSuggestions {
    fn name(&self) -> &'static str {
        "show-suggestions"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::coded(KeyCode::Tab)];
        &KEYS
    }

    fn is_overridable(&self) -> bool {
        true
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        let Some(candidates) = generate(state) else {
            state.mark_invalid();
            return Ok(());
        };
        match candidates.len() {
            0 => {
                state.mark_invalid();
                Ok(())
            }
            1 => substitute(state, ctx, &candidates, 0),
            n => {
                tracing::debug!(target: "reader.suggest", count = n, "suggestion_panel");
                render_panel(ctx, &candidates)?;
                // The prompt moves below the panel; rederive its rows
                // from where the panel writing left the cursor.
                let (_, row) = ctx.renderer.cursor_pos()?;
                state.prompt_start = ScreenPos::new(state.prompt_start.col, row);
                render::redraw_full(state, ctx)
            }
        }
    }
}

pub struct NextSuggestion;

impl Binding for NextSuggestion {
    fn name(&self) -> &'static str {
        "next-suggestion"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::chord('n', KeyMods::ALT)];
        &KEYS
    }

    fn is_overridable(&self) -> bool {
        true
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        cycle(state, ctx, true)
    }
}

pub struct PreviousSuggestion;

impl Binding for PreviousSuggestion {
    fn name(&self) -> &'static str {
        "previous-suggestion"
    }

    fn bound_keys(&self) -> &[KeySpec] {
        const KEYS: [KeySpec; 1] = [KeySpec::chord('p', KeyMods::ALT)];
        &KEYS
    }

    fn is_overridable(&self) -> bool {
        true
    }

    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()> {
        cycle(state, ctx, false)
    }
}
