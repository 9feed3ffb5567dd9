//! Reader state: the mutable model one read call operates on.
//!
//! A `ReaderState` is created at the start of a read operation, mutated
//! exclusively by the dispatched binding's action and the positioning
//! engine, and dropped when the read returns. History and the kill buffer
//! outlive it: they are owned by the embedding session and moved in/out of
//! the state around each read call, so "survives across calls" holds
//! without hidden global state.
//!
//! Invariant maintained by every mutator: `0 <= cursor_index <= buffer.len()`.
//! All cursor-relative edits flow through the methods here so the clamp
//! lives in one place.

use std::sync::Arc;

use core_events::{KeyEvent, PointerEvent};
use core_text::{EditBuffer, ScreenPos};

/// Candidate generator: `(text, cursor_index, delimiters) -> candidates`.
pub type SuggestionGenerator = Arc<dyn Fn(&str, usize, &[char]) -> Vec<String> + Send + Sync>;

/// Immutable-for-the-duration configuration snapshot for one read call.
#[derive(Clone)]
pub struct ReaderSettings {
    pub left_margin: u16,
    pub right_margin: u16,
    /// Substitute for every buffer character in password mode.
    pub mask_char: char,
    /// Tab expands to this many spaces on insert.
    pub tab_width: usize,
    pub suggestions: Option<SuggestionGenerator>,
    /// Delimiters used to tokenize for suggestions and word-boundary ops.
    pub suggestion_delims: Vec<char>,
    /// Suppress a submission identical to the newest history entry.
    pub history_dedup: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            left_margin: 0,
            right_margin: 0,
            mask_char: '*',
            tab_width: 4,
            suggestions: None,
            suggestion_delims: vec![' '],
            history_dedup: true,
        }
    }
}

impl std::fmt::Debug for ReaderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSettings")
            .field("left_margin", &self.left_margin)
            .field("right_margin", &self.right_margin)
            .field("mask_char", &self.mask_char)
            .field("tab_width", &self.tab_width)
            .field("has_suggestions", &self.suggestions.is_some())
            .field("suggestion_delims", &self.suggestion_delims)
            .field("history_dedup", &self.history_dedup)
            .finish()
    }
}

/// Sentinel for "not browsing history": the in-progress input is live.
pub const HISTORY_DETACHED: isize = -1;

/// State of one active read call.
#[derive(Debug)]
pub struct ReaderState {
    pub buffer: EditBuffer,
    cursor_index: usize,

    /// Where the prompt text begins (start of its first line).
    pub prompt_start: ScreenPos,
    /// Where input begins: after the prompt's last line plus left margin.
    /// Shifts upward under bottom-overflow scroll compensation.
    pub prompt_origin: ScreenPos,
    /// Derived from `cursor_index` by the positioning engine after every
    /// mutation; never computed without accounting for origin shifts.
    pub cursor_screen: ScreenPos,
    pub prompt_text: String,

    pub one_line_wrap: bool,
    pub password_mode: bool,
    /// Overwrite-at-cursor instead of insert-shifting-right (Insert key).
    pub replace_mode: bool,

    /// Scratch storage for cut-style operations; session lifetime.
    pub kill_buffer: String,
    /// Previously submitted inputs, oldest first; session lifetime.
    pub history: Vec<String>,
    /// Cursor into `history`; `HISTORY_DETACHED` when not browsing.
    pub history_pos: isize,
    /// In-progress input stashed when history browsing begins; restored
    /// when navigating back past the newest entry.
    pub pending_input: Option<String>,

    /// Cursor into the transient suggestion list; `-1` when inactive.
    /// Reset on any text change.
    pub suggestions_pos: isize,

    pub settings: ReaderSettings,

    /// The key event being dispatched this iteration, if any.
    pub pressed: Option<KeyEvent>,
    /// The pointer event being dispatched this iteration, if any.
    pub pointer: Option<PointerEvent>,

    /// Set by a binding to signal "ignore this keystroke"; consumed once
    /// per loop iteration. Ordinary invalid input is invisible to the
    /// user; only a debug trace records it.
    pub operation_was_invalid: bool,
    /// An exit binding fired.
    pub exiting: bool,
    /// The exit was a cancellation: return empty, append nothing.
    pub canceled: bool,
}

impl ReaderState {
    pub fn new(prompt_text: impl Into<String>, settings: ReaderSettings) -> Self {
        Self {
            buffer: EditBuffer::new(),
            cursor_index: 0,
            prompt_start: ScreenPos::default(),
            prompt_origin: ScreenPos::default(),
            cursor_screen: ScreenPos::default(),
            prompt_text: prompt_text.into(),
            one_line_wrap: false,
            password_mode: false,
            replace_mode: false,
            kill_buffer: String::new(),
            history: Vec::new(),
            history_pos: HISTORY_DETACHED,
            pending_input: None,
            suggestions_pos: -1,
            settings,
            pressed: None,
            pointer: None,
            operation_was_invalid: false,
            exiting: false,
            canceled: false,
        }
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor_index
    }

    /// Move the cursor to `idx`, clamped to the buffer bounds.
    pub fn set_cursor_index(&mut self, idx: usize) {
        self.cursor_index = idx.min(self.buffer.len());
    }

    /// The buffer as it should appear on screen (masked in password mode).
    pub fn rendered_text(&self) -> String {
        self.buffer
            .render(self.password_mode.then_some(self.settings.mask_char))
    }

    /// Insert one scalar at the cursor, shifting the tail right; the
    /// cursor advances past it.
    pub fn insert_at_cursor(&mut self, ch: char) {
        self.buffer.insert(self.cursor_index, ch);
        self.cursor_index += 1;
        self.text_changed();
    }

    /// Overwrite the scalar under the cursor (appends at the end); the
    /// cursor advances past it.
    pub fn overwrite_at_cursor(&mut self, ch: char) {
        self.buffer.overwrite(self.cursor_index, ch);
        self.cursor_index = (self.cursor_index + 1).min(self.buffer.len());
        self.text_changed();
    }

    /// Insert a string at the cursor; the cursor lands after it.
    pub fn insert_str_at_cursor(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor_index, text);
        self.cursor_index += text.chars().count();
        self.text_changed();
    }

    /// Remove the scalar before the cursor (rubout). Returns it, or `None`
    /// at index 0 (documented no-op).
    pub fn remove_before_cursor(&mut self) -> Option<char> {
        if self.cursor_index == 0 {
            return None;
        }
        let removed = self.buffer.remove(self.cursor_index - 1);
        if removed.is_some() {
            self.cursor_index -= 1;
            self.text_changed();
        }
        removed
    }

    /// Remove the scalar at the cursor (delete). Returns it, or `None` at
    /// the end of the buffer (documented no-op). Cursor unmoved.
    pub fn remove_at_cursor(&mut self) -> Option<char> {
        let removed = self.buffer.remove(self.cursor_index);
        if removed.is_some() {
            self.text_changed();
        }
        removed
    }

    /// Remove `count` scalars starting at `start` as one compound edit,
    /// returning them. The cursor is re-clamped afterwards.
    pub fn remove_range(&mut self, start: usize, count: usize) -> String {
        let removed = self.buffer.remove_range(start, count);
        if !removed.is_empty() {
            self.cursor_index = self.cursor_index.min(self.buffer.len());
            self.text_changed();
        }
        removed
    }

    /// Replace the whole buffer (history recall), cursor at the end.
    pub fn replace_buffer(&mut self, text: &str) {
        self.buffer.replace_with(text);
        self.cursor_index = self.buffer.len();
        self.text_changed();
    }

    fn text_changed(&mut self) {
        self.suggestions_pos = -1;
    }

    /// Flag the current keystroke as rejected; the loop consumes the flag
    /// once per iteration.
    pub fn mark_invalid(&mut self) {
        self.operation_was_invalid = true;
        core_events::INVALID_OPERATIONS.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        tracing::debug!(target: "reader.state", "operation_invalid");
    }

    /// Consume the invalid flag, reporting whether it was set.
    pub fn take_invalid(&mut self) -> bool {
        std::mem::take(&mut self.operation_was_invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ReaderState {
        ReaderState::new("> ", ReaderSettings::default())
    }

    #[test]
    fn cursor_starts_at_origin() {
        let st = state();
        assert_eq!(st.cursor_index(), 0);
        assert!(st.buffer.is_empty());
    }

    #[test]
    fn insert_advances_cursor() {
        let mut st = state();
        st.insert_at_cursor('a');
        st.insert_at_cursor('b');
        assert_eq!(st.buffer.text(), "ab");
        assert_eq!(st.cursor_index(), 2);
    }

    #[test]
    fn rubout_at_start_is_noop() {
        let mut st = state();
        assert_eq!(st.remove_before_cursor(), None);
        assert_eq!(st.cursor_index(), 0);
    }

    #[test]
    fn delete_at_end_is_noop() {
        let mut st = state();
        st.insert_at_cursor('a');
        assert_eq!(st.remove_at_cursor(), None);
        assert_eq!(st.buffer.text(), "a");
        assert_eq!(st.cursor_index(), 1);
    }

    #[test]
    fn insert_then_rubout_round_trips() {
        let mut st = state();
        st.insert_str_at_cursor("hello");
        st.set_cursor_index(3);
        st.insert_at_cursor('X');
        assert_eq!(st.buffer.text(), "helXlo");
        st.remove_before_cursor();
        assert_eq!(st.buffer.text(), "hello");
        assert_eq!(st.cursor_index(), 3);
    }

    #[test]
    fn overwrite_mid_buffer_replaces() {
        let mut st = state();
        st.insert_str_at_cursor("abc");
        st.set_cursor_index(1);
        st.overwrite_at_cursor('X');
        assert_eq!(st.buffer.text(), "aXc");
        assert_eq!(st.cursor_index(), 2);
    }

    #[test]
    fn overwrite_at_end_appends() {
        let mut st = state();
        st.insert_str_at_cursor("ab");
        st.overwrite_at_cursor('c');
        assert_eq!(st.buffer.text(), "abc");
        assert_eq!(st.cursor_index(), 3);
    }

    #[test]
    fn rendered_text_masks_in_password_mode() {
        let mut st = state();
        st.password_mode = true;
        st.insert_str_at_cursor("hunter2");
        assert_eq!(st.rendered_text(), "*******");
    }

    #[test]
    fn text_change_resets_suggestions_pos() {
        let mut st = state();
        st.suggestions_pos = 2;
        st.insert_at_cursor('a');
        assert_eq!(st.suggestions_pos, -1);
    }

    #[test]
    fn take_invalid_consumes_flag() {
        let mut st = state();
        st.mark_invalid();
        assert!(st.take_invalid());
        assert!(!st.take_invalid());
    }

    #[test]
    fn set_cursor_clamps() {
        let mut st = state();
        st.insert_str_at_cursor("ab");
        st.set_cursor_index(99);
        assert_eq!(st.cursor_index(), 2);
    }
}
