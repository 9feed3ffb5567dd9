//! Kill-buffer round trips: cut a word forward/backward, yank it back.

mod common;

use common::Harness;
use core_actions::{CutBackwardWord, CutForwardWord, Yank};
use pretty_assertions::assert_eq;

#[test]
fn cut_forward_consumes_whitespace_then_word() {
    let mut h = Harness::new(40, 24);
    h.seed_text("alpha beta gamma");
    h.state.set_cursor_index(5); // between "alpha" and " beta"
    h.run(&CutForwardWord);
    assert_eq!(h.state.buffer.text(), "alpha gamma");
    assert_eq!(h.state.kill_buffer, " beta");
    assert_eq!(h.state.cursor_index(), 5);
}

#[test]
fn cut_forward_at_word_start_takes_whole_word() {
    let mut h = Harness::new(40, 24);
    h.seed_text("one two");
    h.state.set_cursor_index(0);
    h.run(&CutForwardWord);
    assert_eq!(h.state.buffer.text(), " two");
    assert_eq!(h.state.kill_buffer, "one");
}

#[test]
fn cut_forward_on_empty_buffer_is_invalid() {
    let mut h = Harness::new(40, 24);
    h.run(&CutForwardWord);
    assert!(h.state.take_invalid());
    assert_eq!(h.state.kill_buffer, "");
}

#[test]
fn cut_forward_at_end_is_noop() {
    let mut h = Harness::new(40, 24);
    h.seed_text("word");
    h.run(&CutForwardWord);
    assert_eq!(h.state.buffer.text(), "word");
    assert_eq!(h.state.kill_buffer, "");
    assert!(!h.state.take_invalid());
}

#[test]
fn cut_backward_takes_word_and_trailing_spaces() {
    let mut h = Harness::new(40, 24);
    h.seed_text("alpha beta  ");
    h.run(&CutBackwardWord);
    assert_eq!(h.state.buffer.text(), "alpha ");
    assert_eq!(h.state.kill_buffer, "beta  ");
    assert_eq!(h.state.cursor_index(), 6);
}

#[test]
fn cut_backward_at_start_is_noop() {
    let mut h = Harness::new(40, 24);
    h.seed_text("word");
    h.state.set_cursor_index(0);
    h.run(&CutBackwardWord);
    assert_eq!(h.state.buffer.text(), "word");
    assert_eq!(h.state.kill_buffer, "");
}

#[test]
fn successive_cuts_accumulate() {
    let mut h = Harness::new(40, 24);
    h.seed_text("a b c");
    h.state.set_cursor_index(0);
    h.run(&CutForwardWord);
    h.run(&CutForwardWord);
    assert_eq!(h.state.buffer.text(), " c");
    assert_eq!(h.state.kill_buffer, "a b");
}

#[test]
fn yank_reinserts_at_cursor() {
    let mut h = Harness::new(40, 24);
    h.seed_text("alpha beta");
    h.state.set_cursor_index(5);
    h.run(&CutForwardWord);
    assert_eq!(h.state.buffer.text(), "alpha");
    h.run(&Yank);
    assert_eq!(h.state.buffer.text(), "alpha beta");
    assert_eq!(h.state.cursor_index(), 10);
}

#[test]
fn yank_with_empty_kill_buffer_is_invalid() {
    let mut h = Harness::new(40, 24);
    h.seed_text("text");
    h.run(&Yank);
    assert!(h.state.take_invalid());
    assert_eq!(h.state.buffer.text(), "text");
}
