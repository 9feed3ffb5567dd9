//! History navigation: wholesale recall, pending-input preservation, and
//! wheel-event dispatch.

mod common;

use common::Harness;
use core_actions::{HistoryDown, HistoryUp};
use core_keymap::Binding;
use core_events::{PointerAction, PointerButton, PointerEvent};
use pretty_assertions::assert_eq;

fn with_history(entries: &[&str]) -> Harness {
    let mut h = Harness::new(40, 24);
    h.state.history = entries.iter().map(|s| s.to_string()).collect();
    h
}

#[test]
fn up_twice_reaches_older_entry() {
    let mut h = with_history(&["a", "b"]);
    h.run(&HistoryUp);
    assert_eq!(h.state.buffer.text(), "b");
    h.run(&HistoryUp);
    assert_eq!(h.state.buffer.text(), "a");
}

#[test]
fn down_after_up_returns_to_newer_entry() {
    let mut h = with_history(&["a", "b"]);
    h.run(&HistoryUp);
    h.run(&HistoryUp);
    assert_eq!(h.state.buffer.text(), "a");
    h.run(&HistoryDown);
    assert_eq!(h.state.buffer.text(), "b");
}

#[test]
fn in_progress_input_survives_the_round_trip() {
    let mut h = with_history(&["old"]);
    h.type_str("draft");
    h.run(&HistoryUp);
    assert_eq!(h.state.buffer.text(), "old");
    h.run(&HistoryDown);
    assert_eq!(h.state.buffer.text(), "draft");
    assert_eq!(h.state.cursor_index(), 5);
}

#[test]
fn up_with_empty_history_is_invalid() {
    let mut h = Harness::new(40, 24);
    h.run(&HistoryUp);
    assert!(h.state.take_invalid());
}

#[test]
fn up_at_oldest_entry_stays_put() {
    let mut h = with_history(&["only"]);
    h.run(&HistoryUp);
    assert_eq!(h.state.buffer.text(), "only");
    h.run(&HistoryUp);
    assert_eq!(h.state.buffer.text(), "only");
    assert!(h.state.take_invalid());
}

#[test]
fn down_while_not_browsing_is_invalid() {
    let mut h = Harness::new(40, 24);
    h.type_str("live");
    h.run(&HistoryDown);
    assert!(h.state.take_invalid());
    assert_eq!(h.state.buffer.text(), "live");
}

#[test]
fn longer_entry_is_blanked_when_recalling_shorter() {
    let mut h = with_history(&["a very long history entry", "hi"]);
    h.run(&HistoryUp); // "hi"
    h.run(&HistoryUp); // the long one
    h.renderer.ops.clear();
    h.run(&HistoryDown); // back to "hi": must blank the leftover tail
    let writes = h.renderer.writes().join("");
    let blanks = writes.chars().filter(|c| *c == ' ').count();
    assert!(blanks >= "a very long history entry".len() - 2);
    assert_eq!(h.state.buffer.text(), "hi");
}

#[test]
fn wheel_events_recall_history() {
    let up = PointerEvent {
        button: PointerButton::None,
        action: PointerAction::WheelUp,
        col: 0,
        row: 0,
    };
    assert!(HistoryUp.pointer_keys().iter().any(|p| p.matches(&up)));
    let down = PointerEvent {
        action: PointerAction::WheelDown,
        ..up
    };
    assert!(HistoryDown.pointer_keys().iter().any(|p| p.matches(&down)));
}
