//! Self-insert behavior: printable insertion, tab expansion, control
//! rejection, replace mode, and surrogate-pair completion.

mod common;

use common::Harness;
use core_actions::SelfInsert;
use core_events::KeyEvent;
use core_text::ScreenPos;

#[test]
fn printable_chars_append() {
    let mut h = Harness::new(40, 24);
    h.type_str("hi");
    assert_eq!(h.state.buffer.text(), "hi");
    assert_eq!(h.state.cursor_index(), 2);
    assert_eq!(h.state.cursor_screen, ScreenPos::new(2, 0));
}

#[test]
fn insert_mid_buffer_shifts_tail() {
    let mut h = Harness::new(40, 24);
    h.type_str("hllo");
    h.state.set_cursor_index(1);
    h.press(&SelfInsert, KeyEvent::printable('e'));
    assert_eq!(h.state.buffer.text(), "hello");
    assert_eq!(h.state.cursor_index(), 2);
}

#[test]
fn tab_expands_to_spaces() {
    let mut h = Harness::new(40, 24);
    h.press(&SelfInsert, KeyEvent::printable('\t'));
    assert_eq!(h.state.buffer.text(), "    ");
    assert_eq!(h.state.cursor_index(), 4);
    assert!(!h.state.take_invalid());
}

#[test]
fn control_char_is_rejected_silently() {
    let mut h = Harness::new(40, 24);
    h.press(&SelfInsert, KeyEvent::printable('\u{7}'));
    assert_eq!(h.state.buffer.text(), "");
    assert!(h.state.take_invalid());
    // Nothing was rendered for the rejected keystroke.
    assert_eq!(h.renderer.written(), "");
}

#[test]
fn zero_width_scalar_is_rejected() {
    let mut h = Harness::new(40, 24);
    h.press(&SelfInsert, KeyEvent::printable('\u{200D}'));
    assert_eq!(h.state.buffer.text(), "");
    assert!(h.state.take_invalid());
}

#[test]
fn replace_mode_overwrites_mid_buffer_only() {
    let mut h = Harness::new(40, 24);
    h.type_str("abc");
    h.state.replace_mode = true;
    h.state.set_cursor_index(1);
    h.press(&SelfInsert, KeyEvent::printable('X'));
    assert_eq!(h.state.buffer.text(), "aXc");
    // At the end replace mode appends like insert mode.
    h.state.set_cursor_index(3);
    h.press(&SelfInsert, KeyEvent::printable('d'));
    assert_eq!(h.state.buffer.text(), "aXcd");
}

#[test]
fn surrogate_pair_inserts_one_scalar() {
    let mut h = Harness::new(40, 24);
    // The low half is already queued when the high half dispatches.
    h.tx.send_key(KeyEvent::utf16(0xDE00));
    h.press(&SelfInsert, KeyEvent::utf16(0xD83D));
    assert_eq!(h.state.buffer.text(), "😀");
    assert_eq!(h.state.cursor_index(), 1);
    assert!(!h.state.take_invalid());
}

#[test]
fn lone_low_surrogate_is_invalid() {
    let mut h = Harness::new(40, 24);
    h.press(&SelfInsert, KeyEvent::utf16(0xDE00));
    assert_eq!(h.state.buffer.text(), "");
    assert!(h.state.take_invalid());
}

#[test]
fn high_surrogate_followed_by_scalar_invalidates_pair() {
    let mut h = Harness::new(40, 24);
    h.tx.send_key(KeyEvent::printable('x'));
    h.press(&SelfInsert, KeyEvent::utf16(0xD83D));
    assert_eq!(h.state.buffer.text(), "");
    assert!(h.state.take_invalid());
}

#[test]
fn wrapping_insert_tracks_cursor_to_next_row() {
    let mut h = Harness::new(10, 24);
    h.type_str("abcdefghijkl");
    assert_eq!(h.state.cursor_screen, ScreenPos::new(2, 1));
}

#[test]
fn insert_at_bottom_scrolls_and_shifts_origin() {
    let mut h = Harness::new(10, 3);
    h.state.prompt_origin = ScreenPos::new(0, 2);
    h.state.prompt_start = ScreenPos::new(0, 2);
    h.type_str(&"x".repeat(12));
    // Two wrapped lines from the bottom row: origin shifted up once.
    assert_eq!(h.state.prompt_origin.row, 1);
    assert_eq!(h.state.cursor_screen, ScreenPos::new(2, 2));
    assert_eq!(h.renderer.scrolled, 1);
}
