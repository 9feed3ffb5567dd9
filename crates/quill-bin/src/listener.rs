//! Terminal input listener: a dedicated thread polling crossterm and
//! feeding normalized events into the reader's channels.
//!
//! The reader side never touches crossterm events directly; everything
//! crosses the channel as `core-events` types. Resize events are dropped
//! here: the renderer re-queries the window size on every redraw.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{
    Event as CtEvent, KeyCode as CtKey, KeyEventKind, KeyModifiers as CtMods, MouseButton,
    MouseEventKind, poll, read,
};
use tracing::{debug, trace, warn};

use core_events::{
    InputSender, KeyCode, KeyEvent, KeyMods, KeyPayload, PointerAction, PointerButton,
    PointerEvent,
};

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

fn map_mods(m: CtMods) -> KeyMods {
    let mut out = KeyMods::empty();
    if m.contains(CtMods::CONTROL) {
        out |= KeyMods::CTRL;
    }
    if m.contains(CtMods::ALT) {
        out |= KeyMods::ALT;
    }
    if m.contains(CtMods::SHIFT) {
        out |= KeyMods::SHIFT;
    }
    out
}

fn map_key(code: CtKey, mods: KeyMods) -> Option<KeyEvent> {
    let ev = match code {
        CtKey::Char(c) => {
            // Plain typing should not carry the shift bit: the produced
            // character already reflects it.
            let mods = if mods == KeyMods::SHIFT { KeyMods::empty() } else { mods };
            KeyEvent::new(KeyCode::Char(c), Some(KeyPayload::Scalar(c)), mods)
        }
        CtKey::Enter => KeyEvent::new(KeyCode::Enter, None, mods),
        CtKey::Esc => KeyEvent::new(KeyCode::Esc, None, mods),
        CtKey::Backspace => KeyEvent::new(KeyCode::Backspace, None, mods),
        CtKey::Delete => KeyEvent::new(KeyCode::Delete, None, mods),
        CtKey::Tab => KeyEvent::new(KeyCode::Tab, None, mods),
        CtKey::BackTab => KeyEvent::new(KeyCode::Tab, None, mods | KeyMods::SHIFT),
        CtKey::Up => KeyEvent::new(KeyCode::Up, None, mods),
        CtKey::Down => KeyEvent::new(KeyCode::Down, None, mods),
        CtKey::Left => KeyEvent::new(KeyCode::Left, None, mods),
        CtKey::Right => KeyEvent::new(KeyCode::Right, None, mods),
        CtKey::Home => KeyEvent::new(KeyCode::Home, None, mods),
        CtKey::End => KeyEvent::new(KeyCode::End, None, mods),
        CtKey::PageUp => KeyEvent::new(KeyCode::PageUp, None, mods),
        CtKey::PageDown => KeyEvent::new(KeyCode::PageDown, None, mods),
        CtKey::Insert => KeyEvent::new(KeyCode::Insert, None, mods),
        CtKey::F(n) => KeyEvent::new(KeyCode::F(n), None, mods),
        _ => return None,
    };
    Some(ev)
}

fn map_pointer(ev: crossterm::event::MouseEvent) -> Option<PointerEvent> {
    let (button, action) = match ev.kind {
        MouseEventKind::Down(b) => (map_button(b), PointerAction::Press),
        MouseEventKind::Up(b) => (map_button(b), PointerAction::Release),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => {
            (PointerButton::None, PointerAction::Move)
        }
        MouseEventKind::ScrollUp => (PointerButton::None, PointerAction::WheelUp),
        MouseEventKind::ScrollDown => (PointerButton::None, PointerAction::WheelDown),
        _ => return None,
    };
    Some(PointerEvent {
        button,
        action,
        col: ev.column,
        row: ev.row,
    })
}

fn map_button(b: MouseButton) -> PointerButton {
    match b {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Right,
    }
}

/// Spawn the listener thread. It winds down when `stop` is set or the
/// reader side of the channel is gone.
pub fn spawn(tx: InputSender, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        debug!(target: "input.listener", "listener_start");
        while !stop.load(Ordering::Relaxed) {
            match poll(POLL_TIMEOUT) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!(target: "input.listener", error = %e, "poll_failed");
                    break;
                }
            }
            let event = match read() {
                Ok(ev) => ev,
                Err(e) => {
                    warn!(target: "input.listener", error = %e, "read_failed");
                    break;
                }
            };
            let delivered = match event {
                CtEvent::Key(k) if k.kind != KeyEventKind::Release => {
                    match map_key(k.code, map_mods(k.modifiers)) {
                        Some(ev) => tx.send_key(ev),
                        None => true,
                    }
                }
                CtEvent::Mouse(m) => match map_pointer(m) {
                    Some(ev) => tx.send_pointer(ev),
                    None => true,
                },
                CtEvent::Resize(w, h) => {
                    trace!(target: "input.listener", w, h, "resize_observed");
                    true
                }
                _ => true,
            };
            if !delivered {
                debug!(target: "input.listener", "reader_gone");
                break;
            }
        }
        debug!(target: "input.listener", "listener_stop");
    })
}
