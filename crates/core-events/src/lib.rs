//! Input event model and input-source contract for the reader.
//!
//! The reader consumes two event families through one narrow contract:
//! key presses and pointer activity. An `InputSource` exposes non-blocking
//! availability checks plus blocking reads used only after availability is
//! confirmed; the reader's spin-wait polls the checks (pointer first) and
//! never blocks on a read that could stall the loop.
//!
//! The default implementation is a pair of bounded crossbeam channels fed
//! by an external listener thread (the terminal-facing side lives in the
//! binary). Availability peeks the channel head, the blocking read drains
//! it; a disconnected channel surfaces as a collaborator failure, never
//! as a silent hang.
//!
//! Channel policy: bounded at `EVENT_CHANNEL_CAP` for memory safety and
//! natural producer backpressure. With a single producer (listener thread)
//! and single consumer (reader loop) latency stays low and event fidelity
//! is preferred over lossy drop strategies.

use std::cell::Cell;
use std::sync::atomic::AtomicU64;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

pub const EVENT_CHANNEL_CAP: usize = 1024;

// Telemetry: simple relaxed atomic counters inspectable from tests or
// periodic logging. Incremented on the consumer side.
pub static KEY_EVENTS_READ: AtomicU64 = AtomicU64::new(0);
pub static POINTER_EVENTS_READ: AtomicU64 = AtomicU64::new(0);
pub static INVALID_OPERATIONS: AtomicU64 = AtomicU64::new(0);
pub static SURROGATE_COMPLETIONS: AtomicU64 = AtomicU64::new(0);

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct KeyMods: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

/// Logical key identifier, independent of the produced character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
}

/// Character payload carried by a key press.
///
/// Most platforms deliver whole scalar values. Consoles that surface
/// UTF-16 units deliver an astral-plane character as two presses, each
/// carrying one surrogate half; those arrive as `Utf16` and are paired by
/// the insert action before anything reaches the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPayload {
    Scalar(char),
    Utf16(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    /// Produced character; `None` for non-printable keys.
    pub ch: Option<KeyPayload>,
    pub mods: KeyMods,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, ch: Option<KeyPayload>, mods: KeyMods) -> Self {
        Self { code, ch, mods }
    }

    /// A plain printable key press producing `c`.
    pub const fn printable(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            ch: Some(KeyPayload::Scalar(c)),
            mods: KeyMods::empty(),
        }
    }

    /// A key identified only by its code (Enter, arrows, ...).
    pub const fn coded(code: KeyCode) -> Self {
        Self {
            code,
            ch: None,
            mods: KeyMods::empty(),
        }
    }

    /// One UTF-16 code unit delivered on its own.
    pub const fn utf16(unit: u16) -> Self {
        Self {
            code: KeyCode::Char('\u{FFFD}'),
            ch: Some(KeyPayload::Utf16(unit)),
            mods: KeyMods::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    /// Wheel and motion events carry no button.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    Press,
    Release,
    Move,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerEvent {
    pub button: PointerButton,
    pub action: PointerAction,
    pub col: u16,
    pub row: u16,
}

/// The reader's view of the input collaborator.
///
/// Contract: the availability checks are cheap, non-blocking, and
/// side-effect-free; the blocking reads are called only after the matching
/// check returned true (the sole exception is the insert action's
/// surrogate drain, which re-confirms availability itself).
pub trait InputSource {
    fn key_available(&self) -> bool;
    fn pointer_available(&self) -> bool;
    fn read_key(&mut self) -> Result<KeyEvent>;
    fn read_pointer(&mut self) -> Result<PointerEvent>;
}

/// Producer half handed to the listener thread.
#[derive(Debug, Clone)]
pub struct InputSender {
    keys: Sender<KeyEvent>,
    pointers: Sender<PointerEvent>,
}

impl InputSender {
    /// Blocking send; parks the listener when the reader falls behind
    /// rather than dropping events. Returns false once the reader side is
    /// gone so the listener can wind down.
    pub fn send_key(&self, ev: KeyEvent) -> bool {
        self.keys.send(ev).is_ok()
    }

    pub fn send_pointer(&self, ev: PointerEvent) -> bool {
        self.pointers.send(ev).is_ok()
    }
}

/// Channel-backed `InputSource`.
///
/// Availability peeks one event into a slot so that a disconnected
/// listener still reports "available": the subsequent blocking read then
/// surfaces the failure instead of the spin-wait hanging forever.
pub struct ChannelInputSource {
    keys: Receiver<KeyEvent>,
    pointers: Receiver<PointerEvent>,
    peeked_key: Cell<Option<KeyEvent>>,
    peeked_pointer: Cell<Option<PointerEvent>>,
}

/// Create the listener/reader channel pair.
pub fn input_channel() -> (InputSender, ChannelInputSource) {
    let (key_tx, key_rx) = bounded(EVENT_CHANNEL_CAP);
    let (ptr_tx, ptr_rx) = bounded(EVENT_CHANNEL_CAP);
    (
        InputSender {
            keys: key_tx,
            pointers: ptr_tx,
        },
        ChannelInputSource {
            keys: key_rx,
            pointers: ptr_rx,
            peeked_key: Cell::new(None),
            peeked_pointer: Cell::new(None),
        },
    )
}

fn peek_available<T: Copy>(rx: &Receiver<T>, slot: &Cell<Option<T>>) -> bool {
    if slot.get().is_some() {
        return true;
    }
    match rx.try_recv() {
        Ok(ev) => {
            slot.set(Some(ev));
            true
        }
        Err(TryRecvError::Empty) => false,
        // Disconnection counts as available so the blocking read runs
        // and reports the failure.
        Err(TryRecvError::Disconnected) => true,
    }
}

impl InputSource for ChannelInputSource {
    fn key_available(&self) -> bool {
        peek_available(&self.keys, &self.peeked_key)
    }

    fn pointer_available(&self) -> bool {
        peek_available(&self.pointers, &self.peeked_pointer)
    }

    fn read_key(&mut self) -> Result<KeyEvent> {
        let ev = match self.peeked_key.take() {
            Some(ev) => ev,
            None => self
                .keys
                .recv()
                .context("input source disconnected while awaiting a key event")?,
        };
        KEY_EVENTS_READ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        tracing::trace!(target: "input.source", code = ?ev.code, mods = ?ev.mods, "key_read");
        Ok(ev)
    }

    fn read_pointer(&mut self) -> Result<PointerEvent> {
        let ev = match self.peeked_pointer.take() {
            Some(ev) => ev,
            None => self
                .pointers
                .recv()
                .context("input source disconnected while awaiting a pointer event")?,
        };
        POINTER_EVENTS_READ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        tracing::trace!(target: "input.source", action = ?ev.action, "pointer_read");
        Ok(ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_tracks_channel_state() {
        let (tx, src) = input_channel();
        assert!(!src.key_available());
        assert!(!src.pointer_available());
        assert!(tx.send_key(KeyEvent::printable('a')));
        assert!(src.key_available());
        assert!(!src.pointer_available());
    }

    #[test]
    fn read_returns_sent_event() {
        let (tx, mut src) = input_channel();
        tx.send_key(KeyEvent::printable('x'));
        let ev = src.read_key().unwrap();
        assert_eq!(ev.ch, Some(KeyPayload::Scalar('x')));
        assert_eq!(ev.mods, KeyMods::empty());
    }

    #[test]
    fn disconnected_channel_surfaces_as_error() {
        let (tx, mut src) = input_channel();
        drop(tx);
        assert!(src.read_key().is_err());
        assert!(src.read_pointer().is_err());
    }

    #[test]
    fn pointer_and_key_channels_are_independent() {
        let (tx, mut src) = input_channel();
        tx.send_pointer(PointerEvent {
            button: PointerButton::None,
            action: PointerAction::WheelUp,
            col: 0,
            row: 0,
        });
        tx.send_key(KeyEvent::coded(KeyCode::Enter));
        assert!(src.pointer_available());
        assert!(src.key_available());
        let p = src.read_pointer().unwrap();
        assert_eq!(p.action, PointerAction::WheelUp);
        let k = src.read_key().unwrap();
        assert_eq!(k.code, KeyCode::Enter);
    }
}
