//! Binding dispatch: maps a physical key or pointer event to an editing
//! action.
//!
//! Design principles:
//! - Matching is exact multi-field equality over the
//!   `(key code, produced char, modifiers)` triple — a binding for Ctrl+D
//!   never matches plain D. No pattern or wildcard matching.
//! - Bindings are independent implementations of one capability; none
//!   holds a reference to another.
//! - Registration conflicts are configuration errors surfaced to the
//!   integrator before the read loop starts, never runtime faults during
//!   reading: a duplicate key-set replaces the holder only when the
//!   holder opted in via `is_overridable`.
//! - Dispatch returns the first registered match; a miss falls back to
//!   the caller's default (self-insert for printable payloads).

use anyhow::Result;
use smallvec::SmallVec;
use tracing::{debug, trace};

use core_events::{InputSource, KeyEvent, KeyMods, KeyPayload, KeyCode, PointerAction, PointerButton, PointerEvent};
use core_state::ReaderState;
use core_terminal::Renderer;

/// One key pattern a binding claims: logical code, produced character
/// (None for non-printable keys), and modifier set. All three fields must
/// match the incoming event exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub code: KeyCode,
    pub ch: Option<char>,
    pub mods: KeyMods,
}

impl KeySpec {
    pub const fn new(code: KeyCode, ch: Option<char>, mods: KeyMods) -> Self {
        Self { code, ch, mods }
    }

    /// Shorthand for a bare non-printable key.
    pub const fn coded(code: KeyCode) -> Self {
        Self {
            code,
            ch: None,
            mods: KeyMods::empty(),
        }
    }

    /// Shorthand for a printable character chord.
    pub const fn chord(c: char, mods: KeyMods) -> Self {
        Self {
            code: KeyCode::Char(c),
            ch: Some(c),
            mods,
        }
    }

    pub fn matches(&self, ev: &KeyEvent) -> bool {
        if self.code != ev.code || self.mods != ev.mods {
            return false;
        }
        match (self.ch, ev.ch) {
            (None, None) => true,
            (Some(want), Some(KeyPayload::Scalar(got))) => want == got,
            // UTF-16 halves never match a spec; they belong to the
            // self-insert fallback.
            _ => false,
        }
    }
}

/// One pointer pattern a binding claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSpec {
    pub button: PointerButton,
    pub action: PointerAction,
}

impl PointerSpec {
    pub const fn new(button: PointerButton, action: PointerAction) -> Self {
        Self { button, action }
    }

    pub fn matches(&self, ev: &PointerEvent) -> bool {
        self.button == ev.button && self.action == ev.action
    }
}

/// The collaborators an action may touch while running: the renderer for
/// redraws and the input source for synchronous drains (surrogate
/// completion). Actions never reach the terminal any other way.
pub struct ReaderCtx<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub input: &'a mut dyn InputSource,
}

/// The single capability every binding implements.
pub trait Binding {
    /// Stable identifier used in logs and registration diagnostics.
    fn name(&self) -> &'static str;
    fn bound_keys(&self) -> &[KeySpec];
    fn pointer_keys(&self) -> &[PointerSpec] {
        &[]
    }
    /// A successful match terminates the read loop.
    fn is_exit(&self) -> bool {
        false
    }
    /// A later registration with the identical key-set may replace this
    /// binding.
    fn is_overridable(&self) -> bool {
        false
    }
    fn run(&self, state: &mut ReaderState, ctx: &mut ReaderCtx<'_>) -> Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("key set already claimed by non-overridable binding `{existing}`")]
    KeyClaimed { existing: &'static str },
}

struct Registered {
    keys: SmallVec<[KeySpec; 3]>,
    pointers: SmallVec<[PointerSpec; 2]>,
    binding: Box<dyn Binding>,
}

/// Ordered collection of bindings with override/fallback semantics.
#[derive(Default)]
pub struct BindingRegistry {
    bindings: Vec<Registered>,
}

fn same_key_set(a: &[KeySpec], b: &[KeySpec]) -> bool {
    a.len() == b.len() && a.iter().all(|k| b.contains(k))
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding. An identical key-set replaces the existing
    /// holder iff that holder is overridable; otherwise the duplicate is
    /// rejected before the read loop ever runs.
    pub fn register(&mut self, binding: Box<dyn Binding>) -> Result<(), KeymapError> {
        let keys: SmallVec<[KeySpec; 3]> = SmallVec::from_slice(binding.bound_keys());
        let pointers: SmallVec<[PointerSpec; 2]> = SmallVec::from_slice(binding.pointer_keys());
        if !keys.is_empty()
            && let Some(slot) = self
                .bindings
                .iter_mut()
                .find(|r| same_key_set(&r.keys, &keys))
        {
            if !slot.binding.is_overridable() {
                return Err(KeymapError::KeyClaimed {
                    existing: slot.binding.name(),
                });
            }
            debug!(
                target: "reader.keymap",
                replaced = slot.binding.name(),
                with = binding.name(),
                "binding_overridden"
            );
            *slot = Registered {
                keys,
                pointers,
                binding,
            };
            return Ok(());
        }
        debug!(target: "reader.keymap", name = binding.name(), keys = keys.len(), "binding_registered");
        self.bindings.push(Registered {
            keys,
            pointers,
            binding,
        });
        Ok(())
    }

    /// First registered binding whose key-set matches the event exactly.
    pub fn dispatch_key(&self, ev: &KeyEvent) -> Option<&dyn Binding> {
        for reg in &self.bindings {
            if reg.keys.iter().any(|k| k.matches(ev)) {
                trace!(target: "reader.keymap", binding = reg.binding.name(), "key_dispatch");
                return Some(reg.binding.as_ref());
            }
        }
        None
    }

    /// First registered binding whose pointer patterns match the event.
    pub fn dispatch_pointer(&self, ev: &PointerEvent) -> Option<&dyn Binding> {
        for reg in &self.bindings {
            if reg.pointers.iter().any(|p| p.matches(ev)) {
                trace!(target: "reader.keymap", binding = reg.binding.name(), "pointer_dispatch");
                return Some(reg.binding.as_ref());
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Probe {
        name: &'static str,
        keys: Vec<KeySpec>,
        overridable: bool,
    }

    impl Binding for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn bound_keys(&self) -> &[KeySpec] {
            &self.keys
        }
        fn is_overridable(&self) -> bool {
            self.overridable
        }
        fn run(&self, _state: &mut ReaderState, _ctx: &mut ReaderCtx<'_>) -> Result<()> {
            Ok(())
        }
    }

    fn probe(name: &'static str, keys: Vec<KeySpec>, overridable: bool) -> Box<Probe> {
        Box::new(Probe {
            name,
            keys,
            overridable,
        })
    }

    #[test]
    fn exact_triple_match_required() {
        let mut reg = BindingRegistry::new();
        reg.register(probe(
            "ctrl-d",
            vec![KeySpec::chord('d', KeyMods::CTRL)],
            false,
        ))
        .unwrap();

        let ctrl_d = KeyEvent::new(
            KeyCode::Char('d'),
            Some(KeyPayload::Scalar('d')),
            KeyMods::CTRL,
        );
        let plain_d = KeyEvent::printable('d');
        assert!(reg.dispatch_key(&ctrl_d).is_some());
        assert!(reg.dispatch_key(&plain_d).is_none());
    }

    #[test]
    fn duplicate_non_overridable_rejected() {
        let mut reg = BindingRegistry::new();
        let keys = vec![KeySpec::coded(KeyCode::Enter)];
        reg.register(probe("submit", keys.clone(), false)).unwrap();
        let err = reg
            .register(probe("submit2", keys, false))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "key set already claimed by non-overridable binding `submit`"
        );
    }

    #[test]
    fn overridable_binding_is_replaced() {
        let mut reg = BindingRegistry::new();
        let keys = vec![KeySpec::coded(KeyCode::Tab)];
        reg.register(probe("first", keys.clone(), true)).unwrap();
        reg.register(probe("second", keys, false)).unwrap();
        assert_eq!(reg.len(), 1);
        let ev = KeyEvent::coded(KeyCode::Tab);
        assert_eq!(reg.dispatch_key(&ev).unwrap().name(), "second");
    }

    #[test]
    fn partial_overlap_is_not_a_duplicate() {
        let mut reg = BindingRegistry::new();
        reg.register(probe(
            "two-keys",
            vec![
                KeySpec::coded(KeyCode::Backspace),
                KeySpec::coded(KeyCode::Delete),
            ],
            false,
        ))
        .unwrap();
        // Shares one key but not the whole set: first registration wins
        // at dispatch time.
        reg.register(probe("one-key", vec![KeySpec::coded(KeyCode::Delete)], false))
            .unwrap();
        let ev = KeyEvent::coded(KeyCode::Delete);
        assert_eq!(reg.dispatch_key(&ev).unwrap().name(), "two-keys");
    }

    #[test]
    fn unmatched_event_returns_none() {
        let reg = BindingRegistry::new();
        assert!(reg.dispatch_key(&KeyEvent::printable('x')).is_none());
    }

    #[test]
    fn utf16_half_never_matches_a_spec() {
        let mut reg = BindingRegistry::new();
        reg.register(probe(
            "replacement",
            vec![KeySpec::chord('\u{FFFD}', KeyMods::empty())],
            false,
        ))
        .unwrap();
        assert!(reg.dispatch_key(&KeyEvent::utf16(0xD83D)).is_none());
    }

    #[test]
    fn pointer_dispatch_matches_button_and_action() {
        struct Wheel;
        impl Binding for Wheel {
            fn name(&self) -> &'static str {
                "wheel"
            }
            fn bound_keys(&self) -> &[KeySpec] {
                &[]
            }
            fn pointer_keys(&self) -> &[PointerSpec] {
                const SPECS: [PointerSpec; 1] =
                    [PointerSpec::new(PointerButton::None, PointerAction::WheelUp)];
                &SPECS
            }
            fn run(&self, _s: &mut ReaderState, _c: &mut ReaderCtx<'_>) -> Result<()> {
                Ok(())
            }
        }
        let mut reg = BindingRegistry::new();
        reg.register(Box::new(Wheel)).unwrap();
        let up = PointerEvent {
            button: PointerButton::None,
            action: PointerAction::WheelUp,
            col: 0,
            row: 0,
        };
        let down = PointerEvent {
            action: PointerAction::WheelDown,
            ..up
        };
        assert!(reg.dispatch_pointer(&up).is_some());
        assert!(reg.dispatch_pointer(&down).is_none());
    }
}
