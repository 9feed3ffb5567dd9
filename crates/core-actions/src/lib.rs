//! The concrete editing actions bound by the default keymap.
//!
//! Every binding here is an independent variant of the one capability in
//! `core-keymap`: consume the reader state, mutate it, and emit render
//! calls through the context. Bindings never talk to each other; shared
//! mechanics (redraws, cursor placement) live in `render`.
//!
//! Default key set:
//!
//! | binding              | keys                      | exit |
//! |----------------------|---------------------------|------|
//! | submit               | Enter                     | yes  |
//! | cancel               | Ctrl+C                    | yes  |
//! | rubout               | Backspace                 |      |
//! | delete               | Delete                    |      |
//! | move left/right      | Left / Right              |      |
//! | home / end           | Home / End                |      |
//! | history up/down      | Up / Down, wheel up/down  |      |
//! | cut word fwd/back    | Alt+D / Ctrl+W            |      |
//! | yank                 | Ctrl+Y                    |      |
//! | refresh              | Ctrl+L                    |      |
//! | show suggestions     | Tab (overridable)         |      |
//! | next/prev suggestion | Alt+N / Alt+P (overridable) |    |
//! | toggle replace       | Insert                    |      |
//!
//! Unbound printable keys fall back to `SelfInsert` (not registered; the
//! loop holds it directly).

use core_keymap::{BindingRegistry, KeymapError};

mod control;
mod erase;
mod history;
mod insert;
mod kill;
mod motion;
mod render;
mod suggestions;

pub use render::redraw_full;

pub use control::{Cancel, Refresh, Submit};
pub use erase::{DeleteChar, Rubout};
pub use history::{HistoryDown, HistoryUp};
pub use insert::SelfInsert;
pub use kill::{CutBackwardWord, CutForwardWord, Yank};
pub use motion::{End, Home, MoveLeft, MoveRight, ToggleReplace};
pub use suggestions::{NextSuggestion, PreviousSuggestion, ShowSuggestions};

/// Build the default binding registry. Embedders may register further
/// bindings afterwards; conflicts surface as `KeymapError` here, before
/// any read loop runs.
pub fn default_registry() -> Result<BindingRegistry, KeymapError> {
    let mut reg = BindingRegistry::new();
    reg.register(Box::new(Submit))?;
    reg.register(Box::new(Cancel))?;
    reg.register(Box::new(Rubout))?;
    reg.register(Box::new(DeleteChar))?;
    reg.register(Box::new(MoveLeft))?;
    reg.register(Box::new(MoveRight))?;
    reg.register(Box::new(Home))?;
    reg.register(Box::new(End))?;
    reg.register(Box::new(HistoryUp))?;
    reg.register(Box::new(HistoryDown))?;
    reg.register(Box::new(CutForwardWord))?;
    reg.register(Box::new(CutBackwardWord))?;
    reg.register(Box::new(Yank))?;
    reg.register(Box::new(Refresh))?;
    reg.register(Box::new(ShowSuggestions))?;
    reg.register(Box::new(NextSuggestion))?;
    reg.register(Box::new(PreviousSuggestion))?;
    reg.register(Box::new(ToggleReplace))?;
    Ok(reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_builds_cleanly() {
        let reg = default_registry().unwrap();
        assert_eq!(reg.len(), 18);
    }
}
