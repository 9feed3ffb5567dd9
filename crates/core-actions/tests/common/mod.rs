//! Shared harness: a reader state wired to a capture renderer and a
//! channel input source, driven binding-by-binding.
#![allow(dead_code)] // not every scenario file uses every helper

use core_events::{ChannelInputSource, InputSender, KeyEvent, input_channel};
use core_keymap::{Binding, ReaderCtx};
use core_state::{ReaderSettings, ReaderState};
use core_terminal::{CaptureRenderer, Renderer};

pub struct Harness {
    pub renderer: CaptureRenderer,
    pub input: ChannelInputSource,
    pub tx: InputSender,
    pub state: ReaderState,
}

impl Harness {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_settings(width, height, ReaderSettings::default())
    }

    pub fn with_settings(width: u16, height: u16, settings: ReaderSettings) -> Self {
        let (tx, input) = input_channel();
        Self {
            renderer: CaptureRenderer::new(width, height),
            input,
            tx,
            state: ReaderState::new("> ", settings),
        }
    }

    /// Run `binding` as if dispatched for `ev`.
    pub fn press(&mut self, binding: &dyn Binding, ev: KeyEvent) {
        self.state.pressed = Some(ev);
        let mut ctx = ReaderCtx {
            renderer: &mut self.renderer,
            input: &mut self.input,
        };
        binding.run(&mut self.state, &mut ctx).unwrap();
    }

    /// Run a binding that ignores the pressed key (motions, history).
    pub fn run(&mut self, binding: &dyn Binding) {
        let mut ctx = ReaderCtx {
            renderer: &mut self.renderer,
            input: &mut self.input,
        };
        binding.run(&mut self.state, &mut ctx).unwrap();
    }

    /// Type a string through the self-insert fallback.
    pub fn type_str(&mut self, text: &str) {
        let insert = core_actions::SelfInsert;
        for c in text.chars() {
            self.press(&insert, KeyEvent::printable(c));
        }
    }

    pub fn seed_text(&mut self, text: &str) {
        self.state.replace_buffer(text);
        let vp = core_layout::Viewport::new(
            self.renderer.size().unwrap().0,
            self.renderer.size().unwrap().1,
        );
        core_layout::reposition(&mut self.state, vp);
    }
}
