//! The reader loop and its session container.
//!
//! `ReaderSession` owns the state that outlives a single read call —
//! history, the kill buffer, the binding registry, and the settings
//! template — with an explicit lifetime instead of module statics. Each
//! `read` moves that shared state into a fresh `ReaderState`, drives the
//! loop to an exit binding, and moves it back out, so it survives across
//! calls without ever being shared.
//!
//! Loop shape (`Ready → AwaitingInput → Dispatching → Exiting`): draw the
//! prompt once, then repeat: spin-wait for input (pointer availability
//! checked strictly before keyboard, so the two can never dispatch
//! simultaneously and ordering is deterministic), dispatch through the
//! registry, run the matched binding — or the self-insert fallback for
//! printable payloads — to completion, consume the per-iteration invalid
//! flag. Exactly one event is processed per iteration; nothing else can
//! mutate the state mid-render.
//!
//! Failure boundary: binding and collaborator errors propagate to the
//! `read` caller via `?`. The loop keeps its own state machine correct;
//! it does not paper over broken I/O.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, trace};

use core_actions::{SelfInsert, default_registry, redraw_full};
use core_events::InputSource;
use core_keymap::{Binding, BindingRegistry, KeymapError, ReaderCtx};
use core_state::{HISTORY_DETACHED, ReaderSettings, ReaderState};
use core_terminal::Renderer;
use core_text::ScreenPos;

/// Pause between availability polls: cooperative, not a busy loop.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What the spin-wait woke up for. Pointer beats key when both are
/// pending; the timeout variant only fires from `wait_input_deadline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Pointer,
    Key,
    TimedOut,
}

/// Block until a pointer or key event is available, pointer first.
pub fn wait_input(input: &dyn InputSource) -> WaitOutcome {
    loop {
        if input.pointer_available() {
            return WaitOutcome::Pointer;
        }
        if input.key_available() {
            return WaitOutcome::Key;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Spin-wait with a deadline, for embedders that poll a refresh interval.
/// Both availability checks and the deadline are evaluated in the same
/// round so neither side starves the other.
pub fn wait_input_deadline(input: &dyn InputSource, deadline: Instant) -> WaitOutcome {
    loop {
        if input.pointer_available() {
            return WaitOutcome::Pointer;
        }
        if input.key_available() {
            return WaitOutcome::Key;
        }
        if Instant::now() >= deadline {
            return WaitOutcome::TimedOut;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Per-read options layered over the session settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    pub password: bool,
    pub one_line_wrap: bool,
}

/// Owner of the reader's cross-call state.
pub struct ReaderSession {
    settings: ReaderSettings,
    registry: BindingRegistry,
    history: Vec<String>,
    kill_buffer: String,
}

impl ReaderSession {
    pub fn new(settings: ReaderSettings) -> Result<Self, KeymapError> {
        Ok(Self {
            settings,
            registry: default_registry()?,
            history: Vec::new(),
            kill_buffer: String::new(),
        })
    }

    /// Register an additional binding; conflicts surface here, before any
    /// read loop runs.
    pub fn register(&mut self, binding: Box<dyn Binding>) -> Result<(), KeymapError> {
        self.registry.register(binding)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Seed history (e.g. from an embedder-managed store).
    pub fn push_history(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    pub fn kill_buffer(&self) -> &str {
        &self.kill_buffer
    }

    /// Explicitly reset the cut/paste scratch storage; nothing else
    /// clears it for the lifetime of the session.
    pub fn clear_kill_buffer(&mut self) {
        self.kill_buffer.clear();
    }

    pub fn settings_mut(&mut self) -> &mut ReaderSettings {
        &mut self.settings
    }

    /// Read one line with the session defaults.
    pub fn read(
        &mut self,
        prompt: &str,
        renderer: &mut dyn Renderer,
        input: &mut dyn InputSource,
    ) -> Result<String> {
        self.read_with(prompt, renderer, input, ReadOptions::default())
    }

    /// Read one line with masked echo.
    pub fn read_password(
        &mut self,
        prompt: &str,
        renderer: &mut dyn Renderer,
        input: &mut dyn InputSource,
    ) -> Result<String> {
        self.read_with(
            prompt,
            renderer,
            input,
            ReadOptions {
                password: true,
                ..ReadOptions::default()
            },
        )
    }

    pub fn read_with(
        &mut self,
        prompt: &str,
        renderer: &mut dyn Renderer,
        input: &mut dyn InputSource,
        opts: ReadOptions,
    ) -> Result<String> {
        let mut state = ReaderState::new(prompt, self.settings.clone());
        state.password_mode = opts.password;
        state.one_line_wrap = opts.one_line_wrap;
        state.history = std::mem::take(&mut self.history);
        state.kill_buffer = std::mem::take(&mut self.kill_buffer);

        let result = drive(&mut state, &self.registry, renderer, input);

        // The shared state always returns to the session, even when the
        // loop surfaced a collaborator failure.
        self.history = std::mem::take(&mut state.history);
        self.kill_buffer = std::mem::take(&mut state.kill_buffer);

        let text = result?;
        if !state.canceled {
            self.append_history(&text);
            return Ok(text);
        }
        Ok(String::new())
    }

    /// Submission policy: never append empty input; suppress an exact
    /// duplicate of the newest entry when `history_dedup` is set.
    fn append_history(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.settings.history_dedup && self.history.last().is_some_and(|last| last == text) {
            debug!(target: "reader.history", "duplicate_submission_suppressed");
            return;
        }
        self.history.push(text.to_string());
    }
}

/// Run the loop to completion and return the final buffer text.
fn drive(
    state: &mut ReaderState,
    registry: &BindingRegistry,
    renderer: &mut dyn Renderer,
    input: &mut dyn InputSource,
) -> Result<String> {
    // Ready: the prompt starts wherever the cursor currently sits.
    let (col, row) = renderer.cursor_pos()?;
    state.prompt_start = ScreenPos::new(col, row);
    {
        let mut ctx = ReaderCtx { renderer: &mut *renderer, input: &mut *input };
        redraw_full(state, &mut ctx)?;
    }
    debug!(
        target: "reader.loop",
        origin_col = state.prompt_origin.col,
        origin_row = state.prompt_origin.row,
        "read_start"
    );

    let fallback = SelfInsert;
    while !state.exiting {
        // AwaitingInput: pointer checked strictly before keyboard.
        let outcome = wait_input(input);
        // Dispatching: one event, run to completion.
        let is_exit = match outcome {
            WaitOutcome::Pointer => {
                let ev = input.read_pointer()?;
                state.pointer = Some(ev);
                state.pressed = None;
                match registry.dispatch_pointer(&ev) {
                    Some(binding) => {
                        trace!(target: "reader.loop", binding = binding.name(), "pointer_action");
                        let mut ctx = ReaderCtx { renderer: &mut *renderer, input: &mut *input };
                        binding.run(state, &mut ctx)?;
                        binding.is_exit()
                    }
                    // Unclaimed pointer activity is silently ignored.
                    None => false,
                }
            }
            WaitOutcome::Key => {
                let ev = input.read_key()?;
                state.pressed = Some(ev);
                state.pointer = None;
                match registry.dispatch_key(&ev) {
                    Some(binding) => {
                        trace!(target: "reader.loop", binding = binding.name(), "key_action");
                        let mut ctx = ReaderCtx { renderer: &mut *renderer, input: &mut *input };
                        binding.run(state, &mut ctx)?;
                        binding.is_exit()
                    }
                    None if ev.ch.is_some() => {
                        // Default self-insert for printable payloads.
                        let mut ctx = ReaderCtx { renderer: &mut *renderer, input: &mut *input };
                        fallback.run(state, &mut ctx)?;
                        false
                    }
                    // Unbound non-printable keys are silently ignored.
                    None => false,
                }
            }
            WaitOutcome::TimedOut => false,
        };
        // Consume the per-iteration invalid flag; invisible to the user.
        if state.take_invalid() {
            trace!(target: "reader.loop", "iteration_invalidated");
        }
        if is_exit {
            state.exiting = true;
        }
    }

    // Exiting.
    state.history_pos = HISTORY_DETACHED;
    let text = state.buffer.text();
    debug!(target: "reader.loop", submitted_len = text.chars().count(), "read_end");
    Ok(text)
}
