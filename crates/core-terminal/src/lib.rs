//! Terminal backend abstraction: the renderer contract consumed by the
//! reader, a crossterm implementation, and a raw-mode RAII guard.
//!
//! The reader never formats color or styling; callers may embed escape
//! sequences in prompt text and the renderer writes them through verbatim.

use anyhow::Result;
use crossterm::{
    cursor::{MoveTo, position},
    execute,
    terminal::{SetTitle, disable_raw_mode, enable_raw_mode, size},
};
use std::io::{Write, stdout};

pub mod capture;
pub use capture::CaptureRenderer;

/// The rendering collaborator contract.
///
/// Cursor-position writes and text writes are issued as one uninterrupted
/// sequence per edit (set position, write, restore position); with a single
/// writer thread this is a rendering discipline, not a lock.
pub trait Renderer {
    fn set_cursor(&mut self, col: u16, row: u16) -> Result<()>;
    fn write_raw(&mut self, text: &str) -> Result<()>;
    /// Current cursor position as tracked by the terminal.
    fn cursor_pos(&mut self) -> Result<(u16, u16)>;
    /// (columns, rows) of the window.
    fn size(&self) -> Result<(u16, u16)>;
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
}

/// Raw-mode session over the process stdout. The reader runs inline (no
/// alternate screen): the prompt scrolls with the rest of the session.
pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring raw mode is restored even if the caller
/// early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    /// Enter raw mode and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

/// Crossterm-backed renderer writing to stdout.
#[derive(Default)]
pub struct CrosstermRenderer;

impl CrosstermRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for CrosstermRenderer {
    fn set_cursor(&mut self, col: u16, row: u16) -> Result<()> {
        execute!(stdout(), MoveTo(col, row))?;
        Ok(())
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        let mut out = stdout();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn cursor_pos(&mut self) -> Result<(u16, u16)> {
        Ok(position()?)
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(size()?)
    }
}
