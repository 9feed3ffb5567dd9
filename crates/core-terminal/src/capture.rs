//! Headless renderer simulating a fixed-size terminal.
//!
//! Used by embedders and by this workspace's own tests to drive the reader
//! without a tty. Models the two terminal behaviors the positioning engine
//! depends on: auto-wrap when a write passes the last column, and scrolling
//! when the cursor would pass the last row (tracked in `scrolled`).

use anyhow::Result;
use core_text::cell_width;

use crate::Renderer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    SetCursor(u16, u16),
    Write(String),
}

pub struct CaptureRenderer {
    width: u16,
    height: u16,
    col: u16,
    row: u16,
    /// Rows the virtual terminal scrolled up due to bottom overflow.
    pub scrolled: u16,
    pub ops: Vec<RenderOp>,
}

impl CaptureRenderer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            col: 0,
            row: 0,
            scrolled: 0,
            ops: Vec::new(),
        }
    }

    /// Every `Write` payload, in emission order.
    pub fn writes(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::Write(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Concatenation of all written text (cursor moves ignored).
    pub fn written(&self) -> String {
        self.writes().concat()
    }

    fn advance(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.col = 0;
                self.bump_row();
            }
            '\r' => self.col = 0,
            _ => {
                let w = cell_width(ch);
                if self.col + w > self.width {
                    self.col = 0;
                    self.bump_row();
                }
                self.col += w;
            }
        }
    }

    fn bump_row(&mut self) {
        if self.row + 1 >= self.height {
            self.scrolled += 1;
        } else {
            self.row += 1;
        }
    }
}

impl Renderer for CaptureRenderer {
    fn set_cursor(&mut self, col: u16, row: u16) -> Result<()> {
        self.col = col.min(self.width.saturating_sub(1));
        self.row = row.min(self.height.saturating_sub(1));
        self.ops.push(RenderOp::SetCursor(col, row));
        Ok(())
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            self.advance(ch);
        }
        self.ops.push(RenderOp::Write(text.to_string()));
        Ok(())
    }

    fn cursor_pos(&mut self) -> Result<(u16, u16)> {
        Ok((self.col, self.row))
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_advance_cursor_by_cells() {
        let mut r = CaptureRenderer::new(10, 5);
        r.write_raw("ab你").unwrap();
        assert_eq!(r.cursor_pos().unwrap(), (4, 0));
    }

    #[test]
    fn auto_wrap_at_last_column() {
        let mut r = CaptureRenderer::new(4, 5);
        r.write_raw("abcdef").unwrap();
        assert_eq!(r.cursor_pos().unwrap(), (2, 1));
    }

    #[test]
    fn newline_moves_to_line_start() {
        let mut r = CaptureRenderer::new(10, 5);
        r.write_raw("ab\r\ncd").unwrap();
        assert_eq!(r.cursor_pos().unwrap(), (2, 1));
    }

    #[test]
    fn bottom_overflow_counts_scroll() {
        let mut r = CaptureRenderer::new(4, 2);
        r.set_cursor(0, 1).unwrap();
        r.write_raw("abcdef").unwrap();
        assert_eq!(r.scrolled, 1);
        assert_eq!(r.cursor_pos().unwrap(), (2, 1));
    }
}
