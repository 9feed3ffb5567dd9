//! Configuration loading and parsing for the demo binary.
//!
//! Parses `quill.toml` — `[reader]` margins, mask character, tab width,
//! history policy — discovered in the working directory first, then the
//! platform config dir. Unknown fields are ignored (TOML deserialization
//! tolerance) and a parse failure falls back to defaults rather than
//! refusing to start. Margins are clamped against the live viewport via
//! `apply_context` so a narrow terminal can never end up with zero
//! usable columns; the raw parsed values are retained for re-clamping
//! after a resize.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigContext {
    pub viewport_columns: u16,
    pub viewport_rows: u16,
}

impl ConfigContext {
    pub fn new(viewport_columns: u16, viewport_rows: u16) -> Self {
        Self {
            viewport_columns,
            viewport_rows,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReaderConfig {
    #[serde(default)]
    pub left_margin: u16,
    #[serde(default)]
    pub right_margin: u16,
    #[serde(default = "ReaderConfig::default_mask")]
    pub mask_char: String,
    #[serde(default = "ReaderConfig::default_tab_width")]
    pub tab_width: usize,
    #[serde(default = "ReaderConfig::default_history_dedup")]
    pub history_dedup: bool,
    #[serde(default)]
    pub one_line_wrap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            left_margin: 0,
            right_margin: 0,
            mask_char: Self::default_mask(),
            tab_width: Self::default_tab_width(),
            history_dedup: Self::default_history_dedup(),
            one_line_wrap: false,
        }
    }
}

impl ReaderConfig {
    fn default_mask() -> String {
        "*".to_string()
    }
    const fn default_tab_width() -> usize {
        4
    }
    const fn default_history_dedup() -> bool {
        true
    }

    /// First scalar of the configured mask string ('*' when empty).
    pub fn mask_scalar(&self) -> char {
        self.mask_char.chars().next().unwrap_or('*')
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub reader: ReaderConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
    pub effective_left_margin: u16,
    pub effective_right_margin: u16,
}

/// Best-effort config path: working directory first, then the platform
/// config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("quill.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("quill").join("quill.toml");
    }
    PathBuf::from("quill.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "config_loaded");
                Ok(Config {
                    file,
                    effective_left_margin: 0,
                    effective_right_margin: 0,
                })
            }
            Err(e) => {
                info!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Clamp margins against the viewport: together they may never
    /// consume more than half the columns each, and at least two usable
    /// columns always remain.
    pub fn apply_context(&mut self, ctx: ConfigContext) -> (u16, u16) {
        let max_each = ctx.viewport_columns.saturating_sub(2) / 2;
        let left = self.file.reader.left_margin.min(max_each);
        let right = self.file.reader.right_margin.min(max_each);
        if left != self.file.reader.left_margin || right != self.file.reader.right_margin {
            info!(
                target: "config",
                raw_left = self.file.reader.left_margin,
                raw_right = self.file.reader.right_margin,
                left,
                right,
                viewport_columns = ctx.viewport_columns,
                "margins_clamped"
            );
        }
        self.effective_left_margin = left;
        self.effective_right_margin = right;
        (left, right)
    }

    /// Re-clamp after a viewport change. Returns `Some` when the
    /// effective values changed.
    pub fn recompute_with_context(&mut self, ctx: ConfigContext) -> Option<(u16, u16)> {
        let prev = (self.effective_left_margin, self.effective_right_margin);
        let current = self.apply_context(ctx);
        (current != prev).then_some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_from(Some(PathBuf::from("/nonexistent/quill.toml"))).unwrap();
        assert_eq!(cfg.file.reader.tab_width, 4);
        assert!(cfg.file.reader.history_dedup);
        assert_eq!(cfg.file.reader.mask_scalar(), '*');
    }

    #[test]
    fn parses_reader_table() {
        let (_dir, path) = write_config(
            r##"
[reader]
left_margin = 2
right_margin = 3
mask_char = "#"
tab_width = 8
history_dedup = false
"##,
        );
        let cfg = load_from(Some(path)).unwrap();
        assert_eq!(cfg.file.reader.left_margin, 2);
        assert_eq!(cfg.file.reader.right_margin, 3);
        assert_eq!(cfg.file.reader.mask_scalar(), '#');
        assert_eq!(cfg.file.reader.tab_width, 8);
        assert!(!cfg.file.reader.history_dedup);
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let (_dir, path) = write_config(
            r#"
[reader]
tab_width = 2
future_knob = "yes"

[colors]
theme = "solar"
"#,
        );
        let cfg = load_from(Some(path)).unwrap();
        assert_eq!(cfg.file.reader.tab_width, 2);
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let (_dir, path) = write_config("[reader\ntab_width = oops");
        let cfg = load_from(Some(path)).unwrap();
        assert_eq!(cfg.file.reader.tab_width, 4);
    }

    #[test]
    fn margins_clamp_to_viewport() {
        let (_dir, path) = write_config(
            r#"
[reader]
left_margin = 50
right_margin = 50
"#,
        );
        let mut cfg = load_from(Some(path)).unwrap();
        let (l, r) = cfg.apply_context(ConfigContext::new(20, 24));
        assert_eq!((l, r), (9, 9));
    }

    #[test]
    fn recompute_reports_changes_only() {
        let (_dir, path) = write_config("[reader]\nleft_margin = 4\n");
        let mut cfg = load_from(Some(path)).unwrap();
        cfg.apply_context(ConfigContext::new(80, 24));
        assert_eq!(cfg.recompute_with_context(ConfigContext::new(80, 24)), None);
        assert_eq!(
            cfg.recompute_with_context(ConfigContext::new(6, 24)),
            Some((2, 0))
        );
    }
}
