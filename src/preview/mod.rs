//! Markdownプレビュー
//!
//! 現在のエディタの内容を右側ペインに表示する。スクロール位置は
//! カーソル位置の文書内比率に追従する。

pub mod markdown;

pub use markdown::{render_lines, scroll_ratio, stylesheet, to_html, PLACEHOLDER};

use crate::buffer::Document;
use crate::error::Result;
use crate::file::write_text_file;
use std::path::{Path, PathBuf};

/// プレビューペインの状態
#[derive(Debug, Clone)]
pub struct MarkdownPreview {
    visible: bool,
    scroll: u16,
}

impl Default for MarkdownPreview {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MarkdownPreview {
    pub fn new(visible: bool) -> Self {
        Self { visible, scroll: 0 }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// 描画行数と表示高さからスクロール位置を決める
    pub fn follow_cursor(&mut self, document: &Document, total_lines: usize, height: usize) {
        let ratio = scroll_ratio(document.cursor(), document.len_chars());
        let max = total_lines.saturating_sub(height);
        self.scroll = ((max as f64) * ratio).round().min(u16::MAX as f64) as u16;
    }

    /// `<file>.html` へ書き出して出力先を返す
    pub fn export_html(document: &Document, dark: bool, fallback_dir: &Path) -> Result<PathBuf> {
        let target = match document.path() {
            Some(path) => path.with_extension("html"),
            None => fallback_dir.join("untitled.html"),
        };
        write_text_file(&target, &to_html(document.text(), dark))?;
        log::info!("exported preview to {}", target.display());
        Ok(target)
    }
}
