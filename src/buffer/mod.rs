//! ドキュメント管理モジュール
//!
//! エディタ（タブ）1つ分のテキストと編集操作を提供する。

pub mod document;
pub mod history;
pub mod line_index;

pub use document::{Document, Motion, MODIFIED_MARKER, UNTITLED};
pub use history::{History, TextChange};
pub use line_index::LineIndex;

/// エディタID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub usize);

impl std::fmt::Display for EditorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// プロセス内クリップボード
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<String>,
}

impl Clipboard {
    pub fn set(&mut self, text: String) {
        self.content = Some(text);
    }

    pub fn get(&self) -> Option<&str> {
        self.content.as_deref()
    }
}
