//! UIモジュール
//!
//! ratatuiベースのターミナルUI機能

pub mod layout;
pub mod prompt;
pub mod renderer;
pub mod theme;
pub mod viewport;

use crate::error::ErrorDisplay;
use crate::explorer::FileTree;
use crate::preview::MarkdownPreview;
use crate::search::{FindReplace, MultiFileSearch};
use crate::workspace::Workspace;

// 公開API
pub use layout::{compute_layout, LayoutFlags, ScreenLayout};
pub use prompt::{complete_path, Prompt, PromptKind, PromptResult};
pub use renderer::{
    build_line, display_column, status_position, window_title, Renderer, ScreenTarget, APP_NAME,
};
pub use theme::{ColorScheme, ComponentType, Theme};
pub use viewport::Viewport;

/// キー入力を受け取る領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    /// 検索バーの検索欄
    FindField,
    /// 検索バーの置換欄
    ReplaceField,
    Explorer,
    /// 複数ファイル検索の結果一覧
    SearchPanel,
}

/// 1フレームの描画に必要な状態
pub struct View<'a> {
    pub workspace: &'a Workspace,
    pub find: &'a FindReplace,
    pub search: &'a MultiFileSearch,
    pub preview: &'a mut MarkdownPreview,
    pub explorer: &'a mut FileTree,
    pub prompt: Option<&'a Prompt>,
    pub message: Option<&'a ErrorDisplay>,
    pub focus: Focus,
}
