//! textedit - split-pane plain-text editor
//!
//! タブ、分割ペイン、同一ファイルの同期表示、検索・置換、
//! 複数ファイル検索、Markdownプレビューを持つ端末エディタ。

// コアモジュール
pub mod app;
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;
pub mod file;

// ロジック層
pub mod input;
pub mod search;
pub mod workspace;

// 表示層
pub mod explorer;
pub mod preview;
pub mod ui;

// 公開API
pub use app::App;
pub use buffer::{Document, EditorId};
pub use config::EditorConfig;
pub use error::{Result, TextEditError};
pub use workspace::{PaneId, Workspace, WorkspaceEvent};
