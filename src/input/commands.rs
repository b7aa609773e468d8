//! コマンドシステム
//!
//! エディタコマンドの定義と実行結果

use crate::buffer::Motion;

/// コマンド実行の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// 実行が成功したか
    pub success: bool,
    /// 結果メッセージ
    pub message: Option<String>,
    /// 画面更新が必要か
    pub needs_refresh: bool,
    /// アプリケーションを終了するか
    pub should_quit: bool,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            needs_refresh: true,
            should_quit: false,
        }
    }

    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            needs_refresh: true,
            should_quit: false,
        }
    }

    pub fn quit() -> Self {
        Self {
            success: true,
            message: None,
            needs_refresh: false,
            should_quit: true,
        }
    }

    /// 何も起きなかった
    pub fn noop() -> Self {
        Self {
            success: false,
            message: None,
            needs_refresh: false,
            should_quit: false,
        }
    }
}

/// コマンドの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // 文字入力とカーソル移動
    InsertChar(char),
    InsertNewline,
    InsertTab,
    DeleteBackward,
    DeleteForward,
    MoveCursor { motion: Motion, extend: bool },
    PageUp { extend: bool },
    PageDown { extend: bool },
    Cancel,

    // ファイル
    NewFile,
    OpenFile,
    Save,
    SaveAs,
    CloseTab,
    CloseAll,
    Quit,

    // 編集
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    SelectWord,
    SelectLine,
    DuplicateLine,
    DeleteLine,
    MoveLineUp,
    MoveLineDown,

    // 検索
    Find,
    FindNext,
    FindPrevious,
    Replace,
    FindInFiles,
    GoToLine,

    // 表示
    TogglePreview,
    ExportPreview,
    ToggleExplorer,
    FocusExplorer,

    // 分割
    SplitRight,
    SplitDown,
    CloseSplit,
    FocusNextSplit,
    FocusPreviousSplit,
    EnlargeSplit,
    ShrinkSplit,
    BalanceSplits,

    // タブ
    NextTab,
    PreviousTab,

    About,

    // 未知のコマンド
    Unknown(String),
}

/// 名前で呼び出せるコマンド（キーバインド設定で使う）
static NAMED: &[(&str, Command)] = &[
    ("new", Command::NewFile),
    ("open", Command::OpenFile),
    ("save", Command::Save),
    ("save-as", Command::SaveAs),
    ("close-tab", Command::CloseTab),
    ("close-all", Command::CloseAll),
    ("quit", Command::Quit),
    ("undo", Command::Undo),
    ("redo", Command::Redo),
    ("cut", Command::Cut),
    ("copy", Command::Copy),
    ("paste", Command::Paste),
    ("select-all", Command::SelectAll),
    ("select-word", Command::SelectWord),
    ("select-line", Command::SelectLine),
    ("duplicate-line", Command::DuplicateLine),
    ("delete-line", Command::DeleteLine),
    ("move-line-up", Command::MoveLineUp),
    ("move-line-down", Command::MoveLineDown),
    ("find", Command::Find),
    ("find-next", Command::FindNext),
    ("find-previous", Command::FindPrevious),
    ("replace", Command::Replace),
    ("find-in-files", Command::FindInFiles),
    ("go-to-line", Command::GoToLine),
    ("toggle-preview", Command::TogglePreview),
    ("export-preview", Command::ExportPreview),
    ("toggle-explorer", Command::ToggleExplorer),
    ("focus-explorer", Command::FocusExplorer),
    ("split-right", Command::SplitRight),
    ("split-down", Command::SplitDown),
    ("close-split", Command::CloseSplit),
    ("focus-next-split", Command::FocusNextSplit),
    ("focus-previous-split", Command::FocusPreviousSplit),
    ("enlarge-split", Command::EnlargeSplit),
    ("shrink-split", Command::ShrinkSplit),
    ("balance-splits", Command::BalanceSplits),
    ("next-tab", Command::NextTab),
    ("previous-tab", Command::PreviousTab),
    ("about", Command::About),
    ("cancel", Command::Cancel),
];

impl Command {
    /// 文字列からコマンドを作成
    pub fn from_string(name: &str) -> Self {
        NAMED
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, command)| command.clone())
            .unwrap_or_else(|| Command::Unknown(name.to_string()))
    }

    /// コマンド名（入力系は固定名）
    pub fn name(&self) -> &str {
        if let Some((name, _)) = NAMED.iter().find(|(_, command)| command == self) {
            return name;
        }
        match self {
            Command::InsertChar(_) => "insert-char",
            Command::InsertNewline => "newline",
            Command::InsertTab => "insert-tab",
            Command::DeleteBackward => "delete-backward-char",
            Command::DeleteForward => "delete-char",
            Command::MoveCursor { .. } => "move-cursor",
            Command::PageUp { .. } => "page-up",
            Command::PageDown { .. } => "page-down",
            Command::Unknown(name) => name,
            _ => "unknown",
        }
    }

    /// 名前付きコマンドの一覧
    pub fn all_named() -> impl Iterator<Item = (&'static str, &'static Command)> {
        NAMED.iter().map(|(name, command)| (*name, command))
    }

    /// ドキュメントを書き換えるコマンドか
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Command::InsertChar(_)
                | Command::InsertNewline
                | Command::InsertTab
                | Command::DeleteBackward
                | Command::DeleteForward
                | Command::Undo
                | Command::Redo
                | Command::Cut
                | Command::Paste
                | Command::DuplicateLine
                | Command::DeleteLine
                | Command::MoveLineUp
                | Command::MoveLineDown
        )
    }

    /// コマンドの説明を取得
    pub fn description(&self) -> &'static str {
        match self {
            Command::InsertChar(_) => "文字を挿入",
            Command::InsertNewline => "改行を挿入",
            Command::InsertTab => "タブを挿入",
            Command::DeleteBackward => "前の文字を削除",
            Command::DeleteForward => "カーソル位置の文字を削除",
            Command::MoveCursor { .. } => "カーソルを移動",
            Command::PageUp { .. } => "1画面上へ",
            Command::PageDown { .. } => "1画面下へ",
            Command::Cancel => "操作をキャンセル",
            Command::NewFile => "新しいタブ",
            Command::OpenFile => "ファイルを開く",
            Command::Save => "保存",
            Command::SaveAs => "名前を付けて保存",
            Command::CloseTab => "タブを閉じる",
            Command::CloseAll => "すべてのタブを閉じる",
            Command::Quit => "終了",
            Command::Undo => "元に戻す",
            Command::Redo => "やり直し",
            Command::Cut => "切り取り",
            Command::Copy => "コピー",
            Command::Paste => "貼り付け",
            Command::SelectAll => "すべて選択",
            Command::SelectWord => "単語を選択",
            Command::SelectLine => "行を選択",
            Command::DuplicateLine => "行を複製",
            Command::DeleteLine => "行を削除",
            Command::MoveLineUp => "行を上へ移動",
            Command::MoveLineDown => "行を下へ移動",
            Command::Find => "検索",
            Command::FindNext => "次を検索",
            Command::FindPrevious => "前を検索",
            Command::Replace => "置換",
            Command::FindInFiles => "複数ファイルから検索",
            Command::GoToLine => "指定行へ移動",
            Command::TogglePreview => "Markdownプレビューの表示切替",
            Command::ExportPreview => "プレビューをHTMLに書き出し",
            Command::ToggleExplorer => "ファイルツリーの表示切替",
            Command::FocusExplorer => "ファイルツリーへフォーカス",
            Command::SplitRight => "右に分割",
            Command::SplitDown => "下に分割",
            Command::CloseSplit => "分割を閉じる",
            Command::FocusNextSplit => "次の分割へ",
            Command::FocusPreviousSplit => "前の分割へ",
            Command::EnlargeSplit => "分割を広げる",
            Command::ShrinkSplit => "分割を狭める",
            Command::BalanceSplits => "分割を均等にする",
            Command::NextTab => "次のタブ",
            Command::PreviousTab => "前のタブ",
            Command::About => "バージョン情報",
            Command::Unknown(_) => "不明なコマンド",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_and_name_agree() {
        for (name, command) in Command::all_named() {
            assert_eq!(&Command::from_string(name), command);
            assert_eq!(command.name(), name);
        }
        assert_eq!(
            Command::from_string("no-such-command"),
            Command::Unknown("no-such-command".to_string())
        );
        assert_eq!(Command::from_string("no-such-command").name(), "no-such-command");
    }

    #[test]
    fn input_commands_have_fixed_names() {
        assert_eq!(Command::InsertChar('a').name(), "insert-char");
        let motion = Command::MoveCursor {
            motion: Motion::Left,
            extend: true,
        };
        assert_eq!(motion.name(), "move-cursor");
        assert!(Command::InsertChar('a').is_edit());
        assert!(!motion.is_edit());
    }

    #[test]
    fn command_result_constructors() {
        let ok = CommandResult::success_with_message("saved");
        assert!(ok.success);
        assert_eq!(ok.message.as_deref(), Some("saved"));

        let err = CommandResult::error("failed");
        assert!(!err.success);

        assert!(CommandResult::quit().should_quit);
        assert!(!CommandResult::noop().needs_refresh);
    }
}
