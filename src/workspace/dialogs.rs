//! ダイアログ抽象
//!
//! ファイル選択や保存確認などの対話をワークスペースから切り離す。
//! 端末UIではプロンプトで答えを集めてから `PresetDialogs` で再実行する。

use std::collections::VecDeque;
use std::path::PathBuf;

/// 変更ありタブを閉じるときの選択
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// ワークスペースが必要とする対話操作
pub trait Dialogs {
    /// 開くファイルを選ぶ（キャンセルは `None`）
    fn open_path(&mut self) -> Option<PathBuf>;

    /// 保存先を選ぶ（`suggested` は現在の表示名）
    fn save_path(&mut self, suggested: &str) -> Option<PathBuf>;

    /// 変更ありドキュメントを閉じる前の確認
    fn confirm_close(&mut self, name: &str) -> CloseChoice;

    /// はい / いいえ の確認（一括置換など）
    fn confirm(&mut self, question: &str) -> bool;
}

/// すべての対話をキャンセル扱いにする
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDialogs;

impl Dialogs for NoDialogs {
    fn open_path(&mut self) -> Option<PathBuf> {
        None
    }

    fn save_path(&mut self, _suggested: &str) -> Option<PathBuf> {
        None
    }

    fn confirm_close(&mut self, _name: &str) -> CloseChoice {
        CloseChoice::Cancel
    }

    fn confirm(&mut self, _question: &str) -> bool {
        false
    }
}

/// 事前に用意した回答を順に返す
///
/// 回答が尽きた問い合わせは記録され、UI側が追加で尋ねる対象になる。
#[derive(Debug, Clone, Default)]
pub struct PresetDialogs {
    open_paths: VecDeque<PathBuf>,
    save_paths: VecDeque<PathBuf>,
    close_choices: VecDeque<CloseChoice>,
    confirmations: VecDeque<bool>,
    unanswered: Option<DialogRequest>,
}

/// 回答が用意されていなかった問い合わせ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogRequest {
    OpenPath,
    SavePath { suggested: String },
    ConfirmClose { name: String },
    Confirm { question: String },
}

impl PresetDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_paths.push_back(path.into());
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_paths.push_back(path.into());
        self
    }

    pub fn with_close_choice(mut self, choice: CloseChoice) -> Self {
        self.close_choices.push_back(choice);
        self
    }

    pub fn with_confirmation(mut self, accepted: bool) -> Self {
        self.confirmations.push_back(accepted);
        self
    }

    /// 最初に回答できなかった問い合わせ
    pub fn unanswered(&self) -> Option<&DialogRequest> {
        self.unanswered.as_ref()
    }

    fn note_unanswered(&mut self, request: DialogRequest) {
        if self.unanswered.is_none() {
            self.unanswered = Some(request);
        }
    }
}

impl Dialogs for PresetDialogs {
    fn open_path(&mut self) -> Option<PathBuf> {
        let answer = self.open_paths.pop_front();
        if answer.is_none() {
            self.note_unanswered(DialogRequest::OpenPath);
        }
        answer
    }

    fn save_path(&mut self, suggested: &str) -> Option<PathBuf> {
        let answer = self.save_paths.pop_front();
        if answer.is_none() {
            self.note_unanswered(DialogRequest::SavePath {
                suggested: suggested.to_string(),
            });
        }
        answer
    }

    fn confirm_close(&mut self, name: &str) -> CloseChoice {
        match self.close_choices.pop_front() {
            Some(choice) => choice,
            None => {
                self.note_unanswered(DialogRequest::ConfirmClose {
                    name: name.to_string(),
                });
                CloseChoice::Cancel
            }
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        match self.confirmations.pop_front() {
            Some(accepted) => accepted,
            None => {
                self.note_unanswered(DialogRequest::Confirm {
                    question: question.to_string(),
                });
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_is_recorded_when_missing() {
        let mut dialogs = PresetDialogs::new().with_confirmation(true);
        assert!(dialogs.confirm("Replace all 2 occurrences?"));
        assert!(!dialogs.confirm("Replace all 2 occurrences?"));
        assert_eq!(
            dialogs.unanswered(),
            Some(&DialogRequest::Confirm {
                question: "Replace all 2 occurrences?".to_string()
            })
        );
        assert!(!NoDialogs.confirm("anything"));
    }

    #[test]
    fn preset_answers_in_order_then_records_request() {
        let mut dialogs = PresetDialogs::new()
            .with_close_choice(CloseChoice::Discard)
            .with_save_path("/tmp/out.txt");

        assert_eq!(dialogs.confirm_close("a.txt"), CloseChoice::Discard);
        assert_eq!(dialogs.save_path("a.txt"), Some(PathBuf::from("/tmp/out.txt")));
        assert_eq!(dialogs.confirm_close("b.txt"), CloseChoice::Cancel);
        assert_eq!(dialogs.save_path("c.txt"), None);

        assert_eq!(
            dialogs.unanswered(),
            Some(&DialogRequest::ConfirmClose { name: "b.txt".to_string() })
        );
    }

    #[test]
    fn no_dialogs_cancels() {
        let mut dialogs = NoDialogs;
        assert_eq!(dialogs.open_path(), None);
        assert_eq!(dialogs.confirm_close("x"), CloseChoice::Cancel);
    }
}
