//! 編集履歴（Undo/Redo）
//!
//! 各変更は「範囲の置換」として記録する。保存時点を覚えておき、
//! Undo/Redo 後に変更フラグを正しく復元する。

/// 1回分のテキスト置換
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// 置換開始位置（文字インデックス）
    pub start: usize,
    /// 削除された文字列
    pub removed: String,
    /// 挿入された文字列
    pub inserted: String,
}

impl TextChange {
    pub fn new(start: usize, removed: impl Into<String>, inserted: impl Into<String>) -> Self {
        Self {
            start,
            removed: removed.into(),
            inserted: inserted.into(),
        }
    }

    /// 逆操作
    pub fn inverted(&self) -> TextChange {
        TextChange {
            start: self.start,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
        }
    }

    /// 挿入後の終端位置
    pub fn inserted_end(&self) -> usize {
        self.start + self.inserted.chars().count()
    }

    /// 削除範囲の終端位置
    pub fn removed_end(&self) -> usize {
        self.start + self.removed.chars().count()
    }
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    change: TextChange,
    cursor_before: usize,
    /// 連続入力として結合可能か
    mergeable: bool,
}

/// Undo/Redo スタック
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    /// 保存時点のUndoスタック長
    clean: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            clean: Some(0),
        }
    }

    /// 変更を記録する
    ///
    /// `mergeable` な単一文字挿入は直前の挿入と結合される。
    pub fn record(&mut self, change: TextChange, cursor_before: usize, mergeable: bool) {
        if self.clean.is_some_and(|clean| clean > self.undo.len()) {
            self.clean = None;
        }
        self.redo.clear();

        let at_clean_point = self.clean == Some(self.undo.len());
        if mergeable && !at_clean_point {
            if let Some(last) = self.undo.last_mut() {
                if last.mergeable
                    && last.change.removed.is_empty()
                    && change.removed.is_empty()
                    && last.change.inserted_end() == change.start
                {
                    last.change.inserted.push_str(&change.inserted);
                    return;
                }
            }
        }

        self.undo.push(HistoryEntry {
            change,
            cursor_before,
            mergeable,
        });
    }

    /// Undo 対象の変更を取り出す（戻り値は適用すべき逆変更と復元カーソル）
    pub fn undo(&mut self) -> Option<(TextChange, usize)> {
        let entry = self.undo.pop()?;
        let inverse = entry.change.inverted();
        let cursor = entry.cursor_before;
        self.redo.push(HistoryEntry {
            mergeable: false,
            ..entry
        });
        Some((inverse, cursor))
    }

    /// Redo 対象の変更を取り出す（戻り値は適用すべき変更と復元カーソル）
    pub fn redo(&mut self) -> Option<(TextChange, usize)> {
        let entry = self.redo.pop()?;
        let change = entry.change.clone();
        let cursor = change.inserted_end();
        self.undo.push(entry);
        Some((change, cursor))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// 現在位置を保存時点として記録
    pub fn mark_clean(&mut self) {
        self.clean = Some(self.undo.len());
    }

    /// 保存時点を失わせる（Undo で未変更に戻らなくなる）
    pub fn mark_dirty(&mut self) {
        self.clean = None;
    }

    /// 保存時点と一致しているか
    pub fn is_clean(&self) -> bool {
        self.clean == Some(self.undo.len())
    }

    /// 履歴を全て破棄
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.clean = Some(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_inserts_merge() {
        let mut history = History::new();
        history.mark_clean();
        history.record(TextChange::new(0, "", "a"), 0, true);
        history.record(TextChange::new(1, "", "b"), 1, true);
        history.record(TextChange::new(2, "", "c"), 2, true);

        let (inverse, cursor) = history.undo().unwrap();
        assert_eq!(inverse, TextChange::new(0, "abc", ""));
        assert_eq!(cursor, 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn non_adjacent_inserts_do_not_merge() {
        let mut history = History::new();
        history.record(TextChange::new(0, "", "a"), 0, true);
        history.record(TextChange::new(5, "", "b"), 5, true);
        history.undo();
        assert!(history.can_undo());
    }

    #[test]
    fn dirty_history_never_returns_clean() {
        let mut history = History::new();
        history.mark_dirty();
        assert!(!history.is_clean());
        history.record(TextChange::new(0, "", "x"), 0, false);
        history.undo();
        assert!(!history.is_clean());
        history.mark_clean();
        assert!(history.is_clean());
    }

    #[test]
    fn clean_point_survives_undo_redo() {
        let mut history = History::new();
        history.record(TextChange::new(0, "", "x"), 0, false);
        history.mark_clean();
        assert!(history.is_clean());

        history.undo();
        assert!(!history.is_clean());
        history.redo();
        assert!(history.is_clean());
    }

    #[test]
    fn new_edit_after_undo_drops_redo_and_clean_point() {
        let mut history = History::new();
        history.record(TextChange::new(0, "", "x"), 0, false);
        history.mark_clean();
        history.undo();
        history.record(TextChange::new(0, "", "y"), 0, false);

        assert!(!history.can_redo());
        assert!(!history.is_clean());
    }
}
