//! テキストドキュメント
//!
//! 1つのエディタ（タブ）が保持するテキスト、カーソル、選択範囲、
//! ファイルパス、変更フラグ、編集履歴をまとめて扱う。
//! 位置はすべて文字インデックス（char単位）。

use super::history::{History, TextChange};
use super::line_index::LineIndex;
use super::Clipboard;
use crate::error::file::Result;
use crate::error::FileError;
use crate::file::{read_text_file, write_text_file};
use std::path::{Path, PathBuf};

/// 無題ドキュメントの表示名
pub const UNTITLED: &str = "Untitled";

/// 変更ありタブのマーカー
pub const MODIFIED_MARKER: &str = "●";

/// カーソル移動の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    PageUp(usize),
    PageDown(usize),
}

/// 編集対象のドキュメント
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    /// 行頭キャッシュ（`text` と常に一致させる）
    lines: LineIndex,
    cursor: usize,
    anchor: Option<usize>,
    /// 上下移動時に維持する列
    preferred_column: Option<usize>,
    path: Option<PathBuf>,
    modified: bool,
    history: History,
    /// 同期グループへ伝播する未処理の変更
    pending: Vec<TextChange>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 空の無題ドキュメント
    pub fn new() -> Self {
        Self {
            text: String::new(),
            lines: LineIndex::default(),
            cursor: 0,
            anchor: None,
            preferred_column: None,
            path: None,
            modified: false,
            history: History::new(),
            pending: Vec::new(),
        }
    }

    /// 初期テキスト付きで作成（変更なし扱い）
    pub fn with_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.load_text(text);
        doc
    }

    /// ファイルから作成
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut doc = Self::new();
        doc.load_file(path)?;
        Ok(doc)
    }

    // ---- 参照系 ----

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len_chars(&self) -> usize {
        self.lines.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 空・無題・未変更のドキュメントか（タブ再利用の判定に使う）
    pub fn is_blank_untitled(&self) -> bool {
        self.text.is_empty() && self.path.is_none() && !self.modified
    }

    /// 表示名（ファイル名または "Untitled"）
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// タブタイトル（変更ありなら "● " を前置）
    pub fn tab_title(&self) -> String {
        if self.modified {
            format!("{} {}", MODIFIED_MARKER, self.display_name())
        } else {
            self.display_name()
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// 行テキスト（0始まり、改行なし）
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let (start, end) = self.lines.line_byte_range(line)?;
        Some(&self.text[start..end])
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// 文字位置が属する行（0始まり）
    pub fn line_of(&self, pos: usize) -> usize {
        self.lines.line_of(pos)
    }

    /// 行の範囲 `(開始, 終了)`（終了は改行を含まない）
    pub fn line_bounds(&self, line: usize) -> (usize, usize) {
        self.lines.line_bounds(line)
    }

    /// カーソル位置（1始まりの行・列）
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let line = self.line_of(self.cursor);
        let (start, _) = self.line_bounds(line);
        (line + 1, self.cursor - start + 1)
    }

    /// 選択範囲 `(開始, 終了)`
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection().map(|(start, end)| self.slice(start, end))
    }

    /// 文字範囲の部分文字列
    pub fn slice(&self, start: usize, end: usize) -> String {
        let start_byte = self.byte_index(start);
        let end_byte = self.byte_index(end.max(start));
        self.text[start_byte..end_byte].to_string()
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text[self.byte_index(pos)..].chars().next()
    }

    fn byte_index(&self, pos: usize) -> usize {
        self.lines.byte_of(&self.text, pos)
    }

    // ---- カーソル・選択 ----

    /// カーソルを設定（選択解除）
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.len_chars());
        self.anchor = None;
        self.preferred_column = None;
    }

    /// `anchor` から `cursor` までを選択
    pub fn select_range(&mut self, anchor: usize, cursor: usize) {
        let len = self.len_chars();
        self.anchor = Some(anchor.min(len));
        self.cursor = cursor.min(len);
        self.preferred_column = None;
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// カーソル移動（`extend` で選択を伸ばす）
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }

        let len = self.len_chars();
        let line = self.line_of(self.cursor);
        let (line_start, line_end) = self.line_bounds(line);

        match motion {
            Motion::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                self.preferred_column = None;
            }
            Motion::Right => {
                self.cursor = (self.cursor + 1).min(len);
                self.preferred_column = None;
            }
            Motion::Up => self.move_vertical(line, line_start, -1),
            Motion::Down => self.move_vertical(line, line_start, 1),
            Motion::PageUp(rows) => self.move_vertical(line, line_start, -(rows.max(1) as isize)),
            Motion::PageDown(rows) => self.move_vertical(line, line_start, rows.max(1) as isize),
            Motion::LineStart => {
                self.cursor = line_start;
                self.preferred_column = None;
            }
            Motion::LineEnd => {
                self.cursor = line_end;
                self.preferred_column = None;
            }
            Motion::DocumentStart => {
                self.cursor = 0;
                self.preferred_column = None;
            }
            Motion::DocumentEnd => {
                self.cursor = len;
                self.preferred_column = None;
            }
        }
    }

    fn move_vertical(&mut self, line: usize, line_start: usize, delta: isize) {
        let column = self
            .preferred_column
            .unwrap_or(self.cursor - line_start);
        let last_line = self.line_count() - 1;
        let target = (line as isize + delta).clamp(0, last_line as isize) as usize;
        let (start, end) = self.line_bounds(target);
        self.cursor = (start + column).min(end);
        self.preferred_column = Some(column);
    }

    pub fn select_all(&mut self) {
        self.select_range(0, self.len_chars());
    }

    /// カーソル下の単語を選択
    pub fn select_word(&mut self) -> bool {
        let chars: Vec<char> = self.text.chars().collect();
        let is_word = |ch: char| ch.is_alphanumeric() || ch == '_';

        let mut pos = self.cursor.min(chars.len());
        if pos == chars.len() || !is_word(chars[pos]) {
            if pos > 0 && is_word(chars[pos - 1]) {
                pos -= 1;
            } else {
                return false;
            }
        }

        let mut start = pos;
        while start > 0 && is_word(chars[start - 1]) {
            start -= 1;
        }
        let mut end = pos;
        while end < chars.len() && is_word(chars[end]) {
            end += 1;
        }

        self.select_range(start, end);
        true
    }

    /// カーソル行を選択（改行は含まない）
    pub fn select_line(&mut self) {
        let (start, end) = self.line_bounds(self.line_of(self.cursor));
        self.select_range(start, end);
    }

    /// 指定行へ移動（1始まり、範囲外は無視）
    pub fn go_to_line(&mut self, line_number: usize) -> bool {
        if line_number == 0 || line_number > self.line_count() {
            return false;
        }
        let (start, _) = self.line_bounds(line_number - 1);
        self.set_cursor(start);
        true
    }

    // ---- 編集 ----

    /// 範囲を置換し、履歴と同期用変更キューへ記録する
    fn edit(&mut self, start: usize, end: usize, inserted: &str, mergeable: bool) {
        let cursor_before = self.cursor;
        let change = self.splice(start, end, inserted);
        if change.removed.is_empty() && change.inserted.is_empty() {
            return;
        }
        self.history.record(change.clone(), cursor_before, mergeable);
        self.modified = true;
        self.anchor = None;
        self.preferred_column = None;
        self.pending.push(change);
    }

    fn splice(&mut self, start: usize, end: usize, inserted: &str) -> TextChange {
        let start = start.min(self.len_chars());
        let start_byte = self.byte_index(start);
        let end_byte = self.byte_index(end.max(start));
        let removed = self.text[start_byte..end_byte].to_string();
        self.text.replace_range(start_byte..end_byte, inserted);
        self.lines.apply(start, start_byte, &removed, inserted);
        TextChange::new(start, removed, inserted)
    }

    /// 文字列を挿入（選択範囲があれば置換）
    pub fn insert_str(&mut self, text: &str) {
        let (start, end) = self.selection().unwrap_or((self.cursor, self.cursor));
        let mergeable = start == end && text.chars().count() == 1 && text != "\n";
        self.cursor = start;
        self.edit(start, end, text, mergeable);
        self.cursor = start + text.chars().count();
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    /// カーソル前の文字を削除（選択範囲があれば選択を削除）
    pub fn delete_backward(&mut self) -> bool {
        if let Some((start, end)) = self.selection() {
            self.edit(start, end, "", false);
            self.cursor = start;
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        let start = self.cursor - 1;
        self.edit(start, self.cursor, "", false);
        self.cursor = start;
        true
    }

    /// カーソル位置の文字を削除
    pub fn delete_forward(&mut self) -> bool {
        if let Some((start, end)) = self.selection() {
            self.edit(start, end, "", false);
            self.cursor = start;
            return true;
        }
        if self.cursor >= self.len_chars() {
            return false;
        }
        self.edit(self.cursor, self.cursor + 1, "", false);
        true
    }

    /// 範囲置換（カーソルは挿入文字列の末尾へ）
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let len = self.len_chars();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.edit(start, end, text, false);
        self.cursor = start + text.chars().count();
    }

    /// 全文を置換（Undo可能、変更ありになる）
    pub fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        let len = self.len_chars();
        self.edit(0, len, text, false);
        self.cursor = 0;
    }

    /// 全文を読み込み（履歴を破棄し、未変更扱い）
    pub fn load_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.lines = LineIndex::new(text);
        self.cursor = 0;
        self.anchor = None;
        self.preferred_column = None;
        self.history.clear();
        self.modified = false;
        self.pending.clear();
    }

    /// カーソル行（選択があれば選択範囲）を複製
    pub fn duplicate_line(&mut self) {
        if let Some((start, end)) = self.selection() {
            let selected = self.slice(start, end);
            self.edit(end, end, &selected, false);
            self.select_range(end, end + selected.chars().count());
            return;
        }

        let line = self.line_of(self.cursor);
        let (start, end) = self.line_bounds(line);
        let column = self.cursor - start;
        let copy = format!("\n{}", self.slice(start, end));
        self.edit(end, end, &copy, false);
        self.cursor = end + 1 + column;
    }

    /// カーソル行を削除
    pub fn delete_line(&mut self) {
        let line = self.line_of(self.cursor);
        let (start, end) = self.line_bounds(line);
        let line_count = self.line_count();

        if line + 1 < line_count {
            self.edit(start, end + 1, "", false);
            self.cursor = start;
        } else if line > 0 {
            // 最終行は直前の改行ごと削除
            self.edit(start - 1, end, "", false);
            let (prev_start, _) = self.line_bounds(line - 1);
            self.cursor = prev_start;
        } else {
            self.edit(start, end, "", false);
            self.cursor = 0;
        }
    }

    /// カーソル行を1行上へ移動（先頭行では何もしない）
    pub fn move_line_up(&mut self) -> bool {
        let line = self.line_of(self.cursor);
        if line == 0 {
            return false;
        }
        let (start, end) = self.line_bounds(line);
        let (prev_start, prev_end) = self.line_bounds(line - 1);
        let column = self.cursor - start;

        let swapped = format!(
            "{}\n{}",
            self.slice(start, end),
            self.slice(prev_start, prev_end)
        );
        self.edit(prev_start, end, &swapped, false);
        self.cursor = prev_start + column;
        true
    }

    /// カーソル行を1行下へ移動（最終行では何もしない）
    pub fn move_line_down(&mut self) -> bool {
        let line = self.line_of(self.cursor);
        if line + 1 >= self.line_count() {
            return false;
        }
        let (start, end) = self.line_bounds(line);
        let (next_start, next_end) = self.line_bounds(line + 1);
        let column = self.cursor - start;
        let next_len = next_end - next_start;

        let swapped = format!(
            "{}\n{}",
            self.slice(next_start, next_end),
            self.slice(start, end)
        );
        self.edit(start, next_end, &swapped, false);
        self.cursor = start + next_len + 1 + column;
        true
    }

    // ---- Undo / Redo ----

    pub fn undo(&mut self) -> bool {
        let Some((change, cursor)) = self.history.undo() else {
            return false;
        };
        self.apply_history_change(change, cursor);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some((change, cursor)) = self.history.redo() else {
            return false;
        };
        self.apply_history_change(change, cursor);
        true
    }

    fn apply_history_change(&mut self, change: TextChange, cursor: usize) {
        let applied = self.splice(change.start, change.removed_end(), &change.inserted);
        self.pending.push(applied);
        self.cursor = cursor.min(self.len_chars());
        self.anchor = None;
        self.preferred_column = None;
        self.modified = !self.history.is_clean();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- クリップボード ----

    pub fn copy(&self, clipboard: &mut Clipboard) -> bool {
        match self.selected_text() {
            Some(text) => {
                clipboard.set(text);
                true
            }
            None => false,
        }
    }

    pub fn cut(&mut self, clipboard: &mut Clipboard) -> bool {
        if !self.copy(clipboard) {
            return false;
        }
        self.delete_backward()
    }

    pub fn paste(&mut self, clipboard: &Clipboard) -> bool {
        match clipboard.get() {
            Some(text) if !text.is_empty() => {
                let text = text.to_string();
                self.insert_str(&text);
                true
            }
            _ => false,
        }
    }

    // ---- 同期 ----

    /// 同期グループへ伝播すべき変更を取り出す
    pub fn take_changes(&mut self) -> Vec<TextChange> {
        std::mem::take(&mut self.pending)
    }

    /// 他エディタで行われた変更を反映する
    ///
    /// 自分のカーソルは変更位置に合わせてずらし、選択は解除する。
    /// 変更前テキストが一致しない場合は `false` を返し何もしない。
    pub fn apply_mirrored(&mut self, change: &TextChange) -> bool {
        let removed_len = change.removed.chars().count();
        let len = self.len_chars();
        if change.start + removed_len > len
            || self.slice(change.start, change.start + removed_len) != change.removed
        {
            return false;
        }

        let cursor_before = self.cursor;
        self.splice(change.start, change.start + removed_len, &change.inserted);
        self.history.record(change.clone(), cursor_before, false);

        let inserted_len = change.inserted.chars().count();
        if self.cursor >= change.start + removed_len {
            self.cursor = self.cursor - removed_len + inserted_len;
        } else if self.cursor > change.start {
            self.cursor = change.start;
        }
        self.cursor = self.cursor.min(self.len_chars());
        self.anchor = None;
        self.preferred_column = None;
        true
    }

    /// 全文をそのまま反映する（差分適用に失敗した場合の再同期）
    pub fn resync_text(&mut self, text: &str) {
        let cursor = self.cursor;
        let len = self.len_chars();
        let change = self.splice(0, len, text);
        self.history.record(change, cursor, false);
        self.cursor = cursor.min(self.len_chars());
        self.anchor = None;
    }

    // ---- ファイル ----

    /// ファイルを読み込む（存在しなければエラー）
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = read_text_file(path)?;
        self.load_text(&content);
        self.path = Some(path.to_path_buf());
        log::info!("loaded {}", path.display());
        Ok(())
    }

    /// 現在のパスへ保存
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(FileError::NoPath)?;
        write_text_file(&path, &self.text)?;
        self.mark_saved();
        Ok(())
    }

    /// 別名保存（成功時のみパスを更新）
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        write_text_file(path, &self.text)?;
        self.path = Some(path.to_path_buf());
        self.mark_saved();
        Ok(())
    }

    /// パスだけを設定（ディスクには触れない）
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    /// 保存済みとして記録
    pub fn mark_saved(&mut self) {
        self.history.mark_clean();
        self.modified = false;
    }

    /// 変更フラグを設定
    ///
    /// 履歴が保存時点にいるまま変更済みにする場合（変更済みグループへの参加など）は
    /// 保存時点を捨てる。
    pub fn set_modified(&mut self, modified: bool) {
        if modified {
            if self.history.is_clean() {
                self.history.mark_dirty();
            }
            self.modified = true;
        } else {
            self.mark_saved();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(text: &str) -> Document {
        Document::with_text(text)
    }

    #[test]
    fn display_name_and_tab_title() {
        let mut d = Document::new();
        assert_eq!(d.display_name(), "Untitled");
        d.set_path(Some(PathBuf::from("/tmp/notes.txt")));
        assert_eq!(d.display_name(), "notes.txt");
        d.insert_str("x");
        assert_eq!(d.tab_title(), "● notes.txt");
    }

    #[test]
    fn insert_replaces_selection() {
        let mut d = doc("Hello World");
        d.select_range(6, 11);
        d.insert_str("Rust");
        assert_eq!(d.text(), "Hello Rust");
        assert_eq!(d.cursor(), 10);
        assert!(d.is_modified());
    }

    #[test]
    fn cursor_line_col_is_one_based() {
        let mut d = doc("ab\ncde");
        d.set_cursor(4);
        assert_eq!(d.cursor_line_col(), (2, 2));
        d.set_cursor(0);
        assert_eq!(d.cursor_line_col(), (1, 1));
    }

    #[test]
    fn vertical_motion_keeps_column() {
        let mut d = doc("abcdef\nx\nabcdef");
        d.set_cursor(4);
        d.move_cursor(Motion::Down, false);
        assert_eq!(d.cursor(), 8);
        d.move_cursor(Motion::Down, false);
        assert_eq!(d.cursor(), 13);
    }

    #[test]
    fn select_word_and_line() {
        let mut d = doc("Hello World");
        d.set_cursor(2);
        assert!(d.select_word());
        assert_eq!(d.selected_text().as_deref(), Some("Hello"));

        let mut d = doc("Line 1\nLine 2");
        d.set_cursor(0);
        d.select_line();
        assert_eq!(d.selected_text().as_deref(), Some("Line 1"));
    }

    #[test]
    fn select_word_on_whitespace_fails() {
        let mut d = doc("a  b");
        d.set_cursor(2);
        assert!(!d.select_word());
    }

    #[test]
    fn duplicate_line_and_selection() {
        let mut d = doc("Line 1\nLine 2\nLine 3");
        d.set_cursor(0);
        d.duplicate_line();
        let lines: Vec<&str> = d.lines().collect();
        assert_eq!(lines, vec!["Line 1", "Line 1", "Line 2", "Line 3"]);

        let mut d = doc("Hello World");
        d.select_range(0, 5);
        d.duplicate_line();
        assert!(d.text().contains("HelloHello"));
    }

    #[test]
    fn delete_line_variants() {
        let mut d = doc("Line 1\nLine 2\nLine 3");
        d.set_cursor(7);
        d.delete_line();
        assert_eq!(d.text(), "Line 1\nLine 3");

        let mut d = doc("Line 1\nLine 2");
        d.set_cursor(9);
        d.delete_line();
        assert_eq!(d.text(), "Line 1");

        let mut d = doc("only");
        d.delete_line();
        assert_eq!(d.text(), "");
    }

    #[test]
    fn move_lines_and_edges() {
        let mut d = doc("a\nb\nc");
        d.set_cursor(2);
        assert!(d.move_line_up());
        assert_eq!(d.text(), "b\na\nc");
        assert_eq!(d.cursor(), 0);
        assert!(!d.move_line_up());

        d.set_cursor(4);
        assert!(!d.move_line_down());
        d.set_cursor(2);
        assert!(d.move_line_down());
        assert_eq!(d.text(), "b\nc\na");
        assert_eq!(d.cursor(), 4);
    }

    #[test]
    fn go_to_line_ignores_out_of_range() {
        let mut d = doc("Line 1\nLine 2\nLine 3");
        assert!(d.go_to_line(2));
        assert_eq!(d.line_of(d.cursor()), 1);
        assert!(!d.go_to_line(999));
        assert!(!d.go_to_line(0));
        assert_eq!(d.line_of(d.cursor()), 1);
    }

    #[test]
    fn undo_redo_restores_modified_flag() {
        let mut d = doc("");
        for ch in "abc".chars() {
            d.insert_char(ch);
        }
        assert!(d.is_modified());
        assert!(d.undo());
        assert_eq!(d.text(), "");
        assert!(!d.is_modified());
        assert!(d.redo());
        assert_eq!(d.text(), "abc");
        assert!(d.is_modified());
        assert!(!d.redo());
    }

    #[test]
    fn modified_without_history_stays_modified_after_undo() {
        let mut d = doc("Xhello");
        d.set_modified(true);
        d.insert_char('Y');
        assert!(d.undo());
        assert_eq!(d.text(), "Xhello");
        assert!(d.is_modified());

        d.set_modified(false);
        assert!(!d.is_modified());
    }

    #[test]
    fn clipboard_roundtrip() {
        let mut clipboard = Clipboard::default();
        let mut d = doc("cut me");
        d.select_range(0, 4);
        assert!(d.cut(&mut clipboard));
        assert_eq!(d.text(), "me");
        d.set_cursor(2);
        assert!(d.paste(&clipboard));
        assert_eq!(d.text(), "mecut ");
        assert!(!Document::new().copy(&mut clipboard));
    }

    #[test]
    fn mirrored_change_shifts_peer_cursor() {
        let mut origin = doc("hello world");
        let mut peer = origin.clone();
        peer.set_cursor(8);

        origin.set_cursor(0);
        origin.insert_str(">> ");
        for change in origin.take_changes() {
            assert!(peer.apply_mirrored(&change));
        }
        assert_eq!(peer.text(), origin.text());
        assert_eq!(peer.cursor(), 11);
    }

    #[test]
    fn mirrored_change_rejects_diverged_text() {
        let mut peer = doc("abc");
        let change = TextChange::new(0, "zz", "y");
        assert!(!peer.apply_mirrored(&change));
        assert_eq!(peer.text(), "abc");
    }

    #[test]
    fn load_and_save_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        assert!(Document::from_file(&path).is_err());

        let mut d = Document::new();
        assert!(matches!(d.save(), Err(FileError::NoPath)));
        d.insert_str("content");
        d.save_as(&path).unwrap();
        assert!(!d.is_modified());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");

        let loaded = Document::from_file(&path).unwrap();
        assert_eq!(loaded.text(), "content");
        assert!(!loaded.is_modified());

        let bad = dir.path().join("missing_dir").join("x.txt");
        assert!(d.save_as(&bad).is_err());
        assert_eq!(d.path(), Some(path.as_path()));
    }
}
