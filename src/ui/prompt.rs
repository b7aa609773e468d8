//! プロンプト行
//!
//! ファイルパス、行番号、確認の答えなどを1行で入力する。
//! パス入力では Tab で補完する。

use crate::config::expand_path;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fs;
use std::path::Path;

/// プロンプトの用途
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    /// 開くファイル
    OpenPath,
    /// 保存先
    SavePath,
    /// 変更ありタブを閉じる確認（y / n / c）
    ConfirmClose { name: String },
    /// はい / いいえ の確認（y / n）
    Confirm,
    /// 指定行へ移動
    GoToLine,
    /// 複数ファイル検索の検索語
    SearchQuery,
    /// 複数ファイル検索の置換語
    SearchReplacement,
    /// 複数ファイル検索の対象ディレクトリ（空なら開いているタブ）
    SearchDirectory,
    /// ファイルツリーのルート
    ExplorerRoot,
}

impl PromptKind {
    fn accepts_paths(&self) -> bool {
        matches!(
            self,
            PromptKind::OpenPath
                | PromptKind::SavePath
                | PromptKind::SearchDirectory
                | PromptKind::ExplorerRoot
        )
    }
}

/// キー処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// 入力が完了した
    Completed(String),
    /// 入力がキャンセルされた
    Cancelled,
    /// 入力継続中
    InProgress,
}

/// 1行入力
#[derive(Debug, Clone)]
pub struct Prompt {
    kind: PromptKind,
    message: String,
    input: Vec<char>,
    cursor: usize,
}

impl Prompt {
    pub fn new(kind: PromptKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            input: Vec::new(),
            cursor: 0,
        }
    }

    pub fn with_input(mut self, input: &str) -> Self {
        self.input = input.chars().collect();
        self.cursor = self.input.len();
        self
    }

    pub fn kind(&self) -> &PromptKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn input(&self) -> String {
        self.input.iter().collect()
    }

    /// 入力中の表示カーソル列（メッセージ含む）
    pub fn cursor_column(&self) -> usize {
        self.message.chars().count() + self.cursor
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> PromptResult {
        if event.kind == KeyEventKind::Release {
            return PromptResult::InProgress;
        }
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match event.code {
            KeyCode::Esc => return PromptResult::Cancelled,
            KeyCode::Char('g') if ctrl => return PromptResult::Cancelled,
            KeyCode::Enter => return PromptResult::Completed(self.input()),
            KeyCode::Char(c) if !ctrl => {
                if matches!(self.kind, PromptKind::ConfirmClose { .. } | PromptKind::Confirm) {
                    // 確認は1文字で確定
                    return PromptResult::Completed(c.to_string());
                }
                self.input.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.input.remove(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.input.len() {
                    self.input.remove(self.cursor);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.len(),
            KeyCode::Char('e') if ctrl => self.cursor = self.input.len(),
            KeyCode::Char('u') if ctrl => {
                self.input.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyCode::Tab if self.kind.accepts_paths() => {
                if let Some(completed) = complete_path(&self.input()) {
                    self.input = completed.chars().collect();
                    self.cursor = self.input.len();
                }
            }
            _ => {}
        }
        PromptResult::InProgress
    }
}

/// パス入力の補完（候補の共通接頭辞まで伸ばす）
pub fn complete_path(input: &str) -> Option<String> {
    let expanded = expand_path(input);
    let (dir, partial) = if input.is_empty() {
        (".".into(), String::new())
    } else if input.ends_with('/') {
        (expanded.clone(), String::new())
    } else {
        let partial = expanded
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = expanded
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| ".".into());
        (dir, partial)
    };

    let mut candidates: Vec<String> = fs::read_dir(&dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&partial) || (name.starts_with('.') && !partial.starts_with('.')) {
                return None;
            }
            let is_dir = entry.path().is_dir();
            Some(if is_dir { format!("{}/", name) } else { name })
        })
        .collect();
    candidates.sort();

    let first = candidates.first()?;
    let common = candidates.iter().skip(1).fold(first.clone(), |prefix, name| {
        prefix
            .chars()
            .zip(name.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect()
    });
    if common.chars().count() <= partial.chars().count() {
        return None;
    }

    let base = match input.rfind('/') {
        Some(idx) if !partial.is_empty() || input.ends_with('/') => &input[..=idx],
        _ if partial.is_empty() => input,
        _ => "",
    };
    Some(format!("{}{}", base, common))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(prompt: &mut Prompt, text: &str) {
        for c in text.chars() {
            prompt.handle_key(&key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn editing_and_submit() {
        let mut prompt = Prompt::new(PromptKind::GoToLine, "Go to line: ");
        type_text(&mut prompt, "142");
        prompt.handle_key(&key(KeyCode::Left));
        prompt.handle_key(&key(KeyCode::Backspace));
        assert_eq!(prompt.input(), "12");
        assert_eq!(prompt.cursor_column(), "Go to line: ".len() + 1);
        assert_eq!(
            prompt.handle_key(&key(KeyCode::Enter)),
            PromptResult::Completed("12".to_string())
        );
    }

    #[test]
    fn escape_cancels() {
        let mut prompt = Prompt::new(PromptKind::OpenPath, "Open: ").with_input("/tmp");
        assert_eq!(prompt.handle_key(&key(KeyCode::Esc)), PromptResult::Cancelled);
    }

    #[test]
    fn confirm_completes_on_single_key() {
        let mut prompt = Prompt::new(
            PromptKind::ConfirmClose {
                name: "a.txt".to_string(),
            },
            "Save changes? (y/n/c) ",
        );
        assert_eq!(
            prompt.handle_key(&key(KeyCode::Char('n'))),
            PromptResult::Completed("n".to_string())
        );
    }

    #[test]
    fn tab_completes_unique_path() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let base = format!("{}/", dir.path().display());
        assert_eq!(
            complete_path(&format!("{}no", base)),
            Some(format!("{}notes.md", base))
        );
        assert_eq!(complete_path(&format!("{}ne", base)), Some(format!("{}nested/", base)));
        assert_eq!(complete_path(&format!("{}n", base)), None);
        assert_eq!(complete_path(&format!("{}zzz", base)), None);

        let mut prompt = Prompt::new(PromptKind::OpenPath, "Open: ").with_input(&format!("{}no", base));
        prompt.handle_key(&key(KeyCode::Tab));
        assert_eq!(prompt.input(), format!("{}notes.md", base));
    }
}
