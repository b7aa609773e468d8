//! 検索・置換バー
//!
//! 1つのドキュメントを対象に、次/前の検索、単一置換、一括置換を行う。
//! マッチは選択範囲として表示し、カーソルはマッチ末尾に置く。

use super::matcher::{find_matches, RegexMatcher, SearchOptions, TextMatch};
use crate::buffer::Document;

/// 検索・置換バーの状態
#[derive(Debug, Clone, Default)]
pub struct FindReplace {
    visible: bool,
    replace_visible: bool,
    find_text: String,
    replace_text: String,
    options: SearchOptions,
    /// 直近の検索で発生したエラー（不正な正規表現など）
    error: Option<String>,
}

impl FindReplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_replace_visible(&self) -> bool {
        self.visible && self.replace_visible
    }

    pub fn find_text(&self) -> &str {
        &self.find_text
    }

    pub fn replace_text(&self) -> &str {
        &self.replace_text
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 検索バーを表示（選択中の1行テキストで検索語を埋める）
    pub fn show_find(&mut self, document: Option<&Document>) {
        self.visible = true;
        self.replace_visible = false;
        self.prefill(document);
    }

    /// 置換入力付きで表示
    pub fn show_replace(&mut self, document: Option<&Document>) {
        self.visible = true;
        self.replace_visible = true;
        self.prefill(document);
    }

    fn prefill(&mut self, document: Option<&Document>) {
        if let Some(selected) = document.and_then(Document::selected_text) {
            if !selected.contains('\n') {
                self.find_text = selected;
            }
        }
    }

    /// バーを閉じる（フォーカスはエディタへ戻る）
    pub fn close(&mut self) {
        self.visible = false;
        self.error = None;
    }

    /// 検索語を設定し、選択開始位置から自動検索する
    pub fn set_find_text(&mut self, document: Option<&mut Document>, text: &str) -> bool {
        self.find_text = text.to_string();
        let Some(document) = document else {
            return false;
        };
        let from = document
            .selection()
            .map(|(start, _)| start)
            .unwrap_or_else(|| document.cursor());
        self.find_forward_from(document, from)
    }

    pub fn set_replace_text(&mut self, text: &str) {
        self.replace_text = text.to_string();
    }

    pub fn set_case_sensitive(&mut self, value: bool) {
        self.options.case_sensitive = value;
    }

    pub fn set_whole_word(&mut self, value: bool) {
        self.options.whole_word = value;
    }

    pub fn set_regex(&mut self, value: bool) {
        self.options.regex = value;
    }

    pub fn toggle_case_sensitive(&mut self) {
        self.options.case_sensitive = !self.options.case_sensitive;
    }

    pub fn toggle_whole_word(&mut self) {
        self.options.whole_word = !self.options.whole_word;
    }

    pub fn toggle_regex(&mut self) {
        self.options.regex = !self.options.regex;
    }

    fn matches(&mut self, document: &Document) -> Vec<TextMatch> {
        match find_matches(document.text(), &self.find_text, &self.options) {
            Ok(matches) => {
                self.error = None;
                matches
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    /// 描画用のマッチ範囲（エラーは記録しない）
    pub fn highlights(&self, document: &Document) -> Vec<(usize, usize)> {
        if !self.visible || self.find_text.is_empty() {
            return Vec::new();
        }
        find_matches(document.text(), &self.find_text, &self.options)
            .map(|matches| matches.into_iter().map(|m| (m.start, m.end)).collect())
            .unwrap_or_default()
    }

    fn find_forward_from(&mut self, document: &mut Document, from: usize) -> bool {
        let matches = self.matches(document);
        let found = matches
            .iter()
            .find(|m| m.start >= from)
            .or_else(|| matches.first());
        match found {
            Some(m) => {
                document.select_range(m.start, m.end);
                true
            }
            None => false,
        }
    }

    /// 次を検索（末尾で先頭へ折り返す）
    pub fn find_next(&mut self, document: Option<&mut Document>) -> bool {
        let Some(document) = document else {
            return false;
        };
        let from = document
            .selection()
            .map(|(_, end)| end)
            .unwrap_or_else(|| document.cursor());
        self.find_forward_from(document, from)
    }

    /// 前を検索（先頭で末尾へ折り返す）
    pub fn find_previous(&mut self, document: Option<&mut Document>) -> bool {
        let Some(document) = document else {
            return false;
        };
        let before = document
            .selection()
            .map(|(start, _)| start)
            .unwrap_or_else(|| document.cursor());
        let matches = self.matches(document);
        let found = matches
            .iter()
            .rev()
            .find(|m| m.start < before)
            .or_else(|| matches.last());
        match found {
            Some(m) => {
                document.select_range(m.start, m.end);
                true
            }
            None => false,
        }
    }

    fn replacement_for(&self, matched: &str) -> String {
        if self.options.regex {
            if let Ok(matcher) = RegexMatcher::new(&self.find_text, self.options.case_sensitive) {
                return matcher.expand(matched, &self.replace_text);
            }
        }
        self.replace_text.clone()
    }

    /// 選択がマッチしていれば置換し、次のマッチへ進む
    pub fn replace(&mut self, document: Option<&mut Document>) -> bool {
        let Some(document) = document else {
            return false;
        };
        if self.find_text.is_empty() {
            return false;
        }

        let mut replaced = false;
        if let Some((start, end)) = document.selection() {
            let is_match = self
                .matches(document)
                .iter()
                .any(|m| m.start == start && m.end == end);
            if is_match {
                let replacement = self.replacement_for(&document.slice(start, end));
                document.replace_range(start, end, &replacement);
                replaced = true;
            }
        }

        let from = document.cursor();
        self.find_forward_from(document, from);
        replaced
    }

    /// すべて置換して件数を返す
    pub fn replace_all(&mut self, document: Option<&mut Document>) -> usize {
        let Some(document) = document else {
            return 0;
        };
        if self.find_text.is_empty() {
            return 0;
        }

        let mut last_end = 0usize;
        let mut count = 0usize;
        let mut result = String::new();
        let text: Vec<char> = document.text().chars().collect();

        for m in self.matches(document) {
            // 重なり合うマッチは先行するものを優先
            if m.start < last_end {
                continue;
            }
            result.extend(&text[last_end..m.start]);
            let matched: String = text[m.start..m.end].iter().collect();
            result.push_str(&self.replacement_for(&matched));
            last_end = m.end;
            count += 1;
        }

        if count > 0 {
            result.extend(&text[last_end..]);
            let cursor = document.cursor();
            document.set_text(&result);
            document.set_cursor(cursor);
        }
        count
    }

    /// マッチ件数表示（"2 of 5" / "No results" / 空）
    pub fn match_count_label(&mut self, document: Option<&Document>) -> String {
        let Some(document) = document else {
            return String::new();
        };
        if self.find_text.is_empty() {
            return String::new();
        }
        let matches = self.matches(document);
        if matches.is_empty() {
            return "No results".to_string();
        }
        let current = document
            .selection()
            .and_then(|(start, end)| matches.iter().position(|m| m.start == start && m.end == end))
            .map(|index| index + 1)
            .unwrap_or(0);
        format!("{} of {}", current, matches.len())
    }
}
