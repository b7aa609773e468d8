//! 検索用マッチャー
//!
//! リテラル検索と正規表現検索を同じ結果型で扱う。位置はすべて文字インデックス。

use crate::error::SearchError;
use regex::{Regex, RegexBuilder};

/// 検索オプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// 大文字小文字を区別する
    pub case_sensitive: bool,
    /// 単語単位で一致させる
    pub whole_word: bool,
    /// 正規表現として解釈する
    pub regex: bool,
}

/// 1件のマッチ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    /// 開始位置（文字インデックス）
    pub start: usize,
    /// 終了位置（排他的）
    pub end: usize,
    /// 開始行（0始まり）
    pub line: usize,
    /// 開始列（0始まり）
    pub column: usize,
}

impl TextMatch {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// 文字列マッチング戦略
pub trait StringMatcher {
    /// 文字列内のすべてのマッチを返す
    fn find_matches(&self, text: &str, options: &SearchOptions) -> Vec<TextMatch>;
}

/// リテラルマッチャー（重なり合うマッチも返す）
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    pattern: Vec<char>,
}

impl LiteralMatcher {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
        }
    }
}

impl StringMatcher for LiteralMatcher {
    fn find_matches(&self, text: &str, options: &SearchOptions) -> Vec<TextMatch> {
        let chars: Vec<char> = text.chars().collect();
        let pattern_len = self.pattern.len();
        if pattern_len == 0 || pattern_len > chars.len() {
            return Vec::new();
        }

        let positions = position_map(&chars);
        let mut matches = Vec::new();

        'outer: for start in 0..=chars.len() - pattern_len {
            for (offset, &pat_ch) in self.pattern.iter().enumerate() {
                if !chars_equal(chars[start + offset], pat_ch, options.case_sensitive) {
                    continue 'outer;
                }
            }
            let end = start + pattern_len;
            if options.whole_word && !is_whole_word(&chars, start, end) {
                continue;
            }
            let (line, column) = positions[start];
            matches.push(TextMatch {
                start,
                end,
                line,
                column,
            });
        }

        matches
    }
}

/// 正規表現マッチャー
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, SearchError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .multi_line(true)
            .build()?;
        Ok(Self { regex })
    }

    /// `$1` などを展開した置換文字列
    pub fn expand(&self, matched: &str, template: &str) -> String {
        match self.regex.captures(matched) {
            Some(captures) => {
                let mut expanded = String::new();
                captures.expand(template, &mut expanded);
                expanded
            }
            None => template.to_string(),
        }
    }
}

impl StringMatcher for RegexMatcher {
    fn find_matches(&self, text: &str, options: &SearchOptions) -> Vec<TextMatch> {
        let chars: Vec<char> = text.chars().collect();
        let positions = position_map(&chars);

        // バイト位置 → 文字位置
        let mut byte_to_char = vec![0usize; text.len() + 1];
        let mut char_idx = 0usize;
        for (byte_idx, ch) in text.char_indices() {
            for slot in byte_to_char.iter_mut().skip(byte_idx).take(ch.len_utf8()) {
                *slot = char_idx;
            }
            char_idx += 1;
        }
        byte_to_char[text.len()] = char_idx;

        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| (byte_to_char[m.start()], byte_to_char[m.end()]))
            .filter(|&(start, end)| !options.whole_word || is_whole_word(&chars, start, end))
            .map(|(start, end)| {
                let (line, column) = positions[start];
                TextMatch {
                    start,
                    end,
                    line,
                    column,
                }
            })
            .collect()
    }
}

/// オプションに応じたマッチャーで検索
pub fn find_matches(
    text: &str,
    pattern: &str,
    options: &SearchOptions,
) -> Result<Vec<TextMatch>, SearchError> {
    if pattern.is_empty() {
        return Ok(Vec::new());
    }
    if options.regex {
        Ok(RegexMatcher::new(pattern, options.case_sensitive)?.find_matches(text, options))
    } else {
        Ok(LiteralMatcher::new(pattern).find_matches(text, options))
    }
}

/// マッチ前後が英数字でないか
pub fn is_whole_word(chars: &[char], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !chars[start - 1].is_alphanumeric();
    let after_ok = end >= chars.len() || !chars[end].is_alphanumeric();
    before_ok && after_ok
}

fn position_map(chars: &[char]) -> Vec<(usize, usize)> {
    let mut line = 0usize;
    let mut column = 0usize;
    let mut map = Vec::with_capacity(chars.len());
    for &ch in chars {
        map.push((line, column));
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    map
}

fn chars_equal(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        return a == b;
    }
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str, pattern: &str, options: SearchOptions) -> Vec<(usize, usize)> {
        find_matches(text, pattern, &options)
            .unwrap()
            .into_iter()
            .map(|m| (m.start, m.end))
            .collect()
    }

    #[test]
    fn case_insensitive_by_default() {
        let hits = literal("Hello hello HELLO", "hello", SearchOptions::default());
        assert_eq!(hits, vec![(0, 5), (6, 11), (12, 17)]);
    }

    #[test]
    fn case_sensitive_and_whole_word() {
        let options = SearchOptions {
            case_sensitive: true,
            ..SearchOptions::default()
        };
        assert_eq!(literal("Hello hello HELLO", "hello", options), vec![(6, 11)]);

        let options = SearchOptions {
            whole_word: true,
            ..SearchOptions::default()
        };
        assert_eq!(
            literal("Hello HelloWorld Hello", "Hello", options),
            vec![(0, 5), (17, 22)]
        );
    }

    #[test]
    fn overlapping_literal_matches() {
        assert_eq!(
            literal("aaaa", "aa", SearchOptions::default()),
            vec![(0, 2), (1, 3), (2, 4)]
        );
    }

    #[test]
    fn line_and_column_are_reported() {
        let matches = find_matches("ab\ncd ab", "ab", &SearchOptions::default()).unwrap();
        assert_eq!((matches[1].line, matches[1].column), (1, 3));
    }

    #[test]
    fn regex_positions_are_char_based() {
        let options = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        let matches = find_matches("日本語 test テスト", r"t\w+", &options).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].start, matches[0].end), (4, 8));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let options = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        assert!(matches!(
            find_matches("x", "(", &options),
            Err(SearchError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn regex_expand_uses_captures() {
        let matcher = RegexMatcher::new(r"(\w+)@(\w+)", true).unwrap();
        assert_eq!(matcher.expand("user@host", "$2:$1"), "host:user");
    }
}
