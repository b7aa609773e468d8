//! 複数ファイル検索・置換
//!
//! 開いているタブ、またはディレクトリ配下のテキストファイルを行単位で検索する。
//! 置換は開いているエディタがあればそちらへ反映し、なければディスクへ書き戻す。

use super::matcher::{find_matches, RegexMatcher, SearchOptions};
use crate::buffer::EditorId;
use crate::error::{Result, SearchError};
use crate::file::{read_text_file, write_text_file};
use crate::workspace::{Dialogs, Workspace};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 検索範囲
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// 開いているタブ
    OpenTabs,
    /// ディレクトリ配下（再帰）
    Directory(PathBuf),
}

/// 検索対象の出どころ
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchSource {
    /// 無題タブなどパスを持たないエディタ
    Editor(EditorId),
    /// ファイル
    File(PathBuf),
}

/// 1件の検索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub source: SearchSource,
    /// 表示ラベル（パスまたは Untitled-N）
    pub label: String,
    /// 行番号（1始まり）
    pub line_number: usize,
    /// 前後の空白を除いた行テキスト
    pub line_text: String,
    /// 行内のマッチ開始列（文字単位）
    pub match_start: usize,
    /// 行内のマッチ終了列（排他的）
    pub match_end: usize,
}

/// 1行内のマッチ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub line_number: usize,
    pub line_text: String,
    pub match_start: usize,
    pub match_end: usize,
}

/// 置換の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub replaced: usize,
    pub files: usize,
    /// ファイルごとの失敗（処理は継続する）
    pub errors: Vec<String>,
}

/// 置換件数の表示（"Replaced 1 occurrence" / "Replaced 3 occurrences"）
pub fn replaced_label(count: usize) -> String {
    format!(
        "Replaced {} {}",
        count,
        plural(count, "occurrence", "occurrences")
    )
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// テキストを行ごとに検索
pub fn search_in_text(
    text: &str,
    pattern: &str,
    options: &SearchOptions,
) -> std::result::Result<Vec<LineMatch>, SearchError> {
    let mut results = Vec::new();
    if pattern.is_empty() {
        return Ok(results);
    }
    for (index, line) in text.split('\n').enumerate() {
        for m in find_matches(line, pattern, options)? {
            results.push(LineMatch {
                line_number: index + 1,
                line_text: line.trim().to_string(),
                match_start: m.start,
                match_end: m.end,
            });
        }
    }
    Ok(results)
}

/// 行内の指定範囲を右から順に置換する
///
/// 各範囲は現在の行で同じ位置にマッチが残っている場合のみ置換する。
pub fn replace_in_text(
    text: &str,
    hits: &[(usize, usize, usize)],
    pattern: &str,
    replacement: &str,
    options: &SearchOptions,
) -> std::result::Result<(String, usize), SearchError> {
    let regex = if options.regex {
        Some(RegexMatcher::new(pattern, options.case_sensitive)?)
    } else {
        None
    };

    let mut by_line: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
    for &(line_number, start, end) in hits {
        by_line.entry(line_number).or_default().push((start, end));
    }

    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let mut count = 0usize;

    for (line_number, mut spans) in by_line {
        let Some(line) = line_number.checked_sub(1).and_then(|idx| lines.get_mut(idx)) else {
            continue;
        };
        let current: Vec<(usize, usize)> = find_matches(line, pattern, options)?
            .into_iter()
            .map(|m| (m.start, m.end))
            .collect();

        spans.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        spans.dedup();

        let mut chars: Vec<char> = line.chars().collect();
        let mut floor = usize::MAX;
        for (start, end) in spans {
            // 重なる範囲は右側を優先
            if end > floor || !current.contains(&(start, end)) {
                continue;
            }
            let matched: String = chars[start..end].iter().collect();
            let text = match &regex {
                Some(regex) => regex.expand(&matched, replacement),
                None => replacement.to_string(),
            };
            chars.splice(start..end, text.chars());
            floor = start;
            count += 1;
        }
        *line = chars.into_iter().collect();
    }

    Ok((lines.join("\n"), count))
}

/// ディレクトリ配下の対象拡張子ファイルを列挙（隠しファイルは除外）
pub fn collect_directory_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SearchError::InvalidRoot {
            path: dir.display().to_string(),
        }
        .into());
    }

    let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
        .hidden(true)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("skipping entry during walk: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|kind| kind.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .collect();

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
}

/// 複数ファイル検索パネルの状態
#[derive(Debug, Clone)]
pub struct MultiFileSearch {
    query: String,
    replacement: String,
    options: SearchOptions,
    scope: SearchScope,
    extensions: Vec<String>,
    results: Vec<SearchResult>,
    selected: usize,
    status: String,
    visible: bool,
}

impl MultiFileSearch {
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            query: String::new(),
            replacement: String::new(),
            options: SearchOptions::default(),
            scope: SearchScope::OpenTabs,
            extensions,
            results: Vec::new(),
            selected: 0,
            status: String::new(),
            visible: false,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn set_replacement(&mut self, replacement: &str) {
        self.replacement = replacement.to_string();
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn options_mut(&mut self) -> &mut SearchOptions {
        &mut self.options
    }

    pub fn scope(&self) -> &SearchScope {
        &self.scope
    }

    pub fn set_scope(&mut self, scope: SearchScope) {
        self.scope = scope;
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn selected(&self) -> Option<usize> {
        if self.results.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.results.is_empty() {
            return;
        }
        let last = self.results.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    /// ファイル単位にまとめた結果（表示順）
    pub fn grouped_results(&self) -> Vec<(&str, Vec<&SearchResult>)> {
        let mut groups: Vec<(&str, Vec<&SearchResult>)> = Vec::new();
        for result in &self.results {
            match groups.last_mut() {
                Some((label, items)) if *label == result.label => items.push(result),
                _ => groups.push((result.label.as_str(), vec![result])),
            }
        }
        groups
    }

    /// 検索対象を集める `(出どころ, ラベル, 内容)`
    fn collect_sources(&self, workspace: &Workspace) -> Result<Vec<(SearchSource, String, String)>> {
        match &self.scope {
            SearchScope::OpenTabs => Ok(workspace
                .open_documents()
                .into_iter()
                .filter_map(|(editor, label, path)| {
                    let document = workspace.document(editor)?;
                    let source = match path {
                        Some(path) => SearchSource::File(path),
                        None => SearchSource::Editor(editor),
                    };
                    Some((source, label, document.text().to_string()))
                })
                .collect()),
            SearchScope::Directory(dir) => {
                let files = collect_directory_files(dir, &self.extensions)?;
                Ok(files
                    .into_iter()
                    .filter_map(|path| match read_text_file(&path) {
                        Ok(content) => {
                            let label = path.display().to_string();
                            Some((SearchSource::File(path), label, content))
                        }
                        Err(err) => {
                            log::debug!("skip {}: {}", path.display(), err);
                            None
                        }
                    })
                    .collect())
            }
        }
    }

    /// 検索を実行して件数を返す
    pub fn find_all(&mut self, workspace: &Workspace) -> Result<usize> {
        self.results.clear();
        self.selected = 0;

        if self.query.is_empty() {
            self.status = "Please enter search text".to_string();
            return Ok(0);
        }

        let sources = self.collect_sources(workspace)?;
        if sources.is_empty() {
            self.status = "No files to search".to_string();
            return Ok(0);
        }

        let mut files_with_hits = 0usize;
        for (source, label, content) in sources {
            let hits = search_in_text(&content, &self.query, &self.options)?;
            if !hits.is_empty() {
                files_with_hits += 1;
            }
            self.results.extend(hits.into_iter().map(|hit| SearchResult {
                source: source.clone(),
                label: label.clone(),
                line_number: hit.line_number,
                line_text: hit.line_text,
                match_start: hit.match_start,
                match_end: hit.match_end,
            }));
        }

        self.status = if self.results.is_empty() {
            "No matches found".to_string()
        } else {
            format!(
                "Found {} {} in {} {}",
                self.results.len(),
                plural(self.results.len(), "match", "matches"),
                files_with_hits,
                plural(files_with_hits, "file", "files")
            )
        };
        log::info!("find in files '{}': {}", self.query, self.status);
        Ok(self.results.len())
    }

    /// 選択した結果だけを置換
    pub fn replace_selected(
        &mut self,
        workspace: &mut Workspace,
        indices: &[usize],
    ) -> Result<ReplaceSummary> {
        let chosen: Vec<SearchResult> = indices
            .iter()
            .filter_map(|&index| self.results.get(index).cloned())
            .collect();
        if chosen.is_empty() {
            self.status = "No results selected".to_string();
            return Ok(ReplaceSummary::default());
        }
        self.apply_replacements(workspace, chosen)
    }

    /// すべての結果を確認のうえ置換
    ///
    /// 確認が得られなければ何もせず `None`。
    pub fn replace_all(
        &mut self,
        workspace: &mut Workspace,
        dialogs: &mut dyn Dialogs,
    ) -> Result<Option<ReplaceSummary>> {
        if self.results.is_empty() {
            self.status = "No results to replace".to_string();
            return Ok(Some(ReplaceSummary::default()));
        }
        let count = self.results.len();
        let question = format!(
            "Replace all {} {}?",
            count,
            plural(count, "occurrence", "occurrences")
        );
        if !dialogs.confirm(&question) {
            log::debug!("replace all declined");
            return Ok(None);
        }
        let all = self.results.clone();
        self.apply_replacements(workspace, all).map(Some)
    }

    fn apply_replacements(
        &mut self,
        workspace: &mut Workspace,
        results: Vec<SearchResult>,
    ) -> Result<ReplaceSummary> {
        let mut by_source: BTreeMap<SearchSource, Vec<(usize, usize, usize)>> = BTreeMap::new();
        for result in results {
            by_source.entry(result.source).or_default().push((
                result.line_number,
                result.match_start,
                result.match_end,
            ));
        }

        let mut summary = ReplaceSummary::default();
        for (source, hits) in by_source {
            match self.replace_in_source(workspace, &source, &hits) {
                Ok(0) => {}
                Ok(count) => {
                    summary.replaced += count;
                    summary.files += 1;
                }
                Err(err) => {
                    log::warn!("replace failed for {:?}: {}", source, err);
                    summary.errors.push(err.to_string());
                }
            }
        }

        // 結果を最新化してから件数を表示する
        self.find_all(workspace)?;
        self.status = replaced_label(summary.replaced);
        Ok(summary)
    }

    fn replace_in_source(
        &self,
        workspace: &mut Workspace,
        source: &SearchSource,
        hits: &[(usize, usize, usize)],
    ) -> Result<usize> {
        let editor = match source {
            SearchSource::Editor(editor) => Some(*editor),
            SearchSource::File(path) => workspace.find_editor_for_path(path),
        };

        let original = match (editor, source) {
            (Some(editor), _) => match workspace.document(editor) {
                Some(document) => document.text().to_string(),
                None => return Ok(0),
            },
            (None, SearchSource::File(path)) => read_text_file(path)?,
            (None, SearchSource::Editor(_)) => return Ok(0),
        };

        let (updated, count) =
            replace_in_text(&original, hits, &self.query, &self.replacement, &self.options)?;
        if count == 0 {
            return Ok(0);
        }

        match (editor, source) {
            (Some(editor), _) => {
                workspace.replace_text(editor, &updated);
            }
            (None, SearchSource::File(path)) => write_text_file(path, &updated)?,
            (None, SearchSource::Editor(_)) => {}
        }
        Ok(count)
    }

    /// 結果の位置を開く（開いているタブがあればそこへ切り替える）
    pub fn open_result(&self, workspace: &mut Workspace, index: usize) -> Result<bool> {
        let Some(result) = self.results.get(index) else {
            return Ok(false);
        };

        let editor = match &result.source {
            SearchSource::Editor(editor) => {
                if !workspace.activate_editor(*editor) {
                    return Ok(false);
                }
                *editor
            }
            SearchSource::File(path) => match workspace.find_editor_for_path(path) {
                Some(editor) => {
                    workspace.activate_editor(editor);
                    editor
                }
                None => match workspace.open_file_path(path)? {
                    Some(editor) => editor,
                    None => return Ok(false),
                },
            },
        };

        let line_number = result.line_number;
        let (start, end) = (result.match_start, result.match_end);
        workspace.edit(editor, |document| {
            if document.go_to_line(line_number) {
                let line_start = document.cursor();
                document.select_range(line_start + start, line_start + end);
            }
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn search_in_text_reports_lines_and_columns() {
        let hits = search_in_text("  foo bar\nbar\nnone", "bar", &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].line_number, 1);
        assert_eq!(hits[0].line_text, "foo bar");
        assert_eq!((hits[0].match_start, hits[0].match_end), (6, 9));
        assert_eq!(hits[1].line_number, 2);
    }

    #[test]
    fn whole_word_filter() {
        let options = SearchOptions {
            whole_word: true,
            ..SearchOptions::default()
        };
        let hits = search_in_text("cat concat cat_x cat", "cat", &options).unwrap();
        let starts: Vec<usize> = hits.iter().map(|hit| hit.match_start).collect();
        assert_eq!(starts, vec![0, 17]);
    }

    #[test]
    fn replace_in_text_handles_multiple_hits_per_line() {
        let text = "foo foo\nbar foo";
        let hits = vec![(1, 0, 3), (1, 4, 7), (2, 4, 7)];
        let (updated, count) =
            replace_in_text(text, &hits, "foo", "quux", &SearchOptions::default()).unwrap();
        assert_eq!(updated, "quux quux\nbar quux");
        assert_eq!(count, 3);
    }

    #[test]
    fn replace_in_text_skips_stale_hits() {
        let (updated, count) =
            replace_in_text("abc", &[(1, 1, 4), (5, 0, 1)], "abc", "x", &SearchOptions::default())
                .unwrap();
        assert_eq!(updated, "abc");
        assert_eq!(count, 0);
    }

    #[test]
    fn collect_directory_files_filters_hidden_and_extensions() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::write(dir.path().join("b.bin"), "x").unwrap();
        std::fs::write(dir.path().join(".hidden.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.md"), "x").unwrap();

        let extensions = vec!["txt".to_string(), ".md".to_string()];
        let files = collect_directory_files(dir.path(), &extensions).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "c.md"]);
    }

    #[test]
    fn status_messages() {
        let workspace = Workspace::new();
        let mut search = MultiFileSearch::new(vec!["txt".to_string()]);
        assert_eq!(search.find_all(&workspace).unwrap(), 0);
        assert_eq!(search.status(), "Please enter search text");

        search.set_query("zzz");
        search.find_all(&workspace).unwrap();
        assert_eq!(search.status(), "No matches found");

        let dir = tempdir().unwrap();
        search.set_scope(SearchScope::Directory(dir.path().to_path_buf()));
        search.find_all(&workspace).unwrap();
        assert_eq!(search.status(), "No files to search");
    }
}
