//! 画面描画
//!
//! ワークスペースと各パネルの状態から1フレームを組み立てる。

use super::layout::{compute_layout, LayoutFlags};
use super::theme::{ComponentType, Theme};
use super::viewport::Viewport;
use super::{Focus, View};
use crate::buffer::{Document, EditorId, MODIFIED_MARKER};
use crate::error::ErrorLevel;
use crate::explorer::FileTree;
use crate::preview::render_lines;
use crate::search::{MultiFileSearch, SearchScope};
use crate::workspace::PaneId;
use ratatui::{
    backend::Backend,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::io;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// アプリ名（ステータスラインのタイトル）
pub const APP_NAME: &str = "TextEdit";

/// 1行を組み立てるときのスタイル
#[derive(Debug, Clone, Copy)]
pub struct LineStyles {
    pub base: Style,
    pub selection: Style,
    pub highlight: Style,
}

/// 画面描画器
#[derive(Debug)]
pub struct Renderer {
    theme: Theme,
    tab_width: usize,
    viewports: HashMap<EditorId, Viewport>,
    search_scroll: usize,
    /// 直近に描画したアクティブペインのテキスト高さ
    page_height: usize,
    /// 直近に描画したペイン領域とタブ位置（マウス判定用）
    pane_areas: Vec<PaneArea>,
    explorer_area: Option<Rect>,
}

/// 描画済みペインの領域
#[derive(Debug, Clone)]
struct PaneArea {
    pane: PaneId,
    area: Rect,
    /// (タブ位置, 開始列, 終了列)
    tabs: Vec<(usize, u16, u16)>,
}

/// クリック位置の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTarget {
    Pane { pane: PaneId, tab: Option<usize> },
    Explorer { row: u16 },
}

impl Renderer {
    pub fn new(theme: Theme, tab_width: usize) -> Self {
        Self {
            theme,
            tab_width: tab_width.max(1),
            viewports: HashMap::new(),
            search_scroll: 0,
            page_height: 20,
            pane_areas: Vec::new(),
            explorer_area: None,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// PageUp / PageDown で移動する行数
    pub fn page_height(&self) -> usize {
        self.page_height.max(1)
    }

    /// 画面座標が直近のフレームで何の上にあるか
    pub fn target_at(&self, column: u16, row: u16) -> Option<ScreenTarget> {
        let position = Position::new(column, row);
        if let Some(area) = self.explorer_area.filter(|area| area.contains(position)) {
            return Some(ScreenTarget::Explorer { row: row - area.y });
        }
        let hit = self.pane_areas.iter().find(|hit| hit.area.contains(position))?;
        let tab = if row == hit.area.y {
            let offset = column - hit.area.x;
            hit.tabs
                .iter()
                .find(|(_, start, end)| (*start..*end).contains(&offset))
                .map(|(index, _, _)| *index)
        } else {
            None
        };
        Some(ScreenTarget::Pane { pane: hit.pane, tab })
    }

    /// 閉じたエディタのスクロール位置を捨てる
    pub fn retain_editors(&mut self, keep: impl Fn(EditorId) -> bool) {
        self.viewports.retain(|&editor, _| keep(editor));
    }

    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>, view: View<'_>) -> io::Result<()> {
        terminal.draw(|frame| self.draw(frame, view))?;
        Ok(())
    }

    /// 1フレーム描画
    pub fn draw(&mut self, frame: &mut Frame<'_>, view: View<'_>) {
        let View {
            workspace,
            find,
            search,
            preview,
            explorer,
            prompt,
            message,
            focus,
        } = view;

        let flags = LayoutFlags {
            explorer: explorer.is_visible(),
            preview: preview.is_visible(),
            find_bar_lines: match (find.is_visible(), find.is_replace_visible()) {
                (false, _) => 0,
                (true, false) => 1,
                (true, true) => 2,
            },
            search_panel: search.is_visible(),
        };
        let layout = compute_layout(frame.area(), flags);
        let mut cursor: Option<(u16, u16)> = None;

        self.explorer_area = None;
        self.pane_areas.clear();
        if let Some(area) = layout.explorer {
            self.draw_explorer(frame, area, explorer, focus == Focus::Explorer);
        }

        // 分割ペイン
        let (pane_rects, dividers) = workspace.layout().layout_rects_with_dividers(layout.panes);
        for divider in dividers {
            self.draw_divider(frame, divider);
        }
        let active = workspace.active_pane();
        for (pane, area) in pane_rects {
            let is_active = active == Some(pane);
            let pane_cursor = self.draw_pane(frame, area, pane, workspace, find, is_active);
            if is_active && focus == Focus::Editor {
                cursor = pane_cursor;
            }
        }

        if let (Some(area), Some(document)) = (layout.preview, workspace.current_document()) {
            let block = Block::default()
                .borders(Borders::LEFT)
                .border_style(self.theme.style(ComponentType::Border))
                .title(" Preview ");
            let inner = block.inner(area);
            let lines = render_lines(document.text(), &self.theme);
            preview.follow_cursor(document, lines.len(), inner.height as usize);
            let paragraph = Paragraph::new(lines)
                .block(block)
                .style(self.theme.style(ComponentType::PreviewText))
                .wrap(Wrap { trim: false })
                .scroll((preview.scroll(), 0));
            frame.render_widget(Clear, area);
            frame.render_widget(paragraph, area);
        }

        if let Some(area) = layout.search_panel {
            self.draw_search_panel(frame, area, search, focus == Focus::SearchPanel);
        }

        if let Some(area) = layout.find_bar {
            let find_cursor = self.draw_find_bar(frame, area, find, workspace.current_document());
            match focus {
                Focus::FindField => cursor = find_cursor.0,
                Focus::ReplaceField => cursor = find_cursor.1,
                _ => {}
            }
        }

        self.draw_status(frame, layout.status, workspace, message);

        match prompt {
            Some(prompt) => {
                let line = Line::from(vec![
                    Span::styled(
                        prompt.message().to_string(),
                        self.theme.style(ComponentType::Prompt).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(prompt.input(), self.theme.style(ComponentType::Prompt)),
                ]);
                frame.render_widget(
                    Paragraph::new(line).style(self.theme.style(ComponentType::Prompt)),
                    layout.prompt,
                );
                let column = (prompt.cursor_column() as u16).min(layout.prompt.width.saturating_sub(1));
                cursor = Some((layout.prompt.x + column, layout.prompt.y));
            }
            None => {
                let hint = "Ctrl+O Open  Ctrl+S Save  Ctrl+F Find  Ctrl+\\ Split  F1 About  Ctrl+Q Quit";
                frame.render_widget(
                    Paragraph::new(hint).style(self.theme.style(ComponentType::LineNumber)),
                    layout.prompt,
                );
            }
        }

        if let Some((x, y)) = cursor {
            frame.set_cursor_position(Position::new(x, y));
        }
    }

    fn draw_divider(&self, frame: &mut Frame<'_>, area: Rect) {
        let style = self.theme.style(ComponentType::WindowDivider);
        let lines: Vec<Line<'static>> = if area.width == 1 {
            (0..area.height).map(|_| Line::from("│")).collect()
        } else {
            vec![Line::from("─".repeat(area.width as usize))]
        };
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).style(style), area);
    }

    /// ペイン（タブバー + テキスト）を描画し、カーソル位置を返す
    fn draw_pane(
        &mut self,
        frame: &mut Frame<'_>,
        area: Rect,
        pane: PaneId,
        workspace: &crate::workspace::Workspace,
        find: &crate::search::FindReplace,
        is_active: bool,
    ) -> Option<(u16, u16)> {
        if area.height == 0 || area.width == 0 {
            return None;
        }
        let tabs = workspace.tabs(pane)?;
        let tab_area = Rect { height: 1, ..area };
        let text_area = Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(1),
            ..area
        };

        // タブバー
        let titles: Vec<(String, bool)> = tabs
            .editors()
            .iter()
            .map(|&id| {
                let title = workspace
                    .document(id)
                    .map(Document::tab_title)
                    .unwrap_or_default();
                (title, Some(id) == tabs.current_editor())
            })
            .collect();
        let (tab_line, tab_ranges) = self.tab_line(&titles, area.width as usize, is_active);
        self.pane_areas.push(PaneArea {
            pane,
            area,
            tabs: tab_ranges,
        });
        frame.render_widget(
            Paragraph::new(tab_line).style(self.theme.style(ComponentType::TabBar)),
            tab_area,
        );

        let editor = tabs.current_editor()?;
        let document = workspace.document(editor)?;
        let height = text_area.height as usize;
        let width = text_area.width as usize;
        if is_active {
            self.page_height = height;
        }

        let (line, column) = document.cursor_line_col();
        let cursor_line = line - 1;
        let line_text = document.line_text(cursor_line).unwrap_or("");
        let cursor_col = display_column(line_text, column - 1, self.tab_width);

        let viewport = self.viewports.entry(editor).or_default();
        viewport.ensure_visible(cursor_line, cursor_col, height, width);
        let viewport = *viewport;

        let styles = LineStyles {
            base: self.theme.style(ComponentType::TextArea),
            selection: self.theme.style(ComponentType::Selection),
            highlight: self.theme.style(ComponentType::SearchMatch),
        };
        let highlights = if is_active { find.highlights(document) } else { Vec::new() };
        let selection = document.selection();

        let mut offset = 0usize;
        let mut lines = Vec::with_capacity(height);
        for (index, text) in document.lines().enumerate() {
            let len = text.chars().count();
            if index >= viewport.top_line() {
                if lines.len() >= height {
                    break;
                }
                lines.push(build_line(
                    text,
                    offset,
                    selection,
                    &highlights,
                    viewport.left_column(),
                    width,
                    self.tab_width,
                    &styles,
                ));
            }
            offset += len + 1;
        }

        frame.render_widget(Clear, text_area);
        frame.render_widget(Paragraph::new(lines).style(styles.base), text_area);

        let row = cursor_line.checked_sub(viewport.top_line())?;
        let col = cursor_col.checked_sub(viewport.left_column())?;
        if row < height && col < width {
            Some((text_area.x + col as u16, text_area.y + row as u16))
        } else {
            None
        }
    }

    fn tab_line(
        &self,
        titles: &[(String, bool)],
        width: usize,
        pane_active: bool,
    ) -> (Line<'static>, Vec<(usize, u16, u16)>) {
        let labels: Vec<String> = titles.iter().map(|(title, _)| format!(" {} ", title)).collect();
        let current = titles.iter().position(|(_, current)| *current).unwrap_or(0);

        // 現在のタブが収まるまで左から省く
        let mut first = 0usize;
        while first < current {
            let used: usize = labels[first..=current]
                .iter()
                .map(|label| label.width() + 1)
                .sum();
            if used <= width {
                break;
            }
            first += 1;
        }

        let mut spans = Vec::new();
        let mut ranges = Vec::new();
        let mut column = 0u16;
        if first > 0 {
            spans.push(Span::styled("«", self.theme.style(ComponentType::TabInactive)));
            column += 1;
        }
        for (index, label) in labels.iter().enumerate().skip(first) {
            let label_width = u16::try_from(label.width()).unwrap_or(u16::MAX);
            let end = column.saturating_add(label_width);
            ranges.push((index, column, end));
            column = end.saturating_add(1);
            let style = if index == current {
                let style = self.theme.style(ComponentType::TabActive);
                if pane_active {
                    style.add_modifier(Modifier::UNDERLINED)
                } else {
                    style
                }
            } else {
                self.theme.style(ComponentType::TabInactive)
            };
            spans.push(Span::styled(label.clone(), style));
            spans.push(Span::styled("│", self.theme.style(ComponentType::TabBar)));
        }
        (Line::from(spans), ranges)
    }

    fn draw_explorer(&mut self, frame: &mut Frame<'_>, area: Rect, explorer: &mut FileTree, focused: bool) {
        let title = explorer
            .root()
            .and_then(|root| root.file_name())
            .map(|name| format!(" {} ", name.to_string_lossy()))
            .unwrap_or_else(|| " Explorer ".to_string());
        let border = if focused {
            ComponentType::ActiveBorder
        } else {
            ComponentType::Border
        };
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(self.theme.style(border))
            .title(title);
        let inner = block.inner(area);
        self.explorer_area = Some(inner);
        let top = explorer.scroll_for(inner.height as usize);
        let selected = explorer.selected();

        let lines: Vec<Line<'static>> = explorer
            .entries()
            .iter()
            .enumerate()
            .skip(top)
            .take(inner.height as usize)
            .map(|(index, entry)| {
                let icon = match (entry.is_dir, entry.is_expanded) {
                    (true, true) => "▾ ",
                    (true, false) => "▸ ",
                    _ => "  ",
                };
                let text = format!("{}{}{}", "  ".repeat(entry.depth), icon, entry.name);
                let style = if index == selected && focused {
                    self.theme.style(ComponentType::ExplorerSelected)
                } else if entry.is_dir {
                    self.theme.style(ComponentType::ExplorerDirectory)
                } else {
                    self.theme.style(ComponentType::ExplorerFile)
                };
                Line::from(Span::styled(text, style))
            })
            .collect();

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_search_panel(&mut self, frame: &mut Frame<'_>, area: Rect, search: &MultiFileSearch, focused: bool) {
        let border = if focused {
            ComponentType::ActiveBorder
        } else {
            ComponentType::Border
        };
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(self.theme.style(border))
            .title(" Find in Files ");
        let inner = block.inner(area);

        let options = search.options();
        let scope = match search.scope() {
            SearchScope::OpenTabs => "open tabs".to_string(),
            SearchScope::Directory(dir) => dir.display().to_string(),
        };
        let header = Line::from(vec![
            Span::styled(
                format!("Find: {}  ", search.query()),
                self.theme.style(ComponentType::FindBar),
            ),
            Span::styled(
                format!("Replace: {}  ", search.replacement()),
                self.theme.style(ComponentType::FindBar),
            ),
            Span::styled(
                format!(
                    "[{}] [{}] [{}]  in {}  ",
                    flag("Aa", options.case_sensitive),
                    flag("W", options.whole_word),
                    flag(".*", options.regex),
                    scope
                ),
                self.theme.style(ComponentType::Info),
            ),
            Span::styled(search.status().to_string(), self.theme.style(ComponentType::Info)),
        ]);

        // 表示行と結果番号の対応
        let mut rows: Vec<(Line<'static>, Option<usize>)> = Vec::new();
        let mut index = 0usize;
        for (label, results) in search.grouped_results() {
            rows.push((
                Line::from(Span::styled(
                    format!("{} ({})", label, results.len()),
                    self.theme.style(ComponentType::ExplorerDirectory),
                )),
                None,
            ));
            for result in results {
                let selected = search.selected() == Some(index);
                let style = if selected && focused {
                    self.theme.style(ComponentType::ExplorerSelected)
                } else {
                    self.theme.style(ComponentType::ExplorerFile)
                };
                rows.push((
                    Line::from(Span::styled(
                        format!("  {}: {}", result.line_number, result.line_text),
                        style,
                    )),
                    Some(index),
                ));
                index += 1;
            }
        }

        let list_height = (inner.height as usize).saturating_sub(1);
        if let Some(selected_row) = rows
            .iter()
            .position(|(_, result)| *result == search.selected() && result.is_some())
        {
            if selected_row < self.search_scroll {
                self.search_scroll = selected_row.saturating_sub(1);
            } else if list_height > 0 && selected_row >= self.search_scroll + list_height {
                self.search_scroll = selected_row + 1 - list_height;
            }
        } else {
            self.search_scroll = 0;
        }

        let mut lines = vec![header];
        lines.extend(
            rows.into_iter()
                .skip(self.search_scroll)
                .take(list_height)
                .map(|(line, _)| line),
        );

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    /// 検索バーを描画し、(検索欄, 置換欄) のカーソル位置を返す
    fn draw_find_bar(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        find: &crate::search::FindReplace,
        document: Option<&Document>,
    ) -> (Option<(u16, u16)>, Option<(u16, u16)>) {
        let style = self.theme.style(ComponentType::FindBar);
        let options = find.options();
        let find_prefix = "Find: ";
        let mut spans = vec![
            Span::styled(find_prefix, style.add_modifier(Modifier::BOLD)),
            Span::styled(find.find_text().to_string(), style),
            Span::styled(
                format!(
                    "  [{}] [{}] [{}]  ",
                    flag("Aa", options.case_sensitive),
                    flag("W", options.whole_word),
                    flag(".*", options.regex)
                ),
                style,
            ),
        ];
        match find.error() {
            Some(error) => spans.push(Span::styled(
                error.to_string(),
                self.theme.style(ComponentType::Error),
            )),
            None => {
                let mut counter = find.clone();
                spans.push(Span::styled(counter.match_count_label(document), style));
            }
        }

        let mut lines = vec![Line::from(spans)];
        let replace_prefix = "Replace: ";
        if find.is_replace_visible() {
            lines.push(Line::from(vec![
                Span::styled(replace_prefix, style.add_modifier(Modifier::BOLD)),
                Span::styled(find.replace_text().to_string(), style),
            ]));
        }
        frame.render_widget(Paragraph::new(lines).style(style), area);

        let max_x = area.width.saturating_sub(1);
        let find_cursor = (
            area.x + ((find_prefix.width() + find.find_text().width()) as u16).min(max_x),
            area.y,
        );
        let replace_cursor = find.is_replace_visible().then(|| {
            (
                area.x + ((replace_prefix.width() + find.replace_text().width()) as u16).min(max_x),
                area.y + 1,
            )
        });
        (Some(find_cursor), replace_cursor)
    }

    fn draw_status(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        workspace: &crate::workspace::Workspace,
        message: Option<&crate::error::ErrorDisplay>,
    ) {
        let base = self.theme.style(ComponentType::StatusLine);
        let document = workspace.current_document();
        let (left, left_style) = match message.filter(|message| !message.is_expired()) {
            Some(message) => {
                let style = match message.level {
                    ErrorLevel::Error => base.patch(self.theme.style(ComponentType::Error)),
                    _ => base,
                };
                (message.message.clone(), style)
            }
            None => (
                document.map(status_position).unwrap_or_default(),
                base,
            ),
        };
        let right = match workspace.current_editor() {
            Some(editor) => {
                let peers = workspace.sync_peers(editor).len();
                let synced = if peers > 0 {
                    format!("[{} synced] ", peers + 1)
                } else {
                    String::new()
                };
                format!("{}{} ", synced, window_title(document))
            }
            None => format!("{} ", APP_NAME),
        };

        let padding = (area.width as usize)
            .saturating_sub(left.width() + right.width() + 1)
            .max(1);
        let line = Line::from(vec![
            Span::styled(format!(" {}", left), left_style),
            Span::styled(" ".repeat(padding), base),
            Span::styled(right, base),
        ]);
        frame.render_widget(Paragraph::new(line).style(base), area);
    }
}

fn flag(label: &str, enabled: bool) -> String {
    if enabled {
        label.to_string()
    } else {
        "-".repeat(label.len())
    }
}

/// `Line L, Column C`
pub fn status_position(document: &Document) -> String {
    let (line, column) = document.cursor_line_col();
    format!("Line {}, Column {}", line, column)
}

/// `name - TextEdit`（ファイルがなければアプリ名のみ）
pub fn window_title(document: Option<&Document>) -> String {
    match document {
        Some(document) if document.path().is_some() => {
            let marker = if document.is_modified() {
                format!("{} ", MODIFIED_MARKER)
            } else {
                String::new()
            };
            format!("{}{} - {}", marker, document.display_name(), APP_NAME)
        }
        _ => APP_NAME.to_string(),
    }
}

fn char_width(ch: char, column: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        tab_width - column % tab_width
    } else {
        ch.width().unwrap_or(0).max(1)
    }
}

/// 文字列の `char_col` 文字目の表示列
pub fn display_column(line: &str, char_col: usize, tab_width: usize) -> usize {
    line.chars()
        .take(char_col)
        .fold(0, |column, ch| column + char_width(ch, column, tab_width))
}

/// 1行分の装飾付きテキストを作る
///
/// `line_start` は行頭の文字位置、`left` と `width` は表示幅単位。
#[allow(clippy::too_many_arguments)]
pub fn build_line(
    text: &str,
    line_start: usize,
    selection: Option<(usize, usize)>,
    highlights: &[(usize, usize)],
    left: usize,
    width: usize,
    tab_width: usize,
    styles: &LineStyles,
) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_style = styles.base;
    let mut column = 0usize;
    let right = left + width;

    for (offset, ch) in text.chars().enumerate() {
        if column >= right {
            break;
        }
        let pos = line_start + offset;
        let w = char_width(ch, column, tab_width);
        let style = if selection.is_some_and(|(start, end)| pos >= start && pos < end) {
            styles.selection
        } else if highlights.iter().any(|&(start, end)| pos >= start && pos < end) {
            styles.highlight
        } else {
            styles.base
        };

        let visible: String = if column + w <= left {
            String::new()
        } else if column < left || column + w > right || ch == '\t' || ch.is_control() {
            // 一部だけ見える文字やタブは空白で埋める
            let from = column.max(left);
            let to = (column + w).min(right);
            " ".repeat(to - from)
        } else {
            ch.to_string()
        };
        column += w;

        if visible.is_empty() {
            continue;
        }
        if style != buffer_style && !buffer.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut buffer), buffer_style));
        }
        buffer_style = style;
        buffer.push_str(&visible);
    }
    if !buffer.is_empty() {
        spans.push(Span::styled(buffer, buffer_style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn styles() -> LineStyles {
        LineStyles {
            base: Style::default(),
            selection: Style::default().bg(Color::Blue),
            highlight: Style::default().bg(Color::Yellow),
        }
    }

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn display_column_expands_tabs_and_wide_chars() {
        assert_eq!(display_column("\tab", 1, 4), 4);
        assert_eq!(display_column("a\tb", 2, 4), 4);
        assert_eq!(display_column("日本", 2, 4), 4);
    }

    #[test]
    fn build_line_splits_styles() {
        let line = build_line("hello world", 10, Some((10, 15)), &[(16, 21)], 0, 80, 4, &styles());
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[0].content, "hello");
        assert_eq!(line.spans[0].style.bg, Some(Color::Blue));
        assert_eq!(line.spans[1].content, " ");
        assert_eq!(line.spans[2].content, "world");
        assert_eq!(line.spans[2].style.bg, Some(Color::Yellow));
    }

    #[test]
    fn build_line_respects_horizontal_scroll() {
        let line = build_line("abcdefghij", 0, None, &[], 3, 4, 4, &styles());
        assert_eq!(text_of(&line), "defg");

        let line = build_line("日本語", 0, None, &[], 1, 4, 4, &styles());
        assert_eq!(text_of(&line), " 本 ");
    }

    #[test]
    fn title_and_position() {
        let document = Document::with_text("ab\ncd");
        assert_eq!(window_title(Some(&document)), APP_NAME);
        assert_eq!(window_title(None), APP_NAME);
        assert_eq!(status_position(&document), "Line 1, Column 1");
    }
}
