//! Markdown → 端末表示行 / HTML 変換

use crate::ui::theme::{ComponentType, Theme};
use pulldown_cmark::{html, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// 空ドキュメントで表示する案内文
pub const PLACEHOLDER: &str = "Start typing markdown to see preview...";

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Markdown を装飾付きの行に変換
pub fn render_lines(markdown: &str, theme: &Theme) -> Vec<Line<'static>> {
    if markdown.trim().is_empty() {
        return vec![Line::from(Span::styled(
            PLACEHOLDER,
            theme
                .style(ComponentType::PreviewQuote)
                .add_modifier(Modifier::ITALIC),
        ))];
    }

    let mut writer = LineWriter::new(theme);
    for event in Parser::new_ext(markdown, parser_options()) {
        writer.handle(event);
    }
    writer.finish()
}

/// 行の組み立て状態
struct LineWriter<'t> {
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// リストごとの次の番号（箇条書きは `None`）
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    table_cells: Vec<String>,
    in_table_cell: bool,
    link_target: Option<String>,
}

impl<'t> LineWriter<'t> {
    fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![theme.style(ComponentType::PreviewText)],
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            table_cells: Vec::new(),
            in_table_cell: false,
            link_target: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let next = self.style().patch(patch);
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.in_table_cell {
            if let Some(cell) = self.table_cells.last_mut() {
                cell.push_str(text);
            }
            return;
        }
        if self.current.is_empty() && self.quote_depth > 0 {
            let bar = "│ ".repeat(self.quote_depth);
            self.current
                .push(Span::styled(bar, self.theme.style(ComponentType::PreviewQuote)));
        }
        let style = self.style();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let spans = std::mem::take(&mut self.current);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    let code = self.theme.style(ComponentType::PreviewCode);
                    for line in text.lines() {
                        self.current.push(Span::styled(format!("  {}", line), code));
                        self.flush();
                    }
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => {
                if self.in_table_cell {
                    self.push_text(&code);
                } else {
                    let style = self.theme.style(ComponentType::PreviewCode);
                    self.current.push(Span::styled(code.to_string(), style));
                }
            }
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.blank();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(40),
                    self.theme.style(ComponentType::Border),
                )));
                self.lines.push(Line::default());
            }
            Event::TaskListMarker(done) => self.push_text(if done { "[x] " } else { "[ ] " }),
            Event::Html(raw) | Event::InlineHtml(raw) => self.push_text(&raw),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.blank();
                self.push_style(
                    self.theme
                        .style(ComponentType::PreviewHeading)
                        .add_modifier(heading_modifier(level)),
                );
                let marks = "#".repeat(heading_depth(level));
                self.push_text(&format!("{} ", marks));
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(self.theme.style(ComponentType::PreviewQuote));
            }
            Tag::CodeBlock(kind) => {
                self.blank();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(Line::from(Span::styled(
                            format!("  [{}]", lang),
                            self.theme.style(ComponentType::PreviewQuote),
                        )));
                    }
                }
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{}{}. ", indent, number);
                        *number += 1;
                        marker
                    }
                    _ => format!("{}• ", indent),
                };
                self.push_text(&marker);
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_target = Some(dest_url.to_string());
                self.push_style(self.theme.style(ComponentType::PreviewLink));
            }
            Tag::Image { dest_url, .. } => {
                self.push_text(&format!("[image: {}] ", dest_url));
                self.push_style(self.theme.style(ComponentType::PreviewQuote));
            }
            Tag::Table(_) => self.blank(),
            Tag::TableRow | Tag::TableHead => self.table_cells.clear(),
            Tag::TableCell => {
                self.table_cells.push(String::new());
                self.in_table_cell = true;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.lines.push(Line::default());
                }
            }
            TagEnd::Heading(_) => {
                self.pop_style();
                self.flush();
                self.lines.push(Line::default());
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
                if self.quote_depth == 0 {
                    self.lines.push(Line::default());
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.flush();
                self.lines.push(Line::default());
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.lines.push(Line::default());
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(target) = self.link_target.take() {
                    let style = self.theme.style(ComponentType::PreviewQuote);
                    self.current.push(Span::styled(format!(" <{}>", target), style));
                }
            }
            TagEnd::Image => self.pop_style(),
            TagEnd::TableCell => self.in_table_cell = false,
            TagEnd::TableHead | TagEnd::TableRow => {
                let row = format!("│ {} │", self.table_cells.join(" │ "));
                let style = if matches!(tag, TagEnd::TableHead) {
                    self.theme
                        .style(ComponentType::PreviewText)
                        .add_modifier(Modifier::BOLD)
                } else {
                    self.theme.style(ComponentType::PreviewText)
                };
                self.lines.push(Line::from(Span::styled(row, style)));
                self.table_cells.clear();
            }
            TagEnd::Table => self.lines.push(Line::default()),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_modifier(level: HeadingLevel) -> Modifier {
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 => Modifier::BOLD | Modifier::UNDERLINED,
        _ => Modifier::BOLD,
    }
}

/// カーソル位置 / 文書長（空なら中央）
pub fn scroll_ratio(cursor: usize, len: usize) -> f64 {
    if len == 0 {
        return 0.5;
    }
    (cursor.min(len) as f64) / (len as f64)
}

/// 配色表
struct Palette {
    bg: &'static str,
    text: &'static str,
    code_bg: &'static str,
    border: &'static str,
    heading: &'static str,
    link: &'static str,
    quote: &'static str,
    quote_border: &'static str,
}

const DARK: Palette = Palette {
    bg: "#1e1e1e",
    text: "#d4d4d4",
    code_bg: "#2d2d2d",
    border: "#404040",
    heading: "#e0e0e0",
    link: "#4a9eff",
    quote: "#808080",
    quote_border: "#505050",
};

const LIGHT: Palette = Palette {
    bg: "#ffffff",
    text: "#333333",
    code_bg: "#f6f8fa",
    border: "#eaecef",
    heading: "#1a1a1a",
    link: "#0366d6",
    quote: "#6a737d",
    quote_border: "#dfe2e5",
};

/// エクスポート用スタイルシート
pub fn stylesheet(dark: bool) -> String {
    let p = if dark { &DARK } else { &LIGHT };
    format!(
        r#"body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Ubuntu, sans-serif; line-height: 1.6; padding: 20px; color: {text}; background-color: {bg}; }}
h1, h2, h3, h4, h5, h6 {{ margin-top: 24px; margin-bottom: 16px; font-weight: 600; line-height: 1.25; color: {heading}; }}
h1 {{ font-size: 2em; border-bottom: 1px solid {border}; padding-bottom: 0.3em; }}
h2 {{ font-size: 1.5em; border-bottom: 1px solid {border}; padding-bottom: 0.3em; }}
h3 {{ font-size: 1.25em; }}
code {{ background-color: {code_bg}; padding: 2px 4px; border-radius: 3px; font-family: 'Menlo', 'Monaco', 'Courier New', monospace; font-size: 0.9em; }}
pre {{ background-color: {code_bg}; padding: 16px; border-radius: 6px; overflow: auto; }}
pre code {{ background-color: transparent; padding: 0; }}
blockquote {{ border-left: 4px solid {quote_border}; padding-left: 16px; color: {quote}; margin: 0; }}
a {{ color: {link}; text-decoration: none; }}
a:hover {{ text-decoration: underline; }}
table {{ border-collapse: collapse; width: 100%; }}
table td, table th {{ border: 1px solid {border}; padding: 6px 13px; }}
table th {{ background-color: {code_bg}; font-weight: 600; }}
ul, ol {{ padding-left: 2em; }}
li {{ margin-top: 0.25em; }}
"#,
        text = p.text,
        bg = p.bg,
        heading = p.heading,
        border = p.border,
        code_bg = p.code_bg,
        quote_border = p.quote_border,
        quote = p.quote,
        link = p.link,
    )
}

/// スタイル付きの完全なHTML文書を生成
pub fn to_html(markdown: &str, dark: bool) -> String {
    let mut body = String::new();
    if markdown.trim().is_empty() {
        body.push_str(&format!("<p><em>{}</em></p>\n", PLACEHOLDER));
    } else {
        html::push_html(&mut body, Parser::new_ext(markdown, parser_options()));
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        stylesheet(dark),
        body
    )
}
