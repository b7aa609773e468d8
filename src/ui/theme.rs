//! テーマシステム
//!
//! ダーク/ライトの2テーマと、コンポーネント別のスタイルを管理する。

use crate::config::ThemeName;
use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

/// UIコンポーネントの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// テキストエリア
    TextArea,
    /// 行番号
    LineNumber,
    /// カーソル
    Cursor,
    /// 選択範囲
    Selection,
    /// タブバーの背景
    TabBar,
    /// 現在のタブ
    TabActive,
    /// その他のタブ
    TabInactive,
    /// ステータスライン
    StatusLine,
    /// プロンプト行
    Prompt,
    /// 検索バー
    FindBar,
    /// ボーダー
    Border,
    /// アクティブペインのボーダー
    ActiveBorder,
    /// ペイン間の区切り
    WindowDivider,
    /// エラーメッセージ
    Error,
    /// 情報メッセージ
    Info,
    /// ファイルツリーのディレクトリ
    ExplorerDirectory,
    /// ファイルツリーのファイル
    ExplorerFile,
    /// ファイルツリーの選択行
    ExplorerSelected,
    /// プレビュー本文
    PreviewText,
    /// プレビュー見出し
    PreviewHeading,
    /// プレビューのコード
    PreviewCode,
    /// プレビューの引用
    PreviewQuote,
    /// プレビューのリンク
    PreviewLink,
    /// 検索結果のマッチ部分
    SearchMatch,
}

/// カラー設定
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub foreground: Color,
    pub background: Color,
    pub modifiers: Modifier,
}

impl ColorScheme {
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
            modifiers: Modifier::empty(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers = modifier;
        self
    }

    pub fn to_style(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .bg(self.background)
            .add_modifier(self.modifiers)
    }
}

/// テーマ設定
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    colors: HashMap<ComponentType, ColorScheme>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Dark)
    }
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let mut theme = Self {
            name,
            colors: HashMap::new(),
        };
        match name {
            ThemeName::Dark => theme.set_dark_colors(),
            ThemeName::Light => theme.set_light_colors(),
        }
        theme
    }

    pub fn is_dark(&self) -> bool {
        self.name == ThemeName::Dark
    }

    /// 特定のコンポーネントのスタイルを取得
    pub fn style(&self, component: ComponentType) -> Style {
        self.colors
            .get(&component)
            .map(ColorScheme::to_style)
            .unwrap_or_else(|| self.default_style())
    }

    pub fn set_color(&mut self, component: ComponentType, color_scheme: ColorScheme) {
        self.colors.insert(component, color_scheme);
    }

    pub fn default_style(&self) -> Style {
        match self.name {
            ThemeName::Light => Style::default().fg(Color::Black).bg(Color::White),
            ThemeName::Dark => Style::default().fg(Color::White).bg(Color::Black),
        }
    }

    fn set_light_colors(&mut self) {
        use ComponentType::*;
        let bg = Color::White;
        self.set_color(TextArea, ColorScheme::new(Color::Black, bg));
        self.set_color(LineNumber, ColorScheme::new(Color::DarkGray, Color::Gray));
        self.set_color(Cursor, ColorScheme::new(Color::White, Color::Blue));
        self.set_color(Selection, ColorScheme::new(Color::White, Color::Blue));
        self.set_color(TabBar, ColorScheme::new(Color::Black, Color::Gray));
        self.set_color(
            TabActive,
            ColorScheme::new(Color::Black, bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(TabInactive, ColorScheme::new(Color::DarkGray, Color::Gray));
        self.set_color(StatusLine, ColorScheme::new(Color::White, Color::Blue));
        self.set_color(Prompt, ColorScheme::new(Color::Black, Color::Gray));
        self.set_color(FindBar, ColorScheme::new(Color::Black, Color::Gray));
        self.set_color(Border, ColorScheme::new(Color::DarkGray, bg));
        self.set_color(ActiveBorder, ColorScheme::new(Color::Blue, bg));
        self.set_color(WindowDivider, ColorScheme::new(Color::Gray, Color::Gray));
        self.set_color(
            Error,
            ColorScheme::new(Color::Red, bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(Info, ColorScheme::new(Color::Green, bg));
        self.set_color(
            ExplorerDirectory,
            ColorScheme::new(Color::Blue, bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(ExplorerFile, ColorScheme::new(Color::Black, bg));
        self.set_color(ExplorerSelected, ColorScheme::new(Color::White, Color::Blue));

        // プレビュー（#333333 本文, #0366d6 リンク）
        self.set_color(PreviewText, ColorScheme::new(Color::Rgb(0x33, 0x33, 0x33), bg));
        self.set_color(
            PreviewHeading,
            ColorScheme::new(Color::Rgb(0x1a, 0x1a, 0x1a), bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(
            PreviewCode,
            ColorScheme::new(Color::Rgb(0x33, 0x33, 0x33), Color::Rgb(0xf6, 0xf8, 0xfa)),
        );
        self.set_color(
            PreviewQuote,
            ColorScheme::new(Color::Rgb(0x6a, 0x73, 0x7d), bg).with_modifier(Modifier::ITALIC),
        );
        self.set_color(
            PreviewLink,
            ColorScheme::new(Color::Rgb(0x03, 0x66, 0xd6), bg).with_modifier(Modifier::UNDERLINED),
        );
        self.set_color(SearchMatch, ColorScheme::new(Color::Black, Color::Yellow));
    }

    fn set_dark_colors(&mut self) {
        use ComponentType::*;
        let bg = Color::Black;
        self.set_color(TextArea, ColorScheme::new(Color::White, bg));
        self.set_color(LineNumber, ColorScheme::new(Color::Gray, bg));
        self.set_color(Cursor, ColorScheme::new(Color::Black, Color::White));
        self.set_color(Selection, ColorScheme::new(Color::White, Color::Blue));
        self.set_color(TabBar, ColorScheme::new(Color::Gray, Color::DarkGray));
        self.set_color(
            TabActive,
            ColorScheme::new(Color::White, bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(TabInactive, ColorScheme::new(Color::Gray, Color::DarkGray));
        self.set_color(StatusLine, ColorScheme::new(Color::Black, Color::Gray));
        self.set_color(Prompt, ColorScheme::new(Color::White, Color::DarkGray));
        self.set_color(FindBar, ColorScheme::new(Color::White, Color::DarkGray));
        self.set_color(Border, ColorScheme::new(Color::DarkGray, bg));
        self.set_color(ActiveBorder, ColorScheme::new(Color::LightBlue, bg));
        self.set_color(WindowDivider, ColorScheme::new(Color::Black, Color::DarkGray));
        self.set_color(
            Error,
            ColorScheme::new(Color::LightRed, bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(Info, ColorScheme::new(Color::LightGreen, bg));
        self.set_color(
            ExplorerDirectory,
            ColorScheme::new(Color::LightBlue, bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(ExplorerFile, ColorScheme::new(Color::White, bg));
        self.set_color(ExplorerSelected, ColorScheme::new(Color::Black, Color::White));

        // プレビュー（#d4d4d4 本文, #4a9eff リンク）
        let preview_bg = Color::Rgb(0x1e, 0x1e, 0x1e);
        self.set_color(PreviewText, ColorScheme::new(Color::Rgb(0xd4, 0xd4, 0xd4), preview_bg));
        self.set_color(
            PreviewHeading,
            ColorScheme::new(Color::Rgb(0xe0, 0xe0, 0xe0), preview_bg).with_modifier(Modifier::BOLD),
        );
        self.set_color(
            PreviewCode,
            ColorScheme::new(Color::Rgb(0xd4, 0xd4, 0xd4), Color::Rgb(0x2d, 0x2d, 0x2d)),
        );
        self.set_color(
            PreviewQuote,
            ColorScheme::new(Color::Rgb(0x80, 0x80, 0x80), preview_bg).with_modifier(Modifier::ITALIC),
        );
        self.set_color(
            PreviewLink,
            ColorScheme::new(Color::Rgb(0x4a, 0x9e, 0xff), preview_bg)
                .with_modifier(Modifier::UNDERLINED),
        );
        self.set_color(SearchMatch, ColorScheme::new(Color::Black, Color::Yellow));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_theme_component_styles() {
        let theme = Theme::new(ThemeName::Dark);
        assert!(theme.is_dark());

        let text = theme.style(ComponentType::TextArea);
        assert_eq!(text.fg, Some(Color::White));
        assert_eq!(text.bg, Some(Color::Black));

        let error = theme.style(ComponentType::Error);
        assert_eq!(error.fg, Some(Color::LightRed));
        assert!(error.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn light_theme_uses_light_background() {
        let theme = Theme::new(ThemeName::Light);
        assert!(!theme.is_dark());
        assert_eq!(theme.style(ComponentType::TextArea).bg, Some(Color::White));
        assert_eq!(
            theme.style(ComponentType::PreviewLink).fg,
            Some(Color::Rgb(0x03, 0x66, 0xd6))
        );
    }

    #[test]
    fn color_scheme_modifier() {
        let scheme = ColorScheme::new(Color::Red, Color::Blue).with_modifier(Modifier::BOLD);
        assert_eq!(scheme.foreground, Color::Red);
        assert!(scheme.to_style().add_modifier.contains(Modifier::BOLD));
    }
}
