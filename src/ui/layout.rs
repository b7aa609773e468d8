//! 画面レイアウト計算
//!
//! サイドバー、分割ペイン、プレビュー、下部の各行の領域を決める。

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// ファイルツリーの最大幅
pub const EXPLORER_WIDTH: u16 = 30;

/// プレビューが占める割合（%）
pub const PREVIEW_PERCENT: u16 = 40;

/// 複数ファイル検索パネルの最大高さ
pub const SEARCH_PANEL_HEIGHT: u16 = 12;

/// どの領域を表示するか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutFlags {
    pub explorer: bool,
    pub preview: bool,
    /// 検索バーの行数（0 / 1 / 2）
    pub find_bar_lines: u16,
    pub search_panel: bool,
}

/// 計算済みの画面領域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub explorer: Option<Rect>,
    pub panes: Rect,
    pub preview: Option<Rect>,
    pub search_panel: Option<Rect>,
    pub find_bar: Option<Rect>,
    pub status: Rect,
    pub prompt: Rect,
}

/// 画面全体からレイアウトを計算
pub fn compute_layout(area: Rect, flags: LayoutFlags) -> ScreenLayout {
    let panel_height = if flags.search_panel {
        SEARCH_PANEL_HEIGHT.min(area.height / 3)
    } else {
        0
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(panel_height),
            Constraint::Length(flags.find_bar_lines),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let main = rows[0];
    let explorer_width = if flags.explorer {
        EXPLORER_WIDTH.min(main.width / 3)
    } else {
        0
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(explorer_width), Constraint::Min(1)])
        .split(main);

    let (panes, preview) = if flags.preview {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(100 - PREVIEW_PERCENT),
                Constraint::Percentage(PREVIEW_PERCENT),
            ])
            .split(columns[1]);
        (split[0], Some(split[1]))
    } else {
        (columns[1], None)
    };

    ScreenLayout {
        explorer: flags.explorer.then_some(columns[0]),
        panes,
        preview,
        search_panel: flags.search_panel.then_some(rows[1]),
        find_bar: (flags.find_bar_lines > 0).then_some(rows[2]),
        status: rows[3],
        prompt: rows[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_layout_uses_full_width() {
        let layout = compute_layout(Rect::new(0, 0, 100, 30), LayoutFlags::default());
        assert_eq!(layout.panes, Rect::new(0, 0, 100, 28));
        assert_eq!(layout.status, Rect::new(0, 28, 100, 1));
        assert_eq!(layout.prompt, Rect::new(0, 29, 100, 1));
        assert!(layout.explorer.is_none());
        assert!(layout.preview.is_none());
    }

    #[test]
    fn all_regions_enabled() {
        let flags = LayoutFlags {
            explorer: true,
            preview: true,
            find_bar_lines: 2,
            search_panel: true,
        };
        let layout = compute_layout(Rect::new(0, 0, 130, 40), flags);

        let explorer = layout.explorer.unwrap();
        assert_eq!(explorer.width, EXPLORER_WIDTH);
        let preview = layout.preview.unwrap();
        assert_eq!(preview.width, 40);
        assert_eq!(layout.panes.width, 60);
        assert_eq!(layout.find_bar.unwrap().height, 2);
        assert_eq!(layout.search_panel.unwrap().height, SEARCH_PANEL_HEIGHT);
        assert_eq!(layout.panes.height, 40 - 12 - 2 - 2);
    }
}
