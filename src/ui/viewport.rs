//! ビューポート管理
//!
//! エディタごとの表示開始行と水平スクロール位置を管理する。

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// 表示の開始行
    top_line: usize,
    /// 表示の開始列（表示幅単位）
    left_column: usize,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top_line(&self) -> usize {
        self.top_line
    }

    pub fn left_column(&self) -> usize {
        self.left_column
    }

    /// カーソルが画面内に収まるようスクロールする
    ///
    /// 戻り値はスクロールが発生したかどうか
    pub fn ensure_visible(
        &mut self,
        cursor_line: usize,
        cursor_column: usize,
        height: usize,
        width: usize,
    ) -> bool {
        let before = *self;
        let height = height.max(1);
        let width = width.max(1);

        if cursor_line < self.top_line {
            self.top_line = cursor_line;
        } else if cursor_line >= self.top_line + height {
            self.top_line = cursor_line + 1 - height;
        }

        if cursor_column < self.left_column {
            self.left_column = cursor_column;
        } else if cursor_column >= self.left_column + width {
            self.left_column = cursor_column + 1 - width;
        }

        before != *self
    }
}
