//! タブグループ
//!
//! 1つのペインが持つエディタの並びと現在タブ。

use crate::buffer::EditorId;

/// ペイン内のタブ列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabGroup {
    editors: Vec<EditorId>,
    current: usize,
}

impl TabGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    pub fn editors(&self) -> &[EditorId] {
        &self.editors
    }

    pub fn current_index(&self) -> Option<usize> {
        if self.editors.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn current_editor(&self) -> Option<EditorId> {
        self.editors.get(self.current).copied()
    }

    pub fn index_of(&self, editor: EditorId) -> Option<usize> {
        self.editors.iter().position(|&id| id == editor)
    }

    pub fn contains(&self, editor: EditorId) -> bool {
        self.index_of(editor).is_some()
    }

    /// 末尾に追加して現在タブにする
    pub fn push(&mut self, editor: EditorId) -> usize {
        self.editors.push(editor);
        self.current = self.editors.len() - 1;
        self.current
    }

    /// 現在タブの直後に追加して現在タブにする
    pub fn insert_after_current(&mut self, editor: EditorId) -> usize {
        let index = if self.editors.is_empty() {
            0
        } else {
            self.current + 1
        };
        self.editors.insert(index, editor);
        self.current = index;
        index
    }

    /// タブを取り除く
    ///
    /// 現在タブより前が消えた場合は現在位置を詰め、
    /// 現在タブ自身が消えた場合は同じ位置（末尾なら一つ前）を選ぶ。
    pub fn remove(&mut self, index: usize) -> Option<EditorId> {
        if index >= self.editors.len() {
            return None;
        }
        let removed = self.editors.remove(index);
        if self.editors.is_empty() {
            self.current = 0;
        } else if index < self.current || self.current >= self.editors.len() {
            self.current = self.current.saturating_sub(1);
        }
        Some(removed)
    }

    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.editors.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// 次のタブへ（末尾から先頭へ折り返す）
    pub fn next_tab(&mut self) -> bool {
        if self.editors.len() <= 1 {
            return false;
        }
        self.current = (self.current + 1) % self.editors.len();
        true
    }

    /// 前のタブへ（先頭から末尾へ折り返す）
    pub fn previous_tab(&mut self) -> bool {
        if self.editors.len() <= 1 {
            return false;
        }
        self.current = (self.current + self.editors.len() - 1) % self.editors.len();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[usize]) -> TabGroup {
        let mut group = TabGroup::new();
        for &id in ids {
            group.push(EditorId(id));
        }
        group
    }

    #[test]
    fn navigation_wraps_around() {
        let mut tabs = group(&[1, 2, 3]);
        assert_eq!(tabs.current_editor(), Some(EditorId(3)));
        assert!(tabs.next_tab());
        assert_eq!(tabs.current_editor(), Some(EditorId(1)));
        assert!(tabs.previous_tab());
        assert_eq!(tabs.current_editor(), Some(EditorId(3)));
    }

    #[test]
    fn navigation_noop_with_single_tab() {
        let mut tabs = group(&[1]);
        assert!(!tabs.next_tab());
        assert!(!tabs.previous_tab());
        assert_eq!(tabs.current_index(), Some(0));
    }

    #[test]
    fn remove_keeps_current_stable() {
        let mut tabs = group(&[1, 2, 3]);
        tabs.set_current(1);
        assert_eq!(tabs.remove(0), Some(EditorId(1)));
        assert_eq!(tabs.current_editor(), Some(EditorId(2)));

        assert_eq!(tabs.remove(1), Some(EditorId(3)));
        assert_eq!(tabs.current_editor(), Some(EditorId(2)));

        assert_eq!(tabs.remove(0), Some(EditorId(2)));
        assert!(tabs.is_empty());
        assert_eq!(tabs.current_editor(), None);
        assert_eq!(tabs.remove(0), None);
    }

    #[test]
    fn removing_current_last_tab_selects_previous() {
        let mut tabs = group(&[1, 2, 3]);
        tabs.remove(2);
        assert_eq!(tabs.current_editor(), Some(EditorId(2)));
    }

    #[test]
    fn insert_after_current() {
        let mut tabs = group(&[1, 2]);
        tabs.set_current(0);
        tabs.insert_after_current(EditorId(9));
        assert_eq!(tabs.editors(), &[EditorId(1), EditorId(9), EditorId(2)]);
        assert_eq!(tabs.current_index(), Some(1));
    }
}
