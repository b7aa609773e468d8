//! ファイルツリー
//!
//! ルートディレクトリ以下を、展開済みディレクトリに従って平坦な行リストとして保持する。
//! ディレクトリが先、名前は大文字小文字を無視して並べる。

use crate::error::{Result, SearchError};
use std::cmp::Ordering;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// ツリーの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub depth: usize,
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_expanded: bool,
}

/// 行を選択したときの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    /// ファイルを開く
    Open(PathBuf),
    /// ディレクトリを開閉した
    Toggled,
    /// 何もしない
    None,
}

/// ファイルツリーの状態
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    root: Option<PathBuf>,
    entries: Vec<TreeEntry>,
    expanded: HashSet<PathBuf>,
    selected: usize,
    scroll_top: usize,
    visible: bool,
    show_hidden: bool,
}

impl FileTree {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            ..Self::default()
        }
    }

    /// ルートを設定して読み込む
    pub fn open(&mut self, root: &Path) -> Result<()> {
        if !root.is_dir() {
            return Err(SearchError::InvalidRoot {
                path: root.display().to_string(),
            }
            .into());
        }
        self.root = Some(root.to_path_buf());
        self.expanded.clear();
        self.selected = 0;
        self.scroll_top = 0;
        self.refresh();
        log::debug!("explorer root set to {}", root.display());
        Ok(())
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&TreeEntry> {
        self.entries.get(self.selected)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn set_show_hidden(&mut self, show: bool) {
        self.show_hidden = show;
        self.refresh();
    }

    /// ディスクから行リストを作り直す
    pub fn refresh(&mut self) {
        self.entries.clear();
        if let Some(root) = self.root.clone() {
            collect_entries(&root, 0, &self.expanded, self.show_hidden, &mut self.entries);
        }
        if self.selected >= self.entries.len() {
            self.selected = self.entries.len().saturating_sub(1);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    /// 表示中の行（スクロール位置からの相対）を選択する
    pub fn select_visible_row(&mut self, row: usize) -> bool {
        let index = self.scroll_top + row;
        if index >= self.entries.len() {
            return false;
        }
        self.selected = index;
        true
    }

    /// 選択行を決定（ディレクトリは開閉、ファイルはパスを返す）
    pub fn activate(&mut self) -> TreeAction {
        let Some(entry) = self.entries.get(self.selected) else {
            return TreeAction::None;
        };
        if !entry.is_dir {
            return TreeAction::Open(entry.path.clone());
        }
        let path = entry.path.clone();
        if !self.expanded.remove(&path) {
            self.expanded.insert(path);
        }
        self.refresh();
        TreeAction::Toggled
    }

    /// 展開中なら閉じ、そうでなければ親ディレクトリへ移動
    pub fn collapse_or_parent(&mut self) {
        let Some(entry) = self.entries.get(self.selected) else {
            return;
        };
        if entry.is_dir && entry.is_expanded {
            let path = entry.path.clone();
            self.expanded.remove(&path);
            self.refresh();
            return;
        }
        let depth = entry.depth;
        if depth == 0 {
            return;
        }
        if let Some(parent) = self.entries[..self.selected]
            .iter()
            .rposition(|candidate| candidate.depth + 1 == depth && candidate.is_dir)
        {
            self.selected = parent;
        }
    }

    /// 選択行が表示範囲に入るようにスクロール位置を調整して返す
    pub fn scroll_for(&mut self, height: usize) -> usize {
        if height == 0 {
            return self.scroll_top;
        }
        if self.selected < self.scroll_top {
            self.scroll_top = self.selected;
        } else if self.selected >= self.scroll_top + height {
            self.scroll_top = self.selected + 1 - height;
        }
        self.scroll_top
    }
}

fn collect_entries(
    dir: &Path,
    depth: usize,
    expanded: &HashSet<PathBuf>,
    show_hidden: bool,
    out: &mut Vec<TreeEntry>,
) {
    // 直下の子だけを列挙する（隠しファイルの判定は ignore に任せる）
    let mut children: Vec<(String, PathBuf, bool)> = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .hidden(!show_hidden)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("cannot read entry under {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|entry| entry.depth() == 1)
        .map(|entry| {
            let path = entry.into_path();
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let is_dir = path.is_dir();
            (name, path, is_dir)
        })
        .collect();

    children.sort_by(|a, b| match (a.2, b.2) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.0.to_lowercase().cmp(&b.0.to_lowercase()),
    });

    for (name, path, is_dir) in children {
        let is_expanded = is_dir && expanded.contains(&path);
        out.push(TreeEntry {
            depth,
            name,
            path: path.clone(),
            is_dir,
            is_expanded,
        });
        if is_expanded {
            collect_entries(&path, depth + 1, expanded, show_hidden, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(tree: &FileTree) -> Vec<String> {
        tree.entries()
            .iter()
            .map(|entry| format!("{}{}", "  ".repeat(entry.depth), entry.name))
            .collect()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("A.md"), "").unwrap();
        fs::write(dir.path().join(".secret"), "").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("main.rs"), "").unwrap();
        dir
    }

    #[test]
    fn directories_first_case_insensitive_without_hidden() {
        let dir = fixture();
        let mut tree = FileTree::new(true);
        tree.open(dir.path()).unwrap();
        assert_eq!(names(&tree), vec!["src", "A.md", "b.txt"]);

        tree.set_show_hidden(true);
        assert!(names(&tree).contains(&".secret".to_string()));
    }

    #[test]
    fn select_visible_row_respects_bounds() {
        let dir = fixture();
        let mut tree = FileTree::new(true);
        tree.open(dir.path()).unwrap();

        assert!(tree.select_visible_row(2));
        assert_eq!(tree.selected_entry().unwrap().name, "b.txt");
        assert!(!tree.select_visible_row(3));
        assert_eq!(tree.selected(), 2);
    }

    #[test]
    fn activate_expands_and_opens() {
        let dir = fixture();
        let mut tree = FileTree::new(true);
        tree.open(dir.path()).unwrap();

        assert_eq!(tree.activate(), TreeAction::Toggled);
        assert_eq!(names(&tree), vec!["src", "  main.rs", "A.md", "b.txt"]);

        tree.move_selection(1);
        assert_eq!(
            tree.activate(),
            TreeAction::Open(dir.path().join("src").join("main.rs"))
        );

        tree.collapse_or_parent();
        assert_eq!(tree.selected(), 0);
        tree.collapse_or_parent();
        assert_eq!(names(&tree), vec!["src", "A.md", "b.txt"]);
    }

    #[test]
    fn open_rejects_non_directory() {
        let dir = fixture();
        let mut tree = FileTree::default();
        assert!(tree.open(&dir.path().join("b.txt")).is_err());
        assert!(!tree.is_visible());
        assert!(tree.toggle_visible());
    }

    #[test]
    fn scroll_keeps_selection_visible() {
        let dir = fixture();
        let mut tree = FileTree::new(true);
        tree.open(dir.path()).unwrap();
        tree.move_selection(10);
        assert_eq!(tree.selected(), 2);
        assert_eq!(tree.scroll_for(2), 1);
    }
}
