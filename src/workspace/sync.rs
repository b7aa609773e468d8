//! 同期グループ
//!
//! 同じファイルを開いているエディタを正規化パスでまとめる。
//! テキストの反映そのものは `Workspace` が行う。

use crate::buffer::EditorId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 正規化パス → エディタ集合
#[derive(Debug, Clone, Default)]
pub struct SyncRegistry {
    groups: HashMap<PathBuf, Vec<EditorId>>,
    keys: HashMap<EditorId, PathBuf>,
}

impl SyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// エディタをグループへ登録（既存の所属からは外れる）
    pub fn join(&mut self, editor: EditorId, key: PathBuf) {
        if self.keys.get(&editor) == Some(&key) {
            return;
        }
        self.leave(editor);
        self.groups.entry(key.clone()).or_default().push(editor);
        self.keys.insert(editor, key);
    }

    /// エディタをグループから外す
    pub fn leave(&mut self, editor: EditorId) {
        let Some(key) = self.keys.remove(&editor) else {
            return;
        };
        if let Some(members) = self.groups.get_mut(&key) {
            members.retain(|&id| id != editor);
            if members.is_empty() {
                self.groups.remove(&key);
            }
        }
    }

    /// 所属グループのキー
    pub fn group_of(&self, editor: EditorId) -> Option<&Path> {
        self.keys.get(&editor).map(PathBuf::as_path)
    }

    /// 同じグループの他メンバー（登録順）
    pub fn peers(&self, editor: EditorId) -> Vec<EditorId> {
        self.group_of(editor)
            .and_then(|key| self.groups.get(key))
            .map(|members| members.iter().copied().filter(|&id| id != editor).collect())
            .unwrap_or_default()
    }

    /// キーに属するメンバー
    pub fn members(&self, key: &Path) -> &[EditorId] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len_of(&self, key: &Path) -> usize {
        self.members(key).len()
    }

    /// 複数メンバーを持つグループ数
    pub fn shared_group_count(&self) -> usize {
        self.groups.values().filter(|members| members.len() > 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_and_peers() {
        let mut registry = SyncRegistry::new();
        let key = PathBuf::from("/tmp/a.txt");
        registry.join(EditorId(1), key.clone());
        registry.join(EditorId(2), key.clone());
        registry.join(EditorId(3), PathBuf::from("/tmp/b.txt"));

        assert_eq!(registry.peers(EditorId(1)), vec![EditorId(2)]);
        assert!(registry.peers(EditorId(3)).is_empty());
        assert_eq!(registry.len_of(&key), 2);
        assert_eq!(registry.shared_group_count(), 1);
    }

    #[test]
    fn rejoin_moves_between_groups() {
        let mut registry = SyncRegistry::new();
        let a = PathBuf::from("/tmp/a.txt");
        let b = PathBuf::from("/tmp/b.txt");
        registry.join(EditorId(1), a.clone());
        registry.join(EditorId(2), a.clone());
        registry.join(EditorId(2), b.clone());

        assert_eq!(registry.members(&a), &[EditorId(1)]);
        assert_eq!(registry.members(&b), &[EditorId(2)]);
        assert_eq!(registry.group_of(EditorId(2)), Some(b.as_path()));
    }

    #[test]
    fn leave_drops_empty_groups() {
        let mut registry = SyncRegistry::new();
        let key = PathBuf::from("/tmp/a.txt");
        registry.join(EditorId(1), key.clone());
        registry.leave(EditorId(1));
        registry.leave(EditorId(1));
        assert_eq!(registry.len_of(&key), 0);
        assert_eq!(registry.group_of(EditorId(1)), None);
    }
}
