//! ワークスペース（分割ペインとタブの管理）
//!
//! すべてのドキュメント、ペイン、分割ツリー、同期グループを所有する。
//! ドキュメントの変更は必ず `edit` 系のメソッドを通し、
//! 同じファイルを開いている他のエディタへ同じ変更を反映する。

pub mod dialogs;
pub mod layout;
pub mod sync;
pub mod tabs;

pub use dialogs::{CloseChoice, DialogRequest, Dialogs, NoDialogs, PresetDialogs};
pub use layout::{PaneId, PaneLayout, SplitOrientation};
pub use sync::SyncRegistry;
pub use tabs::TabGroup;

use crate::buffer::{Clipboard, Document, EditorId};
use crate::error::Result;
use crate::file::{canonical_key, read_text_file};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// UIへ通知するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// アクティブペインの現在エディタが変わった
    CurrentEditorChanged(Option<EditorId>),
    /// アクティブペインが変わった
    ActivePaneChanged(PaneId),
    /// ペインのタブ構成が変わった
    ActiveTabsChanged(PaneId),
    /// ファイルをディスクから読み込んだ
    FileLoaded(EditorId),
    /// ペインの最後のタブが閉じられた
    AllTabsClosed(PaneId),
    /// ペインが分割ツリーから取り除かれた
    PaneRemoved(PaneId),
}

/// 分割ペインコンテナ
#[derive(Debug)]
pub struct Workspace {
    documents: BTreeMap<EditorId, Document>,
    panes: BTreeMap<PaneId, TabGroup>,
    layout: PaneLayout,
    sync: SyncRegistry,
    clipboard: Clipboard,
    active: Option<PaneId>,
    events: Vec<WorkspaceEvent>,
    next_editor: usize,
    next_pane: usize,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// 無題タブを1つ持つ単一ペインで開始
    pub fn new() -> Self {
        let root = PaneId(0);
        let mut workspace = Self {
            documents: BTreeMap::new(),
            panes: BTreeMap::new(),
            layout: PaneLayout::new(root),
            sync: SyncRegistry::new(),
            clipboard: Clipboard::default(),
            active: Some(root),
            events: Vec::new(),
            next_editor: 0,
            next_pane: 1,
        };
        workspace.panes.insert(root, TabGroup::new());
        let editor = workspace.alloc_editor(Document::new());
        if let Some(tabs) = workspace.panes.get_mut(&root) {
            tabs.push(editor);
        }
        workspace
    }

    fn alloc_editor(&mut self, document: Document) -> EditorId {
        let id = EditorId(self.next_editor);
        self.next_editor += 1;
        self.documents.insert(id, document);
        id
    }

    fn alloc_pane(&mut self) -> PaneId {
        let id = PaneId(self.next_pane);
        self.next_pane += 1;
        id
    }

    fn emit(&mut self, event: WorkspaceEvent) {
        log::trace!("workspace event: {:?}", event);
        self.events.push(event);
    }

    fn emit_current_changed(&mut self) {
        let current = self.current_editor();
        self.emit(WorkspaceEvent::CurrentEditorChanged(current));
    }

    /// 溜まったイベントを取り出す
    pub fn take_events(&mut self) -> Vec<WorkspaceEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- 参照系 ----

    pub fn layout(&self) -> &PaneLayout {
        &self.layout
    }

    pub fn active_pane(&self) -> Option<PaneId> {
        self.active
    }

    /// レイアウト順のペイン一覧
    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.layout.leaf_order()
    }

    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    pub fn tabs(&self, pane: PaneId) -> Option<&TabGroup> {
        self.panes.get(&pane)
    }

    pub fn current_editor(&self) -> Option<EditorId> {
        self.active
            .and_then(|pane| self.panes.get(&pane))
            .and_then(TabGroup::current_editor)
    }

    pub fn document(&self, editor: EditorId) -> Option<&Document> {
        self.documents.get(&editor)
    }

    pub fn current_document(&self) -> Option<&Document> {
        self.current_editor().and_then(|id| self.documents.get(&id))
    }

    pub fn editor_count(&self) -> usize {
        self.documents.len()
    }

    pub fn sync_registry(&self) -> &SyncRegistry {
        &self.sync
    }

    /// 同じファイルを開いている他のエディタ
    pub fn sync_peers(&self, editor: EditorId) -> Vec<EditorId> {
        self.sync.peers(editor)
    }

    /// 全エディタ（レイアウト順、ペイン内はタブ順）
    pub fn all_editors(&self) -> Vec<(PaneId, EditorId)> {
        self.layout
            .leaf_order()
            .into_iter()
            .filter_map(|pane| self.panes.get(&pane).map(|tabs| (pane, tabs)))
            .flat_map(|(pane, tabs)| tabs.editors().iter().map(move |&id| (pane, id)))
            .collect()
    }

    /// エディタを含むペイン
    pub fn pane_of(&self, editor: EditorId) -> Option<PaneId> {
        self.panes
            .iter()
            .find(|(_, tabs)| tabs.contains(editor))
            .map(|(&pane, _)| pane)
    }

    /// パスを開いているエディタ（アクティブペインを優先）
    pub fn find_editor_for_path(&self, path: &Path) -> Option<EditorId> {
        let key = canonical_key(path);
        let members = self.sync.members(&key);
        if let Some(tabs) = self.active.and_then(|pane| self.panes.get(&pane)) {
            if let Some(&id) = members.iter().find(|&&id| tabs.contains(id)) {
                return Some(id);
            }
        }
        members.first().copied()
    }

    fn index_for_key(&self, pane: PaneId, key: &Path) -> Option<(usize, EditorId)> {
        let tabs = self.panes.get(&pane)?;
        tabs.editors()
            .iter()
            .enumerate()
            .find(|(_, &id)| self.sync.group_of(id) == Some(key))
            .map(|(index, &id)| (index, id))
    }

    // ---- フォーカス ----

    /// アクティブペインを変更（同じペインや未知のペインなら何もしない）
    pub fn set_active_pane(&mut self, pane: PaneId) -> bool {
        if self.active == Some(pane) || !self.panes.contains_key(&pane) {
            return false;
        }
        self.active = Some(pane);
        self.emit(WorkspaceEvent::ActivePaneChanged(pane));
        self.emit_current_changed();
        true
    }

    /// ペインが入力フォーカスを得たとき（クリックなど）に呼ぶ
    ///
    /// 未知のペインなら false。既にアクティブなら何もせず true を返す。
    pub fn on_pane_focused(&mut self, pane: PaneId) -> bool {
        if !self.panes.contains_key(&pane) {
            return false;
        }
        self.set_active_pane(pane);
        true
    }

    /// エディタを表示しているタブへ切り替え、そのペインをアクティブにする
    pub fn activate_editor(&mut self, editor: EditorId) -> bool {
        let Some(pane) = self.pane_of(editor) else {
            return false;
        };
        if let Some(tabs) = self.panes.get_mut(&pane) {
            if let Some(index) = tabs.index_of(editor) {
                tabs.set_current(index);
            }
        }
        if !self.set_active_pane(pane) {
            self.emit_current_changed();
        }
        true
    }

    pub fn focus_next_split(&mut self) -> bool {
        self.focus_split_by(1)
    }

    pub fn focus_previous_split(&mut self) -> bool {
        self.focus_split_by(-1)
    }

    fn focus_split_by(&mut self, step: isize) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let leaves = self.layout.leaf_order();
        if leaves.len() <= 1 {
            return false;
        }
        let target = match leaves.iter().position(|&id| id == active) {
            Some(pos) => {
                let len = leaves.len() as isize;
                leaves[((pos as isize + step).rem_euclid(len)) as usize]
            }
            None => leaves[0],
        };
        self.set_active_pane(target)
    }

    /// アクティブペインの次のタブへ
    pub fn next_tab(&mut self) -> bool {
        self.with_active_tabs(TabGroup::next_tab)
    }

    /// アクティブペインの前のタブへ
    pub fn previous_tab(&mut self) -> bool {
        self.with_active_tabs(TabGroup::previous_tab)
    }

    /// アクティブペインのタブを指定位置へ切り替え
    pub fn select_tab(&mut self, index: usize) -> bool {
        self.with_active_tabs(|tabs| tabs.set_current(index))
    }

    fn with_active_tabs(&mut self, f: impl FnOnce(&mut TabGroup) -> bool) -> bool {
        let changed = self
            .active
            .and_then(|pane| self.panes.get_mut(&pane))
            .map(f)
            .unwrap_or(false);
        if changed {
            self.emit_current_changed();
        }
        changed
    }

    // ---- 編集と同期 ----

    /// ドキュメントを編集し、変更を同期グループへ反映する
    pub fn edit<R>(&mut self, editor: EditorId, f: impl FnOnce(&mut Document) -> R) -> Option<R> {
        let document = self.documents.get_mut(&editor)?;
        let result = f(document);
        self.propagate(editor);
        Some(result)
    }

    /// 現在エディタを編集
    pub fn edit_current<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> Option<R> {
        let editor = self.current_editor()?;
        self.edit(editor, f)
    }

    pub fn cut(&mut self) -> bool {
        let Some(editor) = self.current_editor() else {
            return false;
        };
        let Some(document) = self.documents.get_mut(&editor) else {
            return false;
        };
        let done = document.cut(&mut self.clipboard);
        self.propagate(editor);
        done
    }

    pub fn copy(&mut self) -> bool {
        let Some(document) = self.current_editor().and_then(|id| self.documents.get(&id)) else {
            return false;
        };
        document.copy(&mut self.clipboard)
    }

    pub fn paste(&mut self) -> bool {
        let Some(editor) = self.current_editor() else {
            return false;
        };
        let Some(document) = self.documents.get_mut(&editor) else {
            return false;
        };
        let done = document.paste(&self.clipboard);
        self.propagate(editor);
        done
    }

    /// 全文を置き換える（変更ありとして同期される）
    pub fn replace_text(&mut self, editor: EditorId, text: &str) -> bool {
        self.edit(editor, |doc| doc.set_text(text)).is_some()
    }

    /// `origin` の未反映の変更を同期グループのメンバーへ適用する
    fn propagate(&mut self, origin: EditorId) {
        let Some(document) = self.documents.get_mut(&origin) else {
            return;
        };
        let changes = document.take_changes();
        if changes.is_empty() {
            return;
        }
        let modified = document.is_modified();
        let peers = self.sync.peers(origin);
        if peers.is_empty() {
            return;
        }

        let origin_text = document.text().to_string();
        for peer in peers {
            let Some(peer_doc) = self.documents.get_mut(&peer) else {
                continue;
            };
            let applied = changes.iter().all(|change| peer_doc.apply_mirrored(change));
            if !applied || peer_doc.text() != origin_text {
                log::warn!("editor {} diverged from {}, resyncing full text", peer, origin);
                peer_doc.resync_text(&origin_text);
            }
            peer_doc.set_modified(modified);
            // 反映分を再送しない
            peer_doc.take_changes();
        }
    }

    fn mark_group_saved(&mut self, editor: EditorId) {
        for peer in self.sync.peers(editor) {
            if let Some(document) = self.documents.get_mut(&peer) {
                document.mark_saved();
            }
        }
    }

    // ---- タブ操作 ----

    /// アクティブペインに無題タブを追加
    pub fn new_tab(&mut self) -> Option<EditorId> {
        let pane = self.active?;
        Some(self.push_tab(pane, Document::new()))
    }

    fn push_tab(&mut self, pane: PaneId, document: Document) -> EditorId {
        let editor = self.alloc_editor(document);
        if let Some(tabs) = self.panes.get_mut(&pane) {
            tabs.push(editor);
        }
        self.emit(WorkspaceEvent::ActiveTabsChanged(pane));
        if self.active == Some(pane) {
            self.emit_current_changed();
        }
        editor
    }

    /// 現在タブが空の無題タブなら再利用し、そうでなければ新しいタブを作る
    fn place_document(&mut self, pane: PaneId, path: &Path, content: &str, modified: bool) -> EditorId {
        let reusable = self
            .panes
            .get(&pane)
            .and_then(TabGroup::current_editor)
            .filter(|id| {
                self.documents
                    .get(id)
                    .is_some_and(Document::is_blank_untitled)
            });

        if let Some(editor) = reusable {
            if let Some(document) = self.documents.get_mut(&editor) {
                document.load_text(content);
                document.set_path(Some(path.to_path_buf()));
                document.set_modified(modified);
            }
            if self.active == Some(pane) {
                self.emit_current_changed();
            }
            return editor;
        }

        let mut document = Document::with_text(content);
        document.set_path(Some(path.to_path_buf()));
        document.set_modified(modified);
        self.push_tab(pane, document)
    }

    /// ファイルを開く
    ///
    /// 既にアクティブペインで開いていればそのタブへ切り替える。
    /// 他のペインで開いている場合はディスクを読まずにその内容を共有する。
    pub fn open_file_path(&mut self, path: &Path) -> Result<Option<EditorId>> {
        let Some(pane) = self.active else {
            return Ok(None);
        };
        let key = canonical_key(path);

        if let Some((index, editor)) = self.index_for_key(pane, &key) {
            self.with_active_tabs(|tabs| tabs.set_current(index));
            return Ok(Some(editor));
        }

        let peer = self.sync.members(&key).first().copied();
        let (content, modified, from_disk) = match peer.and_then(|id| self.documents.get(&id)) {
            Some(document) => (document.text().to_string(), document.is_modified(), false),
            None => (read_text_file(path)?, false, true),
        };

        let editor = self.place_document(pane, path, &content, modified);
        self.sync.join(editor, key);
        if from_disk {
            self.emit(WorkspaceEvent::FileLoaded(editor));
        }
        log::info!("opened {} in pane {} as editor {}", path.display(), pane, editor);
        Ok(Some(editor))
    }

    /// ダイアログでファイルを選んで開く
    pub fn open_file(&mut self, dialogs: &mut dyn Dialogs) -> Result<Option<EditorId>> {
        if self.active.is_none() {
            return Ok(None);
        }
        match dialogs.open_path() {
            Some(path) => self.open_file_path(&path),
            None => Ok(None),
        }
    }

    /// 内容を指定してファイルを開く
    ///
    /// アクティブペインで既に開いていればそのエディタを変更せずに返す。
    /// 他のペインに同期グループがある場合はそのテキストを優先する。
    pub fn open_file_with_content(
        &mut self,
        path: &Path,
        content: &str,
        modified: bool,
    ) -> Option<EditorId> {
        let pane = self.active?;
        let key = canonical_key(path);

        if let Some((index, editor)) = self.index_for_key(pane, &key) {
            self.with_active_tabs(|tabs| tabs.set_current(index));
            return Some(editor);
        }

        let group_state = self
            .sync
            .members(&key)
            .first()
            .and_then(|id| self.documents.get(id))
            .map(|document| (document.text().to_string(), document.is_modified()));
        let (content, modified) = match &group_state {
            Some((text, group_modified)) => (text.as_str(), *group_modified),
            None => (content, modified),
        };

        let editor = self.place_document(pane, path, content, modified);
        self.sync.join(editor, key);
        Some(editor)
    }

    /// 現在エディタを保存（無題なら別名保存）
    pub fn save_current(&mut self, dialogs: &mut dyn Dialogs) -> Result<bool> {
        match self.current_editor() {
            Some(editor) => self.save_editor(editor, dialogs),
            None => Ok(false),
        }
    }

    /// 現在エディタを別名保存
    pub fn save_current_as(&mut self, dialogs: &mut dyn Dialogs) -> Result<bool> {
        match self.current_editor() {
            Some(editor) => self.save_editor_as(editor, dialogs),
            None => Ok(false),
        }
    }

    pub fn save_editor(&mut self, editor: EditorId, dialogs: &mut dyn Dialogs) -> Result<bool> {
        let Some(document) = self.documents.get_mut(&editor) else {
            return Ok(false);
        };
        if document.path().is_none() {
            return self.save_editor_as(editor, dialogs);
        }
        document.save()?;
        self.mark_group_saved(editor);
        Ok(true)
    }

    /// 別名保存し、保存先の同期グループへ移す
    pub fn save_editor_as(&mut self, editor: EditorId, dialogs: &mut dyn Dialogs) -> Result<bool> {
        let Some(document) = self.documents.get_mut(&editor) else {
            return Ok(false);
        };
        let Some(path) = dialogs.save_path(&document.display_name()) else {
            return Ok(false);
        };
        document.save_as(&path)?;
        let text = document.text().to_string();

        self.sync.join(editor, canonical_key(&path));
        // 保存先を開いていた他のエディタは保存内容に揃える
        for peer in self.sync.peers(editor) {
            if let Some(peer_doc) = self.documents.get_mut(&peer) {
                if peer_doc.text() != text {
                    peer_doc.resync_text(&text);
                    peer_doc.take_changes();
                }
                peer_doc.mark_saved();
            }
        }
        log::info!("saved editor {} as {}", editor, path.display());
        Ok(true)
    }

    /// タブを閉じる
    ///
    /// 同期グループの最後の1つで変更がある場合のみ保存を確認する。
    pub fn close_tab(&mut self, pane: PaneId, index: usize, dialogs: &mut dyn Dialogs) -> Result<bool> {
        let Some(editor) = self
            .panes
            .get(&pane)
            .and_then(|tabs| tabs.editors().get(index).copied())
        else {
            return Ok(false);
        };

        let needs_confirm = self
            .documents
            .get(&editor)
            .is_some_and(Document::is_modified)
            && self.sync.peers(editor).is_empty();

        if needs_confirm {
            let name = self
                .documents
                .get(&editor)
                .map(Document::display_name)
                .unwrap_or_default();
            match dialogs.confirm_close(&name) {
                CloseChoice::Save => {
                    if !self.save_editor(editor, dialogs)? {
                        return Ok(false);
                    }
                }
                CloseChoice::Discard => {}
                CloseChoice::Cancel => return Ok(false),
            }
        }

        let now_empty = match self.panes.get_mut(&pane) {
            Some(tabs) => {
                // 保存ダイアログ中にタブ位置が変わっていないか再確認
                let Some(index) = tabs.index_of(editor) else {
                    return Ok(false);
                };
                tabs.remove(index);
                tabs.is_empty()
            }
            None => return Ok(false),
        };
        self.documents.remove(&editor);
        self.sync.leave(editor);
        self.emit(WorkspaceEvent::ActiveTabsChanged(pane));

        if now_empty {
            self.emit(WorkspaceEvent::AllTabsClosed(pane));
            self.handle_empty_pane(pane);
        } else if self.active == Some(pane) {
            self.emit_current_changed();
        }
        Ok(true)
    }

    fn handle_empty_pane(&mut self, pane: PaneId) {
        if self.panes.len() <= 1 {
            // 最後のペインは無題タブで埋める
            self.push_tab(pane, Document::new());
            return;
        }

        self.layout.remove(pane);
        self.panes.remove(&pane);
        self.emit(WorkspaceEvent::PaneRemoved(pane));
        log::debug!("pane {} removed, {} left", pane, self.panes.len());

        if self.active == Some(pane) || self.active.is_none() {
            if let Some(&first) = self.layout.leaf_order().first() {
                self.active = Some(first);
                self.emit(WorkspaceEvent::ActivePaneChanged(first));
                self.emit_current_changed();
            }
        }
    }

    /// アクティブペインの現在タブを閉じる
    pub fn close_current_tab(&mut self, dialogs: &mut dyn Dialogs) -> Result<bool> {
        let Some(pane) = self.active else {
            return Ok(false);
        };
        let Some(index) = self.panes.get(&pane).and_then(TabGroup::current_index) else {
            return Ok(false);
        };
        self.close_tab(pane, index, dialogs)
    }

    /// ペインのタブをすべて閉じる（キャンセルされたら `false`）
    fn close_pane_tabs(&mut self, pane: PaneId, dialogs: &mut dyn Dialogs) -> Result<bool> {
        let count = self.panes.get(&pane).map(TabGroup::len).unwrap_or(0);
        for _ in 0..count {
            if !self.panes.contains_key(&pane) {
                break;
            }
            if !self.close_tab(pane, 0, dialogs)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// すべてのタブを閉じる（終了時）
    pub fn close_all_tabs(&mut self, dialogs: &mut dyn Dialogs) -> Result<bool> {
        for pane in self.layout.leaf_order() {
            if !self.close_pane_tabs(pane, dialogs)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ---- 分割 ----

    /// 左右に分割（Split Right）
    pub fn split_horizontal(&mut self) -> Option<PaneId> {
        self.split(SplitOrientation::Horizontal)
    }

    /// 上下に分割（Split Down）
    pub fn split_vertical(&mut self) -> Option<PaneId> {
        self.split(SplitOrientation::Vertical)
    }

    /// アクティブペインを分割し、新しいペインに現在のファイルを同期表示する
    pub fn split(&mut self, orientation: SplitOrientation) -> Option<PaneId> {
        let active = self.active?;
        let source = self.current_document().map(|document| {
            (
                document.path().map(Path::to_path_buf),
                document.text().to_string(),
                document.is_modified(),
                document.cursor(),
            )
        });

        let pane = self.alloc_pane();
        if !self.layout.split(active, orientation, pane) {
            return None;
        }
        self.panes.insert(pane, TabGroup::new());
        self.set_active_pane(pane);

        match source {
            Some((Some(path), text, modified, cursor)) => {
                if let Some(editor) = self.open_file_with_content(&path, &text, modified) {
                    if let Some(document) = self.documents.get_mut(&editor) {
                        document.set_cursor(cursor);
                    }
                }
            }
            _ => {
                self.new_tab();
            }
        }
        log::info!("split pane {} {:?} into {}", active, orientation, pane);
        Some(pane)
    }

    /// アクティブペインを閉じる（ペインが1つなら何もしない）
    pub fn close_split(&mut self, dialogs: &mut dyn Dialogs) -> Result<bool> {
        let Some(pane) = self.active else {
            return Ok(false);
        };
        if self.panes.len() <= 1 {
            return Ok(false);
        }
        self.close_pane_tabs(pane, dialogs)
    }

    /// アクティブペインの占有率を変更
    pub fn resize_active(&mut self, delta: f32) -> bool {
        match self.active {
            Some(pane) => self.layout.resize(pane, delta),
            None => false,
        }
    }

    pub fn balance_splits(&mut self) {
        self.layout.balance();
    }

    /// 開いているドキュメント（同期グループごとに1つ）
    ///
    /// 戻り値は `(エディタ, 表示用ラベル, パス)`。無題は `Untitled-<id>`。
    pub fn open_documents(&self) -> Vec<(EditorId, String, Option<PathBuf>)> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for (_, editor) in self.all_editors() {
            let Some(document) = self.documents.get(&editor) else {
                continue;
            };
            match self.sync.group_of(editor) {
                Some(key) => {
                    if seen.insert(key.to_path_buf()) {
                        result.push((editor, key.display().to_string(), Some(key.to_path_buf())));
                    }
                }
                None => match document.path() {
                    Some(path) => {
                        result.push((editor, path.display().to_string(), Some(path.to_path_buf())))
                    }
                    None => result.push((editor, format!("Untitled-{}", editor), None)),
                },
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn starts_with_one_pane_and_one_untitled_tab() {
        let workspace = Workspace::new();
        assert_eq!(workspace.pane_count(), 1);
        assert_eq!(workspace.editor_count(), 1);
        let doc = workspace.current_document().unwrap();
        assert!(doc.is_blank_untitled());
    }

    #[test]
    fn edits_mirror_across_sync_group() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut workspace = Workspace::new();
        let first = workspace.open_file_path(&path).unwrap().unwrap();
        workspace.split_horizontal().unwrap();
        let second = workspace.current_editor().unwrap();
        assert_ne!(first, second);
        assert_eq!(workspace.sync_peers(second), vec![first]);

        workspace.edit(second, |doc| {
            doc.set_cursor(5);
            doc.insert_str(" world");
        });

        assert_eq!(workspace.document(first).unwrap().text(), "hello world");
        assert!(workspace.document(first).unwrap().is_modified());

        workspace.edit(first, |doc| doc.undo());
        assert_eq!(workspace.document(second).unwrap().text(), "hello");
        assert!(!workspace.document(second).unwrap().is_modified());
    }

    #[test]
    fn events_report_split_and_focus() {
        let mut workspace = Workspace::new();
        workspace.take_events();
        let pane = workspace.split_vertical().unwrap();
        let events = workspace.take_events();
        assert!(events.contains(&WorkspaceEvent::ActivePaneChanged(pane)));
        assert!(events
            .iter()
            .any(|event| matches!(event, WorkspaceEvent::CurrentEditorChanged(Some(_)))));
    }
}
