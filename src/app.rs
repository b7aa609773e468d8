//! メインアプリケーション構造体
//!
//! ワークスペースと各パネルの状態を束ね、キー入力をコマンドへ変換して実行する。
//! ダイアログが必要な操作はプロンプトで答えを集め、`PresetDialogs` で再実行する。

use crate::buffer::{Document, Motion};
use crate::config::{expand_path, EditorConfig};
use crate::error::{ErrorDisplay, ErrorLevel, PaneError, Result, TextEditError, UiError};
use crate::explorer::{FileTree, TreeAction};
use crate::input::{Command, CommandResult, KeyMap};
use crate::preview::MarkdownPreview;
use crate::search::{replaced_label, FindReplace, MultiFileSearch, SearchScope};
use crate::ui::{
    Focus, Prompt, PromptKind, PromptResult, Renderer, ScreenTarget, Theme, View, APP_NAME,
};
use crate::workspace::{
    CloseChoice, DialogRequest, PresetDialogs, Workspace, WorkspaceEvent,
};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::env;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 分割サイズ変更の刻み
const RESIZE_STEP: f32 = 0.05;

/// ダイアログの答えを待っている操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    Open,
    Save,
    SaveAs,
    CloseTab,
    CloseAll,
    CloseSplit,
    Quit,
    /// 複数ファイルの一括置換
    ReplaceInFiles,
}

/// プロンプトで集めた答え
#[derive(Debug, Clone)]
enum DialogAnswer {
    OpenPath(PathBuf),
    SavePath(PathBuf),
    Close(CloseChoice),
    Confirm(bool),
}

pub struct App {
    config: EditorConfig,
    workspace: Workspace,
    keymap: KeyMap,
    find: FindReplace,
    search: MultiFileSearch,
    preview: MarkdownPreview,
    explorer: FileTree,
    renderer: Renderer,
    prompt: Option<Prompt>,
    pending: Option<PendingAction>,
    answers: Vec<DialogAnswer>,
    message: Option<ErrorDisplay>,
    focus: Focus,
    running: bool,
}

impl App {
    pub fn new(config: EditorConfig) -> Self {
        let (keymap, warnings) = KeyMap::with_overrides(&config.keybindings);
        for warning in &warnings {
            log::warn!("{}", warning);
        }

        let mut explorer = FileTree::new(config.show_explorer);
        if config.show_explorer {
            if let Ok(cwd) = env::current_dir() {
                if let Err(err) = explorer.open(&cwd) {
                    log::warn!("failed to open explorer root: {}", err);
                }
            }
        }

        let renderer = Renderer::new(Theme::new(config.theme), config.tab_width);
        let message = warnings
            .first()
            .map(|warning| ErrorDisplay::with_level(warning.clone(), ErrorLevel::Warning));

        Self {
            keymap,
            find: FindReplace::new(),
            search: MultiFileSearch::new(config.search_extensions.clone()),
            preview: MarkdownPreview::new(config.show_preview),
            explorer,
            renderer,
            workspace: Workspace::new(),
            prompt: None,
            pending: None,
            answers: Vec::new(),
            message,
            focus: Focus::Editor,
            running: true,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn find_bar(&self) -> &FindReplace {
        &self.find
    }

    pub fn multi_file_search(&self) -> &MultiFileSearch {
        &self.search
    }

    pub fn preview(&self) -> &MarkdownPreview {
        &self.preview
    }

    pub fn explorer(&self) -> &FileTree {
        &self.explorer
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// ステータスラインのメッセージ
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|message| message.message.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// コマンドラインで渡されたパスを開く
    ///
    /// ディレクトリはファイルツリーのルートにする。失敗はメッセージに残して続行する。
    pub fn open_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            let result = if path.is_dir() {
                self.open_explorer(path)
            } else {
                self.workspace.open_file_path(path).map(|_| ())
            };
            if let Err(err) = result {
                log::warn!("failed to open {}: {}", path.display(), err);
                self.show_error(&err);
            }
        }
        self.process_workspace_events();
    }

    pub fn run(&mut self) -> Result<()> {
        enter_terminal()?;

        let backend = CrosstermBackend::new(stdout());
        let mut terminal =
            Terminal::new(backend).map_err(|err| {
            TextEditError::Ui(UiError::TerminalInit {
                message: err.to_string(),
            })
        })?;

        let loop_result = self.event_loop(&mut terminal);
        let show_cursor_result = terminal
            .show_cursor()
            .map_err(|err| terminal_error("show cursor", err));
        drop(terminal);
        let cleanup_result = leave_terminal();

        loop_result.and(show_cursor_result).and(cleanup_result)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.running {
            if self.message.as_ref().is_some_and(ErrorDisplay::is_expired) {
                self.message = None;
            }
            self.render(terminal)?;

            if event::poll(Duration::from_millis(16)).map_err(|err| terminal_error("event poll", err))? {
                match event::read().map_err(|err| terminal_error("event read", err))? {
                    Event::Key(key_event) => self.handle_key(key_event),
                    Event::Paste(text) => self.handle_paste(&text),
                    Event::Resize(_, _) => {}
                    Event::Mouse(mouse_event) => self.handle_mouse(mouse_event),
                    Event::FocusGained | Event::FocusLost => {}
                }
            }
        }
        log::info!("event loop finished");
        Ok(())
    }

    /// 1フレーム描画
    pub fn render<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let view = View {
            workspace: &self.workspace,
            find: &self.find,
            search: &self.search,
            preview: &mut self.preview,
            explorer: &mut self.explorer,
            prompt: self.prompt.as_ref(),
            message: self.message.as_ref(),
            focus: self.focus,
        };
        self.renderer
            .render(terminal, view)
            .map_err(|err| terminal_error("render", err))
    }

    /// キー入力を処理（エラーはステータスラインに表示する）
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        if let Err(err) = self.dispatch_key(&key_event) {
            log::error!("key {:?} failed: {}", key_event.code, err);
            self.show_error(&err);
        }
        self.process_workspace_events();
    }

    /// マウス入力を処理（左クリックでペイン・タブ・ツリー行を選ぶ）
    ///
    /// 座標は直近に描画したフレームで判定する。
    pub fn handle_mouse(&mut self, mouse_event: MouseEvent) {
        if self.prompt.is_some() {
            return;
        }
        let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind else {
            return;
        };
        match self.renderer.target_at(mouse_event.column, mouse_event.row) {
            Some(ScreenTarget::Pane { pane, tab }) => {
                if self.workspace.on_pane_focused(pane) {
                    if let Some(index) = tab {
                        self.workspace.select_tab(index);
                    }
                    self.focus = Focus::Editor;
                }
            }
            Some(ScreenTarget::Explorer { row }) => {
                self.focus = Focus::Explorer;
                if self.explorer.select_visible_row(row as usize) {
                    if let TreeAction::Open(path) = self.explorer.activate() {
                        match self.workspace.open_file_path(&path) {
                            Ok(_) => self.focus = Focus::Editor,
                            Err(err) => self.show_error(&err),
                        }
                    }
                }
            }
            None => {}
        }
        self.process_workspace_events();
    }

    fn handle_paste(&mut self, text: &str) {
        if self.prompt.is_none() && self.focus == Focus::Editor {
            self.workspace.edit_current(|doc| doc.insert_str(text));
            self.process_workspace_events();
        }
    }

    fn dispatch_key(&mut self, key_event: &KeyEvent) -> Result<()> {
        if self.prompt.is_some() {
            return self.handle_prompt_key(key_event);
        }
        match self.focus {
            Focus::Editor => match self.keymap.resolve(key_event) {
                Some(command) => self.run_command(command),
                None => Ok(()),
            },
            Focus::FindField | Focus::ReplaceField => self.handle_find_key(key_event),
            Focus::Explorer => self.handle_explorer_key(key_event),
            Focus::SearchPanel => self.handle_search_panel_key(key_event),
        }
    }

    /// コマンドを実行し、結果をメッセージへ反映
    pub fn run_command(&mut self, command: Command) -> Result<()> {
        log::debug!("command: {}", command.name());
        let result = self.execute(command)?;
        self.apply_result(result);
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<CommandResult> {
        let result = match command {
            Command::InsertChar(ch) => self.edit(|doc| doc.insert_char(ch)),
            Command::InsertNewline => self.edit(|doc| doc.insert_char('\n')),
            Command::InsertTab => self.edit(|doc| doc.insert_char('\t')),
            Command::DeleteBackward => self.edit_flag(Document::delete_backward),
            Command::DeleteForward => self.edit_flag(Document::delete_forward),
            Command::MoveCursor { motion, extend } => self.edit(|doc| doc.move_cursor(motion, extend)),
            Command::PageUp { extend } => {
                let page = self.renderer.page_height();
                self.edit(|doc| doc.move_cursor(Motion::PageUp(page), extend))
            }
            Command::PageDown { extend } => {
                let page = self.renderer.page_height();
                self.edit(|doc| doc.move_cursor(Motion::PageDown(page), extend))
            }
            Command::Cancel => {
                if self.find.is_visible() {
                    self.find.close();
                } else {
                    self.workspace.edit_current(Document::clear_selection);
                }
                CommandResult::success()
            }

            Command::NewFile => match self.workspace.new_tab() {
                Some(_) => CommandResult::success(),
                None => return Err(PaneError::NoActivePane.into()),
            },
            Command::OpenFile => self.start(PendingAction::Open)?,
            Command::Save => self.start(PendingAction::Save)?,
            Command::SaveAs => self.start(PendingAction::SaveAs)?,
            Command::CloseTab => self.start(PendingAction::CloseTab)?,
            Command::CloseAll => self.start(PendingAction::CloseAll)?,
            Command::Quit => self.start(PendingAction::Quit)?,

            Command::Undo => {
                if self.workspace.edit_current(Document::undo).unwrap_or(false) {
                    CommandResult::success()
                } else {
                    CommandResult::error("Nothing to undo")
                }
            }
            Command::Redo => {
                if self.workspace.edit_current(Document::redo).unwrap_or(false) {
                    CommandResult::success()
                } else {
                    CommandResult::error("Nothing to redo")
                }
            }
            Command::Cut => flag_result(self.workspace.cut()),
            Command::Copy => flag_result(self.workspace.copy()),
            Command::Paste => flag_result(self.workspace.paste()),
            Command::SelectAll => self.edit(Document::select_all),
            Command::SelectWord => self.edit_flag(Document::select_word),
            Command::SelectLine => self.edit(Document::select_line),
            Command::DuplicateLine => self.edit(Document::duplicate_line),
            Command::DeleteLine => self.edit(Document::delete_line),
            Command::MoveLineUp => self.edit_flag(Document::move_line_up),
            Command::MoveLineDown => self.edit_flag(Document::move_line_down),

            Command::Find => {
                self.find.show_find(self.workspace.current_document());
                self.focus = Focus::FindField;
                CommandResult::success()
            }
            Command::Replace => {
                self.find.show_replace(self.workspace.current_document());
                self.focus = Focus::FindField;
                CommandResult::success()
            }
            Command::FindNext => self.find_or_open(true),
            Command::FindPrevious => self.find_or_open(false),
            Command::FindInFiles => {
                self.search.show();
                let query = self.search.query().to_string();
                self.prompt = Some(
                    Prompt::new(PromptKind::SearchQuery, "Find in files: ").with_input(&query),
                );
                CommandResult::success()
            }
            Command::GoToLine => {
                let count = self
                    .workspace
                    .current_document()
                    .map(Document::line_count)
                    .unwrap_or(1);
                self.prompt = Some(Prompt::new(
                    PromptKind::GoToLine,
                    format!("Go to line (1-{}): ", count),
                ));
                CommandResult::success()
            }

            Command::TogglePreview => {
                if self.preview.toggle() {
                    CommandResult::success_with_message("Preview shown")
                } else {
                    CommandResult::success_with_message("Preview hidden")
                }
            }
            Command::ExportPreview => self.export_preview()?,
            Command::ToggleExplorer => {
                if self.explorer.root().is_none() {
                    let cwd = env::current_dir()?;
                    self.explorer.open(&cwd)?;
                }
                if self.explorer.toggle_visible() {
                    self.focus = Focus::Explorer;
                } else if self.focus == Focus::Explorer {
                    self.focus = Focus::Editor;
                }
                CommandResult::success()
            }
            Command::FocusExplorer => {
                if self.explorer.root().is_none() {
                    let cwd = env::current_dir()?;
                    self.explorer.open(&cwd)?;
                }
                if !self.explorer.is_visible() {
                    self.explorer.toggle_visible();
                }
                self.focus = Focus::Explorer;
                CommandResult::success()
            }

            Command::SplitRight => split_result(self.workspace.split_horizontal().is_some())?,
            Command::SplitDown => split_result(self.workspace.split_vertical().is_some())?,
            Command::CloseSplit => {
                if self.workspace.pane_count() <= 1 {
                    CommandResult::error("Cannot close the last pane")
                } else {
                    self.start(PendingAction::CloseSplit)?
                }
            }
            Command::FocusNextSplit => flag_result(self.workspace.focus_next_split()),
            Command::FocusPreviousSplit => flag_result(self.workspace.focus_previous_split()),
            Command::EnlargeSplit => flag_result(self.workspace.resize_active(RESIZE_STEP)),
            Command::ShrinkSplit => flag_result(self.workspace.resize_active(-RESIZE_STEP)),
            Command::BalanceSplits => {
                self.workspace.balance_splits();
                CommandResult::success()
            }

            Command::NextTab => flag_result(self.workspace.next_tab()),
            Command::PreviousTab => flag_result(self.workspace.previous_tab()),

            Command::About => CommandResult::success_with_message(format!(
                "{} {}: split-pane plain-text editor",
                APP_NAME,
                env!("CARGO_PKG_VERSION")
            )),
            Command::Unknown(name) => CommandResult::error(format!("Unknown command: {}", name)),
        };
        Ok(result)
    }

    fn edit(&mut self, f: impl FnOnce(&mut Document)) -> CommandResult {
        match self.workspace.edit_current(f) {
            Some(()) => CommandResult::success(),
            None => CommandResult::noop(),
        }
    }

    fn edit_flag(&mut self, f: impl FnOnce(&mut Document) -> bool) -> CommandResult {
        flag_result(self.workspace.edit_current(f).unwrap_or(false))
    }

    /// 検索語が空なら検索バーを開く
    /// 検索バーが閉じていれば開き、開いていれば次/前を探す
    fn find_or_open(&mut self, forward: bool) -> CommandResult {
        if !self.find.is_visible() {
            self.find.show_find(self.workspace.current_document());
            self.focus = Focus::FindField;
            return CommandResult::success();
        }
        self.step_find(forward)
    }

    fn step_find(&mut self, forward: bool) -> CommandResult {
        let find = &mut self.find;
        let found = self
            .workspace
            .edit_current(|doc| {
                if forward {
                    find.find_next(Some(doc))
                } else {
                    find.find_previous(Some(doc))
                }
            })
            .unwrap_or(false);
        match (found, self.find.error()) {
            (true, _) => CommandResult::success(),
            (false, Some(error)) => CommandResult::error(error.to_string()),
            (false, None) => CommandResult::error("No results"),
        }
    }

    fn export_preview(&mut self) -> Result<CommandResult> {
        let Some(document) = self.workspace.current_document() else {
            return Ok(CommandResult::noop());
        };
        let fallback = env::current_dir()?;
        let path = MarkdownPreview::export_html(document, self.renderer.theme().is_dark(), &fallback)?;
        log::info!("exported preview to {}", path.display());
        Ok(CommandResult::success_with_message(format!(
            "Exported {}",
            path.display()
        )))
    }

    fn open_explorer(&mut self, root: &Path) -> Result<()> {
        self.explorer.open(root)?;
        if !self.explorer.is_visible() {
            self.explorer.toggle_visible();
        }
        Ok(())
    }

    // ---- ダイアログ付き操作 ----

    fn start(&mut self, action: PendingAction) -> Result<CommandResult> {
        self.pending = Some(action);
        self.answers.clear();
        self.resume()
    }

    /// 集めた答えで保留中の操作を再実行
    fn resume(&mut self) -> Result<CommandResult> {
        let Some(action) = self.pending else {
            return Ok(CommandResult::noop());
        };
        let mut dialogs = self
            .answers
            .iter()
            .fold(PresetDialogs::new(), |dialogs, answer| match answer {
                DialogAnswer::OpenPath(path) => dialogs.with_open_path(path.clone()),
                DialogAnswer::SavePath(path) => dialogs.with_save_path(path.clone()),
                DialogAnswer::Close(choice) => dialogs.with_close_choice(*choice),
                DialogAnswer::Confirm(accepted) => dialogs.with_confirmation(*accepted),
            });

        let mut replace_errors = Vec::new();
        let outcome = match action {
            PendingAction::Open => self.workspace.open_file(&mut dialogs).map(|id| id.is_some()),
            PendingAction::Save => self.workspace.save_current(&mut dialogs),
            PendingAction::SaveAs => self.workspace.save_current_as(&mut dialogs),
            PendingAction::CloseTab => self.workspace.close_current_tab(&mut dialogs),
            PendingAction::CloseAll | PendingAction::Quit => self.workspace.close_all_tabs(&mut dialogs),
            PendingAction::CloseSplit => self.workspace.close_split(&mut dialogs),
            PendingAction::ReplaceInFiles => self
                .search
                .replace_all(&mut self.workspace, &mut dialogs)
                .map(|summary| match summary {
                    Some(summary) => {
                        replace_errors = summary.errors;
                        true
                    }
                    None => false,
                }),
        };
        let done = match outcome {
            Ok(done) => done,
            Err(err) => {
                self.clear_pending();
                return Err(err);
            }
        };

        if !done {
            if let Some(request) = dialogs.unanswered().cloned() {
                self.ask(request);
                return Ok(CommandResult::success());
            }
        }
        self.clear_pending();
        if action == PendingAction::ReplaceInFiles && done {
            self.report_replace(&replace_errors);
            return Ok(CommandResult::noop());
        }
        Ok(self.finish(action, done))
    }

    fn finish(&mut self, action: PendingAction, done: bool) -> CommandResult {
        match (action, done) {
            (PendingAction::Quit, true) => CommandResult::quit(),
            (PendingAction::Quit, false) => CommandResult::error("Quit cancelled"),
            (PendingAction::Save | PendingAction::SaveAs, true) => {
                let name = self
                    .workspace
                    .current_document()
                    .map(Document::display_name)
                    .unwrap_or_default();
                CommandResult::success_with_message(format!("Saved {}", name))
            }
            (_, true) => CommandResult::success(),
            (_, false) => CommandResult::noop(),
        }
    }

    fn clear_pending(&mut self) {
        self.pending = None;
        self.answers.clear();
    }

    fn ask(&mut self, request: DialogRequest) {
        let prompt = match request {
            DialogRequest::OpenPath => {
                Prompt::new(PromptKind::OpenPath, "Open file: ").with_input(&self.prompt_directory())
            }
            DialogRequest::SavePath { suggested } => Prompt::new(PromptKind::SavePath, "Save as: ")
                .with_input(&format!("{}{}", self.prompt_directory(), suggested)),
            DialogRequest::ConfirmClose { name } => {
                let message = format!("Save changes to {}? (y)es / (n)o / (c)ancel ", name);
                Prompt::new(PromptKind::ConfirmClose { name }, message)
            }
            DialogRequest::Confirm { question } => {
                Prompt::new(PromptKind::Confirm, format!("{} (y)es / (n)o ", question))
            }
        };
        self.prompt = Some(prompt);
    }

    /// プロンプトの初期ディレクトリ（現在ファイルの場所か作業ディレクトリ）
    fn prompt_directory(&self) -> String {
        self.workspace
            .current_document()
            .and_then(Document::path)
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| env::current_dir().ok())
            .map(|dir| format!("{}/", dir.display()))
            .unwrap_or_default()
    }

    fn handle_prompt_key(&mut self, key_event: &KeyEvent) -> Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        match prompt.handle_key(key_event) {
            PromptResult::InProgress => Ok(()),
            PromptResult::Cancelled => {
                self.prompt = None;
                self.clear_pending();
                self.info("Cancelled");
                Ok(())
            }
            PromptResult::Completed(input) => {
                let kind = prompt.kind().clone();
                self.prompt = None;
                self.complete_prompt(kind, input)
            }
        }
    }

    fn complete_prompt(&mut self, kind: PromptKind, input: String) -> Result<()> {
        let trimmed = input.trim();
        match kind {
            PromptKind::OpenPath => {
                if trimmed.is_empty() {
                    self.clear_pending();
                    return Ok(());
                }
                self.answers = vec![DialogAnswer::OpenPath(expand_path(trimmed))];
                self.resume_and_report()
            }
            PromptKind::SavePath => {
                if trimmed.is_empty() {
                    self.clear_pending();
                    return Ok(());
                }
                self.answers.push(DialogAnswer::SavePath(expand_path(trimmed)));
                self.resume_and_report()
            }
            PromptKind::ConfirmClose { name } => {
                let choice = match trimmed.to_lowercase().as_str() {
                    "y" => CloseChoice::Save,
                    "n" => CloseChoice::Discard,
                    _ => CloseChoice::Cancel,
                };
                if choice == CloseChoice::Cancel {
                    log::debug!("close of {} cancelled", name);
                    let quitting = self.pending == Some(PendingAction::Quit);
                    self.clear_pending();
                    if quitting {
                        self.info("Quit cancelled");
                    }
                    return Ok(());
                }
                // 新しいタブの確認から答えを集め直す
                self.answers = vec![DialogAnswer::Close(choice)];
                self.resume_and_report()
            }
            PromptKind::Confirm => {
                if trimmed.eq_ignore_ascii_case("y") {
                    self.answers.push(DialogAnswer::Confirm(true));
                    self.resume_and_report()
                } else {
                    self.clear_pending();
                    self.info("Cancelled");
                    Ok(())
                }
            }
            PromptKind::GoToLine => {
                let Ok(line) = trimmed.parse::<usize>() else {
                    self.warn(format!("Invalid line number: {}", trimmed));
                    return Ok(());
                };
                let moved = self
                    .workspace
                    .edit_current(|doc| doc.go_to_line(line))
                    .unwrap_or(false);
                if !moved {
                    self.warn(format!("Line {} is out of range", line));
                }
                Ok(())
            }
            PromptKind::SearchQuery => {
                self.search.set_query(&input);
                self.search.show();
                self.focus = Focus::SearchPanel;
                self.run_multi_file_search()
            }
            PromptKind::SearchReplacement => {
                self.search.set_replacement(&input);
                Ok(())
            }
            PromptKind::SearchDirectory => {
                let scope = if trimmed.is_empty() {
                    SearchScope::OpenTabs
                } else {
                    SearchScope::Directory(expand_path(trimmed))
                };
                self.search.set_scope(scope);
                if self.search.query().is_empty() {
                    Ok(())
                } else {
                    self.run_multi_file_search()
                }
            }
            PromptKind::ExplorerRoot => {
                if trimmed.is_empty() {
                    return Ok(());
                }
                self.open_explorer(&expand_path(trimmed))?;
                self.focus = Focus::Explorer;
                Ok(())
            }
        }
    }

    fn resume_and_report(&mut self) -> Result<()> {
        let result = self.resume()?;
        self.apply_result(result);
        Ok(())
    }

    /// コマンド結果をメッセージと終了状態へ反映
    fn apply_result(&mut self, result: CommandResult) {
        if let Some(message) = result.message {
            let level = if result.success {
                ErrorLevel::Info
            } else {
                ErrorLevel::Warning
            };
            self.message = Some(ErrorDisplay::with_level(message, level));
        }
        if result.should_quit {
            self.running = false;
        }
    }

    // ---- 検索バー ----

    fn handle_find_key(&mut self, key_event: &KeyEvent) -> Result<()> {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key_event.modifiers.contains(KeyModifiers::ALT);
        let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);
        let in_replace = self.focus == Focus::ReplaceField;

        match key_event.code {
            KeyCode::Esc => {
                self.find.close();
                self.focus = Focus::Editor;
            }
            KeyCode::Tab | KeyCode::BackTab if self.find.is_replace_visible() => {
                self.focus = if in_replace {
                    Focus::FindField
                } else {
                    Focus::ReplaceField
                };
            }
            KeyCode::Enter if in_replace && (ctrl || alt) => self.replace_all_in_current(),
            KeyCode::Char('a') if alt && self.find.is_replace_visible() => self.replace_all_in_current(),
            KeyCode::Enter if in_replace => {
                let find = &mut self.find;
                let replaced = self
                    .workspace
                    .edit_current(|doc| find.replace(Some(doc)))
                    .unwrap_or(false);
                if !replaced {
                    self.info("No results");
                }
            }
            KeyCode::Enter => {
                let result = self.step_find(!shift);
                if let Some(message) = result.message {
                    self.info(message);
                }
            }
            KeyCode::Char('c') if alt => {
                self.find.toggle_case_sensitive();
                self.refresh_find();
            }
            KeyCode::Char('w') if alt => {
                self.find.toggle_whole_word();
                self.refresh_find();
            }
            KeyCode::Char('r') if alt => {
                self.find.toggle_regex();
                self.refresh_find();
            }
            KeyCode::Backspace => {
                if in_replace {
                    let mut text = self.find.replace_text().to_string();
                    text.pop();
                    self.find.set_replace_text(&text);
                } else {
                    let mut text = self.find.find_text().to_string();
                    text.pop();
                    self.set_find_text(&text);
                }
            }
            KeyCode::Char(ch) if !ctrl && !alt => {
                if in_replace {
                    let text = format!("{}{}", self.find.replace_text(), ch);
                    self.find.set_replace_text(&text);
                } else {
                    let text = format!("{}{}", self.find.find_text(), ch);
                    self.set_find_text(&text);
                }
            }
            _ => return self.run_global_command(key_event),
        }
        Ok(())
    }

    fn set_find_text(&mut self, text: &str) {
        let find = &mut self.find;
        if self
            .workspace
            .edit_current(|doc| find.set_find_text(Some(doc), text))
            .is_none()
        {
            self.find.set_find_text(None, text);
        }
    }

    /// オプション変更後に検索し直す
    fn refresh_find(&mut self) {
        let text = self.find.find_text().to_string();
        self.set_find_text(&text);
    }

    fn replace_all_in_current(&mut self) {
        let find = &mut self.find;
        let count = self
            .workspace
            .edit_current(|doc| find.replace_all(Some(doc)))
            .unwrap_or(0);
        self.info(replaced_label(count));
    }

    /// 入力欄以外で使えるコマンド（編集とカーソル移動は除く）
    fn run_global_command(&mut self, key_event: &KeyEvent) -> Result<()> {
        match self.keymap.resolve(key_event) {
            Some(command) if !is_text_input(&command) => self.run_command(command),
            _ => Ok(()),
        }
    }

    // ---- ファイルツリー ----

    fn handle_explorer_key(&mut self, key_event: &KeyEvent) -> Result<()> {
        match key_event.code {
            KeyCode::Up => self.explorer.move_selection(-1),
            KeyCode::Down => self.explorer.move_selection(1),
            KeyCode::PageUp => self.explorer.move_selection(-(self.renderer.page_height() as isize)),
            KeyCode::PageDown => self.explorer.move_selection(self.renderer.page_height() as isize),
            KeyCode::Enter | KeyCode::Right => {
                if let TreeAction::Open(path) = self.explorer.activate() {
                    self.workspace.open_file_path(&path)?;
                    self.focus = Focus::Editor;
                }
            }
            KeyCode::Left => self.explorer.collapse_or_parent(),
            KeyCode::F(5) => self.explorer.refresh(),
            KeyCode::Char('o') if key_event.modifiers.contains(KeyModifiers::ALT) => {
                let root = self
                    .explorer
                    .root()
                    .map(|root| format!("{}/", root.display()))
                    .unwrap_or_default();
                self.prompt =
                    Some(Prompt::new(PromptKind::ExplorerRoot, "Folder: ").with_input(&root));
            }
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Editor,
            _ => return self.run_global_command(key_event),
        }
        Ok(())
    }

    // ---- 複数ファイル検索 ----

    fn run_multi_file_search(&mut self) -> Result<()> {
        self.search.find_all(&self.workspace)?;
        self.info(self.search.status().to_string());
        Ok(())
    }

    fn handle_search_panel_key(&mut self, key_event: &KeyEvent) -> Result<()> {
        let alt = key_event.modifiers.contains(KeyModifiers::ALT);
        match key_event.code {
            KeyCode::Up => self.search.move_selection(-1),
            KeyCode::Down => self.search.move_selection(1),
            KeyCode::Enter => {
                if let Some(index) = self.search.selected() {
                    if self.search.open_result(&mut self.workspace, index)? {
                        self.focus = Focus::Editor;
                    }
                }
            }
            KeyCode::Esc => {
                self.search.hide();
                self.focus = Focus::Editor;
            }
            KeyCode::Tab => self.focus = Focus::Editor,
            KeyCode::F(5) => self.run_multi_file_search()?,
            KeyCode::Char('f') if alt => {
                let query = self.search.query().to_string();
                self.prompt =
                    Some(Prompt::new(PromptKind::SearchQuery, "Find in files: ").with_input(&query));
            }
            KeyCode::Char('e') if alt => {
                let replacement = self.search.replacement().to_string();
                self.prompt = Some(
                    Prompt::new(PromptKind::SearchReplacement, "Replace with: ").with_input(&replacement),
                );
            }
            KeyCode::Char('d') if alt => {
                let current = match self.search.scope() {
                    SearchScope::OpenTabs => String::new(),
                    SearchScope::Directory(dir) => format!("{}/", dir.display()),
                };
                self.prompt = Some(
                    Prompt::new(PromptKind::SearchDirectory, "Search in folder (empty: open tabs): ")
                        .with_input(&current),
                );
            }
            KeyCode::Char('c') if alt => {
                let options = self.search.options_mut();
                options.case_sensitive = !options.case_sensitive;
                self.run_multi_file_search()?;
            }
            KeyCode::Char('w') if alt => {
                let options = self.search.options_mut();
                options.whole_word = !options.whole_word;
                self.run_multi_file_search()?;
            }
            KeyCode::Char('x') if alt => {
                let options = self.search.options_mut();
                options.regex = !options.regex;
                self.run_multi_file_search()?;
            }
            KeyCode::Char('r') if alt => {
                let selected: Vec<usize> = self.search.selected().into_iter().collect();
                let summary = self.search.replace_selected(&mut self.workspace, &selected)?;
                self.report_replace(&summary.errors);
            }
            KeyCode::Char('a') if alt => {
                let result = self.start(PendingAction::ReplaceInFiles)?;
                self.apply_result(result);
            }
            _ => return self.run_global_command(key_event),
        }
        Ok(())
    }

    fn report_replace(&mut self, errors: &[String]) {
        match errors.first() {
            Some(first) => self.warn(format!("{} ({})", self.search.status(), first)),
            None => self.info(self.search.status().to_string()),
        }
    }

    // ---- イベントとメッセージ ----

    /// ワークスペースのイベントを各パネルへ反映
    fn process_workspace_events(&mut self) {
        for workspace_event in self.workspace.take_events() {
            match workspace_event {
                WorkspaceEvent::FileLoaded(editor) => {
                    if let Some(document) = self.workspace.document(editor) {
                        let name = document.display_name();
                        self.info(format!("Opened {}", name));
                    }
                }
                WorkspaceEvent::ActiveTabsChanged(_) | WorkspaceEvent::PaneRemoved(_) => {
                    let workspace = &self.workspace;
                    self.renderer
                        .retain_editors(|editor| workspace.document(editor).is_some());
                }
                WorkspaceEvent::CurrentEditorChanged(editor) => {
                    log::debug!("current editor: {:?}", editor);
                }
                WorkspaceEvent::ActivePaneChanged(pane) => {
                    log::debug!("active pane: {}", pane);
                }
                WorkspaceEvent::AllTabsClosed(pane) => {
                    log::debug!("all tabs closed in pane {}", pane);
                }
            }
        }
    }

    fn info(&mut self, message: impl Into<String>) {
        self.message = Some(ErrorDisplay::with_level(message, ErrorLevel::Info));
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.message = Some(ErrorDisplay::with_level(message, ErrorLevel::Warning));
    }

    fn show_error(&mut self, error: &TextEditError) {
        self.message = Some(ErrorDisplay::new(error));
    }
}

fn flag_result(done: bool) -> CommandResult {
    if done {
        CommandResult::success()
    } else {
        CommandResult::noop()
    }
}

fn split_result(done: bool) -> Result<CommandResult> {
    if done {
        Ok(CommandResult::success())
    } else {
        Err(PaneError::NoActivePane.into())
    }
}

/// 入力欄にフォーカスがあるとき無視するコマンド
fn is_text_input(command: &Command) -> bool {
    command.is_edit()
        || matches!(
            command,
            Command::MoveCursor { .. }
                | Command::PageUp { .. }
                | Command::PageDown { .. }
                | Command::Cancel
                | Command::SelectAll
                | Command::SelectWord
                | Command::SelectLine
        )
}

fn enter_terminal() -> Result<()> {
    enable_raw_mode().map_err(|err| terminal_error("enable raw mode", err))?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|err| terminal_error("enter alternate screen", err))?;
    Ok(())
}

fn leave_terminal() -> Result<()> {
    let mut out = stdout();
    execute!(out, DisableMouseCapture, LeaveAlternateScreen)
        .map_err(|err| terminal_error("leave alternate screen", err))?;
    disable_raw_mode().map_err(|err| terminal_error("disable raw mode", err))?;
    Ok(())
}

fn terminal_error(context: &str, err: impl std::fmt::Display) -> TextEditError {
    TextEditError::Ui(UiError::RenderingFailed {
        component: format!("{}: {}", context, err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
    }

    fn app() -> App {
        App::new(EditorConfig::default())
    }

    fn current_text(app: &App) -> String {
        app.workspace()
            .current_document()
            .map(|doc| doc.text().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn typing_edits_current_document() {
        let mut app = app();
        type_text(&mut app, "hello");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(current_text(&app), "hell");
        app.handle_key(ctrl('z'));
        assert!(app.workspace().current_document().unwrap().can_redo());
    }

    #[test]
    fn go_to_line_prompt() {
        let mut app = app();
        type_text(&mut app, "a");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "b");
        app.handle_key(ctrl('g'));
        assert!(matches!(app.prompt().map(Prompt::kind), Some(PromptKind::GoToLine)));
        type_text(&mut app, "1");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.prompt().is_none());
        let doc = app.workspace().current_document().unwrap();
        assert_eq!(doc.cursor_line_col(), (1, 1));

        app.handle_key(ctrl('g'));
        type_text(&mut app, "x");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.message(), Some("Invalid line number: x"));
    }

    #[test]
    fn find_bar_receives_typed_text() {
        let mut app = app();
        type_text(&mut app, "one two one");
        app.handle_key(ctrl('f'));
        assert_eq!(app.focus(), Focus::FindField);
        type_text(&mut app, "one");
        assert_eq!(app.find_bar().find_text(), "one");
        assert_eq!(current_text(&app), "one two one");
        let doc = app.workspace().current_document().unwrap();
        assert_eq!(doc.selected_text().as_deref(), Some("one"));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.focus(), Focus::Editor);
        assert!(!app.find_bar().is_visible());

        // 閉じた後の F3 は検索せずにバーを開き直す
        app.handle_key(key(KeyCode::F(3)));
        assert!(app.find_bar().is_visible());
        assert_eq!(app.focus(), Focus::FindField);
        let doc = app.workspace().current_document().unwrap();
        assert_eq!(doc.selection(), Some((0, 3)));
    }

    #[test]
    fn quit_without_changes_stops() {
        let mut app = app();
        app.handle_key(ctrl('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn quit_with_changes_asks_and_can_cancel() {
        let mut app = app();
        type_text(&mut app, "draft");
        app.handle_key(ctrl('q'));
        assert!(app.is_running());
        assert!(matches!(
            app.prompt().map(Prompt::kind),
            Some(PromptKind::ConfirmClose { .. })
        ));

        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.is_running());
        assert!(app.prompt().is_none());
        assert_eq!(current_text(&app), "draft");

        app.handle_key(ctrl('q'));
        app.handle_key(key(KeyCode::Char('n')));
        assert!(!app.is_running());
    }

    #[test]
    fn unknown_command_reports() {
        let mut app = app();
        app.run_command(Command::from_string("no-such-thing")).unwrap();
        assert_eq!(app.message(), Some("Unknown command: no-such-thing"));
    }
}
