use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{backend::TestBackend, Terminal};
use std::fs;
use tempfile::tempdir;
use textedit::ui::{Focus, PromptKind};
use textedit::{App, EditorConfig};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn with_mods(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_key(key(KeyCode::Char(ch)));
    }
}

fn screen(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn quiet_config() -> EditorConfig {
    EditorConfig {
        show_preview: false,
        ..EditorConfig::default()
    }
}

#[test]
fn renders_status_line_and_tab() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.txt");
    fs::write(&path, "hello world").unwrap();

    let mut app = App::new(quiet_config());
    app.open_paths(&[path]);
    app.handle_key(key(KeyCode::End));

    let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
    app.render(&mut terminal).unwrap();
    let text = screen(&terminal);

    assert!(text.contains("hello world"));
    assert!(text.contains("hello.txt"));
    assert!(text.contains("Line 1, Column 12") || text.contains("Opened hello.txt"));
    assert!(text.contains("hello.txt - TextEdit"));
}

#[test]
fn preview_renders_markdown_heading() {
    let mut app = App::new(EditorConfig::default());
    type_text(&mut app, "# Heading");

    let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
    app.render(&mut terminal).unwrap();
    let text = screen(&terminal);
    assert!(text.contains("Preview"));
    assert!(text.matches("Heading").count() >= 2);
}

#[test]
fn split_shows_both_panes_and_sync_marker() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shared.txt");
    fs::write(&path, "shared").unwrap();

    let mut app = App::new(quiet_config());
    app.open_paths(&[path]);
    app.handle_key(with_mods(KeyCode::Char('\\'), KeyModifiers::CONTROL));
    assert_eq!(app.workspace().pane_count(), 2);

    type_text(&mut app, ">");
    let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
    app.render(&mut terminal).unwrap();
    let text = screen(&terminal);
    assert_eq!(text.matches(">shared").count(), 2);
    assert!(text.contains("[2 synced]"));
}

#[test]
fn save_as_prompt_writes_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("out.txt");

    let mut app = App::new(quiet_config());
    type_text(&mut app, "content");
    app.handle_key(with_mods(KeyCode::Char('s'), KeyModifiers::CONTROL));
    assert!(matches!(
        app.prompt().map(|prompt| prompt.kind()),
        Some(PromptKind::SavePath)
    ));

    // 初期入力を消してからパスを入力
    app.handle_key(with_mods(KeyCode::Char('u'), KeyModifiers::CONTROL));
    app.handle_key(key(KeyCode::End));
    type_text(&mut app, &target.display().to_string());
    app.handle_key(key(KeyCode::Enter));

    assert!(app.prompt().is_none());
    assert_eq!(fs::read_to_string(&target).unwrap(), "content");
    assert_eq!(app.message(), Some("Saved out.txt"));
    assert!(!app.workspace().current_document().unwrap().is_modified());
}

#[test]
fn find_in_files_prompt_fills_panel() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "needle").unwrap();

    let mut app = App::new(quiet_config());
    app.open_paths(&[path]);
    app.handle_key(with_mods(
        KeyCode::Char('f'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    ));
    assert!(matches!(
        app.prompt().map(|prompt| prompt.kind()),
        Some(PromptKind::SearchQuery)
    ));
    type_text(&mut app, "needle");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.focus(), Focus::SearchPanel);
    assert_eq!(app.multi_file_search().results().len(), 1);
    assert_eq!(app.message(), Some("Found 1 match in 1 file"));

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.focus(), Focus::Editor);
}

#[test]
fn clicking_a_pane_and_tab_focuses_them() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shared.txt");
    fs::write(&path, "shared").unwrap();

    let mut app = App::new(quiet_config());
    app.open_paths(&[path]);
    let left = app.workspace().active_pane().unwrap();
    let first = app.workspace().current_editor().unwrap();
    app.handle_key(with_mods(KeyCode::Char('\\'), KeyModifiers::CONTROL));
    let right = app.workspace().active_pane().unwrap();
    assert_ne!(left, right);

    let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
    app.render(&mut terminal).unwrap();

    // 左ペインの本文をクリック
    app.handle_mouse(click(2, 3));
    assert_eq!(app.workspace().active_pane(), Some(left));
    assert_eq!(app.focus(), Focus::Editor);

    // 左ペインに2つ目のタブを作り、先頭タブをクリックで戻す
    app.workspace_mut().new_tab().unwrap();
    app.render(&mut terminal).unwrap();
    assert_ne!(app.workspace().current_editor(), Some(first));
    app.handle_mouse(click(3, 0));
    assert_eq!(app.workspace().current_editor(), Some(first));

    // 右クリックは無視する
    let mut right_click = click(60, 3);
    right_click.kind = MouseEventKind::Down(MouseButton::Right);
    app.handle_mouse(right_click);
    assert_eq!(app.workspace().active_pane(), Some(left));
}

fn click(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

#[test]
fn replace_all_in_files_asks_first() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "needle needle").unwrap();

    let mut app = App::new(quiet_config());
    app.open_paths(&[path]);
    app.handle_key(with_mods(
        KeyCode::Char('f'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    ));
    type_text(&mut app, "needle");
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.focus(), Focus::SearchPanel);

    app.handle_key(with_mods(KeyCode::Char('e'), KeyModifiers::ALT));
    type_text(&mut app, "pin");
    app.handle_key(key(KeyCode::Enter));

    // 断ると何も変わらない
    app.handle_key(with_mods(KeyCode::Char('a'), KeyModifiers::ALT));
    assert!(matches!(
        app.prompt().map(|prompt| prompt.kind()),
        Some(PromptKind::Confirm)
    ));
    assert!(app.prompt().unwrap().message().contains("Replace all 2 occurrences?"));
    app.handle_key(key(KeyCode::Char('n')));
    assert!(app.prompt().is_none());
    assert_eq!(app.workspace().current_document().unwrap().text(), "needle needle");

    app.handle_key(with_mods(KeyCode::Char('a'), KeyModifiers::ALT));
    app.handle_key(key(KeyCode::Char('y')));
    assert!(app.prompt().is_none());
    assert_eq!(app.workspace().current_document().unwrap().text(), "pin pin");
    assert_eq!(app.message(), Some("Replaced 2 occurrences"));
}
