use std::fs;
use tempfile::tempdir;
use textedit::search::{MultiFileSearch, SearchScope, SearchSource};
use textedit::workspace::{DialogRequest, NoDialogs, PresetDialogs, Workspace};

fn extensions() -> Vec<String> {
    ["txt", "md"].iter().map(|ext| ext.to_string()).collect()
}

#[test]
fn directory_search_filters_by_extension() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha\nneedle here\n").unwrap();
    fs::write(dir.path().join("b.md"), "Needle\nnothing\nneedle again").unwrap();
    fs::write(dir.path().join("c.bin"), "needle").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("d.txt"), "deep needle").unwrap();

    let workspace = Workspace::new();
    let mut search = MultiFileSearch::new(extensions());
    search.set_scope(SearchScope::Directory(dir.path().to_path_buf()));
    search.set_query("needle");

    assert_eq!(search.find_all(&workspace).unwrap(), 4);
    assert_eq!(search.status(), "Found 4 matches in 3 files");
    assert!(search
        .results()
        .iter()
        .all(|result| !result.label.ends_with("c.bin")));

    search.options_mut().case_sensitive = true;
    assert_eq!(search.find_all(&workspace).unwrap(), 3);
    assert_eq!(search.status(), "Found 3 matches in 3 files");

    search.set_query("alpha");
    assert_eq!(search.find_all(&workspace).unwrap(), 1);
    assert_eq!(search.status(), "Found 1 match in 1 file");

    search.options_mut().whole_word = true;
    search.set_query("needl");
    assert_eq!(search.find_all(&workspace).unwrap(), 0);
    assert_eq!(search.status(), "No matches found");
}

#[test]
fn empty_query_and_bad_root() {
    let workspace = Workspace::new();
    let mut search = MultiFileSearch::new(extensions());
    assert_eq!(search.find_all(&workspace).unwrap(), 0);
    assert_eq!(search.status(), "Please enter search text");

    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();
    search.set_query("x");
    search.set_scope(SearchScope::Directory(file));
    assert!(search.find_all(&workspace).is_err());
}

#[test]
fn open_tabs_scope_searches_unsaved_text() {
    let mut workspace = Workspace::new();
    workspace.edit_current(|doc| doc.insert_str("todo: one\ndone\ntodo: two"));
    let editor = workspace.current_editor().unwrap();

    let mut search = MultiFileSearch::new(extensions());
    search.set_query("todo");
    assert_eq!(search.find_all(&workspace).unwrap(), 2);
    let first = &search.results()[0];
    assert_eq!(first.source, SearchSource::Editor(editor));
    assert_eq!(first.line_number, 1);
    assert_eq!(search.results()[1].line_number, 3);
}

#[test]
fn replace_all_updates_disk_and_open_editors() {
    let dir = tempdir().unwrap();
    let on_disk = dir.path().join("disk.txt");
    let opened = dir.path().join("open.txt");
    fs::write(&on_disk, "foo foo\nbar").unwrap();
    fs::write(&opened, "foo").unwrap();

    let mut workspace = Workspace::new();
    let editor = workspace.open_file_path(&opened).unwrap().unwrap();
    workspace.split_horizontal().unwrap();
    let mirror = workspace.current_editor().unwrap();

    let mut search = MultiFileSearch::new(extensions());
    search.set_scope(SearchScope::Directory(dir.path().to_path_buf()));
    search.set_query("foo");
    search.set_replacement("baz");
    assert_eq!(search.find_all(&workspace).unwrap(), 3);

    // 確認が得られなければ何も書き換えない
    assert_eq!(search.replace_all(&mut workspace, &mut NoDialogs).unwrap(), None);
    assert_eq!(fs::read_to_string(&on_disk).unwrap(), "foo foo\nbar");

    let mut unanswered = PresetDialogs::new();
    assert_eq!(search.replace_all(&mut workspace, &mut unanswered).unwrap(), None);
    assert_eq!(
        unanswered.unanswered(),
        Some(&DialogRequest::Confirm {
            question: "Replace all 3 occurrences?".to_string()
        })
    );

    let mut dialogs = PresetDialogs::new().with_confirmation(true);
    let summary = search.replace_all(&mut workspace, &mut dialogs).unwrap().unwrap();
    assert_eq!(summary.replaced, 3);
    assert_eq!(summary.files, 2);
    assert!(summary.errors.is_empty());
    assert_eq!(search.status(), "Replaced 3 occurrences");

    assert_eq!(fs::read_to_string(&on_disk).unwrap(), "baz baz\nbar");
    // 開いているファイルはエディタ側で置換し、同期相手にも反映される
    assert_eq!(workspace.document(editor).unwrap().text(), "baz");
    assert_eq!(workspace.document(mirror).unwrap().text(), "baz");
    assert!(workspace.document(editor).unwrap().is_modified());
    // ディスク上は未保存のまま
    assert_eq!(fs::read_to_string(&opened).unwrap(), "foo");
}

#[test]
fn replace_selected_only_touches_chosen_hits() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("list.txt");
    fs::write(&path, "cat\ncat\ncat").unwrap();

    let workspace_root = dir.path().to_path_buf();
    let mut workspace = Workspace::new();
    let mut search = MultiFileSearch::new(extensions());
    search.set_scope(SearchScope::Directory(workspace_root));
    search.set_query("cat");
    search.set_replacement("dog");
    search.find_all(&workspace).unwrap();

    let summary = search.replace_selected(&mut workspace, &[1]).unwrap();
    assert_eq!(summary.replaced, 1);
    assert_eq!(search.status(), "Replaced 1 occurrence");
    assert_eq!(fs::read_to_string(&path).unwrap(), "cat\ndog\ncat");
    assert_eq!(search.results().len(), 2);

    let summary = search.replace_selected(&mut workspace, &[]).unwrap();
    assert_eq!(summary.replaced, 0);
    assert_eq!(search.status(), "No results selected");
}

#[test]
fn open_result_jumps_to_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jump.txt");
    fs::write(&path, "zero\none\ntarget line\n").unwrap();

    let mut workspace = Workspace::new();
    let mut search = MultiFileSearch::new(extensions());
    search.set_scope(SearchScope::Directory(dir.path().to_path_buf()));
    search.set_query("target");
    search.find_all(&workspace).unwrap();

    assert!(search.open_result(&mut workspace, 0).unwrap());
    let document = workspace.current_document().unwrap();
    assert_eq!(document.display_name(), "jump.txt");
    assert_eq!(document.cursor_line_col().0, 3);

    assert!(!search.open_result(&mut workspace, 9).unwrap());
}
