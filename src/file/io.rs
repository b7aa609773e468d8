//! ファイルI/O操作
//!
//! UTF-8テキストファイルの読み込みと保存機能

use crate::error::file::Result;
use crate::error::FileError;
use std::fs;
use std::path::{Path, PathBuf};

/// ファイルを読み込み、BOM除去と改行コード統一（LF）を行う
pub fn read_text_file(path: &Path) -> Result<String> {
    // ディレクトリではないことを確認
    if path.is_dir() {
        return Err(FileError::InvalidPath {
            path: path.display().to_string(),
        });
    }

    let bytes = fs::read(path).map_err(|err| FileError::from_io(err, path))?;
    let content = String::from_utf8(bytes).map_err(|err| FileError::Encoding {
        message: format!("{}: invalid UTF-8 at byte {}", path.display(), err.utf8_error().valid_up_to()),
    })?;

    Ok(normalize_line_endings(remove_bom(&content)))
}

/// UTF-8 BOM を除去
pub fn remove_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// CRLF / CR を LF に統一
pub fn normalize_line_endings(content: &str) -> String {
    if !content.contains('\r') {
        return content.to_string();
    }
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// 一時ファイル経由でアトミックに保存
///
/// 親ディレクトリが存在しない場合はエラーになる。
pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    let temp_path = temp_path_for(path)?;

    fs::write(&temp_path, content.as_bytes()).map_err(|err| FileError::from_io(err, path))?;

    if let Err(err) = fs::rename(&temp_path, path) {
        // 一時ファイル削除を試行
        let _ = fs::remove_file(&temp_path);
        return Err(FileError::from_io(err, path));
    }

    log::debug!("saved {} ({} bytes)", path.display(), content.len());
    Ok(())
}

fn temp_path_for(original: &Path) -> Result<PathBuf> {
    let invalid = || FileError::InvalidPath {
        path: original.display().to_string(),
    };

    let parent = original.parent().ok_or_else(invalid)?;
    let filename = original.file_name().ok_or_else(invalid)?;
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    if !parent.is_dir() {
        return Err(FileError::NotFound {
            path: parent.display().to_string(),
        });
    }

    // 一意な一時ファイル名生成
    let temp_name = format!(".{}_{}", filename.to_string_lossy(), std::process::id());
    Ok(parent.join(temp_name))
}

/// 同期グループのキーとなる正規化パス
///
/// 存在するファイルは `canonicalize`、存在しない場合は絶対パスを返す。
pub fn canonical_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_strips_bom_and_normalizes_newlines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "\u{feff}one\r\ntwo\rthree\n").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "one\ntwo\nthree\n");
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_text_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }

    #[test]
    fn read_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let err = read_text_file(dir.path()).unwrap_err();
        assert!(matches!(err, FileError::InvalidPath { .. }));
    }

    #[test]
    fn read_binary_is_encoding_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin.dat");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_text_file(&path), Err(FileError::Encoding { .. })));
    }

    #[test]
    fn write_replaces_contents_without_leftover_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_text_file(&path, "first").unwrap();
        write_text_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("out.txt");
        assert!(write_text_file(&path, "x").is_err());
    }

    #[test]
    fn canonical_key_resolves_relative_segments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("k.txt");
        fs::write(&path, "").unwrap();
        let dotted = dir.path().join(".").join("k.txt");
        assert_eq!(canonical_key(&path), canonical_key(&dotted));
    }
}
