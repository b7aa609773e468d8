//! ロギングシステム
//!
//! 端末はUIが占有するため、ログは JSON Lines 形式でファイルへ出力する。
//! 各モジュールは `log` クレートのマクロを使う。

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// 1行分のログレコード
#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    ts: u128,
    level: &'a str,
    target: &'a str,
    msg: String,
}

/// JSON Lines ファイルロガー
pub struct FileLogger {
    level: log::LevelFilter,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogger {
    /// ログファイルを開く（親ディレクトリは作成する）
    pub fn new(path: PathBuf, level: log::LevelFilter) -> io::Result<Self> {
        ensure_parent_dir(&path)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            level,
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_record(record: &log::Record<'_>) -> serde_json::Result<String> {
        let line = LogRecord {
            ts: timestamp_ms(),
            level: record.level().as_str(),
            target: record.target(),
            msg: record.args().to_string(),
        };
        serde_json::to_string(&line)
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(line) = Self::format_record(record) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// グローバルロガーとして登録
///
/// `TEXTEDIT_LOG` 環境変数が設定されていればレベルを上書きする。
pub fn init(path: PathBuf, level: log::LevelFilter) -> io::Result<()> {
    let level = std::env::var("TEXTEDIT_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(level);

    let logger = FileLogger::new(path, level)?;
    log::set_boxed_logger(Box::new(logger))
        .map_err(|err| io::Error::new(io::ErrorKind::AlreadyExists, err.to_string()))?;
    log::set_max_level(level);
    Ok(())
}

/// 親ディレクトリを作成
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use tempfile::tempdir;

    #[test]
    fn logger_writes_json_lines_and_respects_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("textedit.log");
        let logger = FileLogger::new(path.clone(), log::LevelFilter::Info).unwrap();

        logger.log(
            &log::Record::builder()
                .level(log::Level::Info)
                .target("workspace")
                .args(format_args!("split pane {}", 2))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .target("workspace")
                .args(format_args!("hidden"))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["target"], "workspace");
        assert_eq!(value["msg"], "split pane 2");
    }
}
