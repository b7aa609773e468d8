//! エラーハンドリングシステム
//!
//! TextEdit 全体で使用される統一されたエラー型とユーティリティを定義

use std::time::{Duration, Instant};
use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone)]
pub enum TextEditError {
    /// ファイル操作エラー
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// ペイン操作エラー
    #[error("Pane operation failed: {0}")]
    Pane(#[from] PaneError),

    /// 検索エラー
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    /// UI操作エラー
    #[error("UI operation failed: {0}")]
    Ui(#[from] UiError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("No file path associated with document")]
    NoPath,

    #[error("IO error: {message}")]
    Io { message: String },
}

/// ペイン操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaneError {
    #[error("No active pane")]
    NoActivePane,
}

/// 検索固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid pattern: {message}")]
    InvalidPattern { message: String },

    #[error("Search root is not a directory: {path}")]
    InvalidRoot { path: String },
}

/// UI操作固有のエラー
#[derive(Error, Debug, Clone)]
pub enum UiError {
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    #[error("Rendering failed: {component}")]
    RenderingFailed { component: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid configuration file: {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
}

/// ステータスラインに表示するメッセージ
#[derive(Debug, Clone)]
pub struct ErrorDisplay {
    /// 表示メッセージ
    pub message: String,
    /// レベル
    pub level: ErrorLevel,
    /// 表示開始時刻
    pub start_time: Instant,
    /// 表示持続時間
    pub duration: Duration,
}

impl ErrorDisplay {
    pub fn new(error: &TextEditError) -> Self {
        let (message, level) = Self::format_error(error);
        Self::with_level(message, level)
    }

    /// 任意メッセージから作成
    pub fn with_level(message: impl Into<String>, level: ErrorLevel) -> Self {
        Self {
            message: message.into(),
            level,
            start_time: Instant::now(),
            duration: Duration::from_secs(5),
        }
    }

    fn format_error(error: &TextEditError) -> (String, ErrorLevel) {
        match error {
            TextEditError::File(FileError::NotFound { path }) => {
                (format!("File not found: {}", path), ErrorLevel::Error)
            }
            TextEditError::File(FileError::PermissionDenied { path }) => {
                (format!("Permission denied: {}", path), ErrorLevel::Error)
            }
            TextEditError::File(FileError::Encoding { message }) => {
                (format!("Could not decode file: {}", message), ErrorLevel::Error)
            }
            TextEditError::Search(SearchError::InvalidPattern { message }) => {
                (format!("Invalid pattern: {}", message), ErrorLevel::Warning)
            }
            _ => (format!("Error: {}", error), ErrorLevel::Error),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.start_time.elapsed() >= self.duration
    }
}

/// パニックハンドラの設定
///
/// 端末を通常モードへ戻してからパニック情報を出力する。
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::DisableMouseCapture,
            crossterm::terminal::LeaveAlternateScreen
        );

        let location = panic_info
            .location()
            .unwrap_or_else(|| std::panic::Location::caller());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        log::error!("panic at {}:{}: {}", location.file(), location.line(), message);
        eprintln!("PANIC at {}:{}: {}", location.file(), location.line(), message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());

        std::process::exit(1);
    }));
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, TextEditError>;

/// ファイルモジュール用のResult型
pub mod file {
    pub type Result<T> = std::result::Result<T, super::FileError>;
}

impl FileError {
    /// IOエラーをパス付きで分類
    pub fn from_io(error: std::io::Error, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            std::io::ErrorKind::InvalidData => FileError::Encoding {
                message: format!("{}: {}", path, error),
            },
            _ => FileError::Io {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

// std::io::Error から TextEditError への変換
impl From<std::io::Error> for TextEditError {
    fn from(error: std::io::Error) -> Self {
        TextEditError::File(FileError::Io {
            message: error.to_string(),
        })
    }
}

impl From<regex::Error> for SearchError {
    fn from(error: regex::Error) -> Self {
        SearchError::InvalidPattern {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_display_creation() {
        let error = TextEditError::File(FileError::NotFound {
            path: "test.txt".to_string(),
        });
        let display = ErrorDisplay::new(&error);

        assert_eq!(display.level, ErrorLevel::Error);
        assert!(display.message.contains("test.txt"));
        assert!(!display.is_expired());
    }

    #[test]
    fn test_error_display_expiry() {
        let mut display = ErrorDisplay::with_level("saved", ErrorLevel::Info);
        assert!(!display.is_expired());

        // 時間経過をシミュレート
        display.start_time = Instant::now() - Duration::from_secs(6);
        assert!(display.is_expired());
    }

    #[test]
    fn test_io_error_classification() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            FileError::from_io(err, Path::new("a.txt")),
            FileError::NotFound { path: "a.txt".to_string() }
        );

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            FileError::from_io(err, Path::new("b.txt")),
            FileError::PermissionDenied { .. }
        ));
    }

    #[test]
    fn test_regex_error_conversion() {
        let err = regex::Regex::new("(").unwrap_err();
        let search_error: SearchError = err.into();
        assert!(matches!(search_error, SearchError::InvalidPattern { .. }));
    }
}
