//! 設定ファイル
//!
//! `~/.config/textedit/config.json` を読み込み、未指定項目は既定値で補う。

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 検索対象とする既定の拡張子
pub const DEFAULT_SEARCH_EXTENSIONS: &[&str] = &[
    "txt", "py", "js", "java", "cpp", "c", "h", "hpp", "css", "html", "xml", "json", "md", "rst",
    "yaml", "yml",
];

/// テーマ名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

/// エディタ設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// タブ幅（表示用）
    pub tab_width: usize,
    /// 起動時にMarkdownプレビューを表示するか
    pub show_preview: bool,
    /// 起動時にファイルツリーを表示するか
    pub show_explorer: bool,
    /// テーマ
    pub theme: ThemeName,
    /// 複数ファイル検索の対象拡張子（ドットなし）
    pub search_extensions: Vec<String>,
    /// ログレベル（error / warn / info / debug / trace / off）
    pub log_level: String,
    /// ログ出力先（未指定時は `~/.textedit/textedit.log`）
    pub log_file: Option<PathBuf>,
    /// キーバインド上書き（コマンド名 → キー表記）
    pub keybindings: HashMap<String, String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            show_preview: true,
            show_explorer: false,
            theme: ThemeName::Dark,
            search_extensions: DEFAULT_SEARCH_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            log_level: "info".to_string(),
            log_file: None,
            keybindings: HashMap::new(),
        }
    }
}

impl EditorConfig {
    /// 既定の設定ファイルパス
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("textedit").join("config.json"))
    }

    /// 設定ファイルを読み込む（存在しなければ既定値）
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            log::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        let config = Self::from_json(&raw).map_err(|err| match err {
            crate::error::TextEditError::Config(ConfigError::InvalidFile { message, .. }) => {
                ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    message,
                }
                .into()
            }
            other => other,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// JSON文字列から読み込む
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: EditorConfig =
            serde_json::from_str(raw).map_err(|err| ConfigError::InvalidFile {
                path: "<inline>".to_string(),
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tab_width == 0 || self.tab_width > 16 {
            return Err(ConfigError::InvalidValue {
                key: "tab_width".to_string(),
                value: self.tab_width.to_string(),
            }
            .into());
        }
        if self.log_filter().is_none() {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                value: self.log_level.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// ログレベル文字列を解釈
    pub fn log_filter(&self) -> Option<log::LevelFilter> {
        self.log_level.parse().ok()
    }

    /// ログ出力先を解決
    pub fn resolve_log_path(&self) -> Option<PathBuf> {
        match &self.log_file {
            Some(path) => Some(expand_path(&path.to_string_lossy())),
            None => dirs::home_dir().map(|home| home.join(".textedit").join("textedit.log")),
        }
    }
}

/// `~` や環境変数を展開したパスを返す
pub fn expand_path(input: &str) -> PathBuf {
    match shellexpand::full(input) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(input).as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_original_extensions() {
        let config = EditorConfig::default();
        assert!(config.show_preview);
        assert_eq!(config.search_extensions.len(), 16);
        assert!(config.search_extensions.contains(&"md".to_string()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "theme": "light", "tab_width": 2 }"#)
            .expect("valid config");
        assert_eq!(config.theme, ThemeName::Light);
        assert_eq!(config.tab_width, 2);
        assert!(config.show_preview);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(EditorConfig::from_json(r#"{ "tab_width": 0 }"#).is_err());
        assert!(EditorConfig::from_json(r#"{ "log_level": "loud" }"#).is_err());
        assert!(EditorConfig::from_json("not json").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = EditorConfig::load(Some(&dir.path().join("none.json"))).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ broken").unwrap();
        let err = EditorConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn expand_path_handles_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/notes.txt"), home.join("notes.txt"));
        }
        assert_eq!(expand_path("/tmp/a.txt"), PathBuf::from("/tmp/a.txt"));
    }
}
