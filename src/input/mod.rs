//! 入力処理モジュール
//!
//! キーバインドとコマンド定義を提供

pub mod commands;
pub mod keybinding;

pub use commands::{Command, CommandResult};
pub use keybinding::{Key, KeyCode, KeyMap, KeyModifiers, KeyParseError};
