//! キーバインドシステム
//!
//! crossterm のキーイベントを内部キー表現へ正規化し、コマンドへ解決する。

use super::commands::Command;
use crate::buffer::Motion;
use crossterm::event::{KeyCode as CrosstermKeyCode, KeyEvent, KeyEventKind, KeyModifiers as CrosstermModifiers};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// キー入力の内部表現
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub modifiers: KeyModifiers,
    pub code: KeyCode,
}

/// 修飾キーの組み合わせ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// 基本キーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Esc,
    Unknown,
}

/// キー表記の解析エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key specification")]
    Empty,

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),
}

impl Key {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { modifiers, code }.normalized()
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::default())
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers { ctrl: true, ..KeyModifiers::default() })
    }

    pub fn ctrl_shift(code: KeyCode) -> Self {
        Self::new(
            code,
            KeyModifiers {
                ctrl: true,
                shift: true,
                ..KeyModifiers::default()
            },
        )
    }

    pub fn alt(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers { alt: true, ..KeyModifiers::default() })
    }

    pub fn ctrl_alt(code: KeyCode) -> Self {
        Self::new(
            code,
            KeyModifiers {
                ctrl: true,
                alt: true,
                ..KeyModifiers::default()
            },
        )
    }

    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers { shift: true, ..KeyModifiers::default() })
    }

    /// 英字は小文字 + shift、記号は shift を持たない形にそろえる
    fn normalized(mut self) -> Self {
        if let KeyCode::Char(c) = self.code {
            if c.is_ascii_uppercase() {
                self.code = KeyCode::Char(c.to_ascii_lowercase());
                self.modifiers.shift = true;
            } else if !c.is_ascii_alphabetic() {
                self.modifiers.shift = false;
            }
        }
        self
    }

    /// 挿入可能な文字か
    pub fn insertable_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.modifiers.ctrl && !self.modifiers.alt => {
                if self.modifiers.shift {
                    Some(c.to_ascii_uppercase())
                } else {
                    Some(c)
                }
            }
            _ => None,
        }
    }

    /// `Ctrl+Shift+S` / `Alt+Up` / `F3` 形式を解析
    pub fn parse(spec: &str) -> Result<Self, KeyParseError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(KeyParseError::Empty);
        }

        // 末尾の `+` はキーそのもの
        let (prefix, key_part) = match spec.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match spec.rsplit_once('+') {
                Some((prefix, key)) => (prefix, key),
                None => ("", spec),
            },
        };

        let mut modifiers = KeyModifiers::default();
        for part in prefix.split('+').filter(|part| !part.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "c" => modifiers.ctrl = true,
                "alt" | "meta" | "m" => modifiers.alt = true,
                "shift" | "s" => modifiers.shift = true,
                _ => return Err(KeyParseError::UnknownModifier(part.to_string())),
            }
        }

        let code = match key_part.to_ascii_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "tab" => KeyCode::Tab,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "esc" | "escape" => KeyCode::Esc,
            "space" => KeyCode::Char(' '),
            lower => {
                let mut chars = key_part.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c.to_ascii_lowercase()),
                    _ => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                        Some(n) if (1..=24).contains(&n) => KeyCode::F(n),
                        _ => return Err(KeyParseError::UnknownKey(key_part.to_string())),
                    },
                }
            }
        };

        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            other => write!(f, "{:?}", other),
        }
    }
}

/// crossterm統合
impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = KeyModifiers {
            ctrl: event.modifiers.contains(CrosstermModifiers::CONTROL),
            alt: event.modifiers.contains(CrosstermModifiers::ALT),
            shift: event.modifiers.contains(CrosstermModifiers::SHIFT),
        };

        let code = match event.code {
            CrosstermKeyCode::Char(c) => KeyCode::Char(c),
            CrosstermKeyCode::Enter => KeyCode::Enter,
            CrosstermKeyCode::Backspace => KeyCode::Backspace,
            CrosstermKeyCode::Delete => KeyCode::Delete,
            CrosstermKeyCode::Tab => KeyCode::Tab,
            CrosstermKeyCode::BackTab => {
                modifiers.shift = true;
                KeyCode::Tab
            }
            CrosstermKeyCode::Up => KeyCode::Up,
            CrosstermKeyCode::Down => KeyCode::Down,
            CrosstermKeyCode::Left => KeyCode::Left,
            CrosstermKeyCode::Right => KeyCode::Right,
            CrosstermKeyCode::Home => KeyCode::Home,
            CrosstermKeyCode::End => KeyCode::End,
            CrosstermKeyCode::PageUp => KeyCode::PageUp,
            CrosstermKeyCode::PageDown => KeyCode::PageDown,
            CrosstermKeyCode::F(n) => KeyCode::F(n),
            CrosstermKeyCode::Esc => KeyCode::Esc,
            _ => KeyCode::Unknown,
        };

        Key::new(code, modifiers)
    }
}

/// キー → コマンドの対応表
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<Key, Command>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMap {
    /// 既定のキーバインド
    pub fn new() -> Self {
        let mut map = Self {
            bindings: HashMap::with_capacity(96),
        };
        map.register_defaults();
        map
    }

    /// 設定の上書きを適用（解釈できない項目は警告として返す）
    pub fn with_overrides(overrides: &HashMap<String, String>) -> (Self, Vec<String>) {
        let mut map = Self::new();
        let mut warnings = Vec::new();

        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();
        for (name, spec) in entries {
            let command = Command::from_string(name);
            if let Command::Unknown(_) = command {
                warnings.push(format!("unknown command in keybindings: {}", name));
                continue;
            }
            match Key::parse(spec) {
                Ok(key) => {
                    map.bindings.retain(|_, bound| bound != &command);
                    map.bind(key, command);
                }
                Err(err) => warnings.push(format!("{}: {}", name, err)),
            }
        }

        for warning in &warnings {
            log::warn!("{}", warning);
        }
        (map, warnings)
    }

    pub fn bind(&mut self, key: Key, command: Command) {
        self.bindings.insert(key, command);
    }

    /// コマンドに割り当てられたキー（表示用、最初の1つ）
    pub fn key_for(&self, command: &Command) -> Option<Key> {
        let mut keys: Vec<Key> = self
            .bindings
            .iter()
            .filter(|(_, bound)| *bound == command)
            .map(|(key, _)| *key)
            .collect();
        keys.sort_by_key(|key| key.to_string());
        keys.into_iter().next()
    }

    /// キーイベントをコマンドへ解決
    pub fn resolve(&self, event: &KeyEvent) -> Option<Command> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let key = Key::from(*event);
        if let Some(command) = self.bindings.get(&key) {
            return Some(command.clone());
        }
        if let Some(motion) = motion_for(key.code) {
            if !key.modifiers.alt {
                return Some(Command::MoveCursor {
                    motion: with_ctrl(motion, key.modifiers.ctrl),
                    extend: key.modifiers.shift,
                });
            }
        }
        key.insertable_char().map(Command::InsertChar)
    }

    fn register_defaults(&mut self) {
        use Command::*;
        use KeyCode::*;

        // 入力
        self.bind(Key::plain(Enter), InsertNewline);
        self.bind(Key::plain(Tab), InsertTab);
        self.bind(Key::plain(Backspace), DeleteBackward);
        self.bind(Key::shift(Backspace), DeleteBackward);
        self.bind(Key::plain(Delete), DeleteForward);
        self.bind(Key::plain(Esc), Cancel);
        self.bind(Key::plain(KeyCode::PageUp), Command::PageUp { extend: false });
        self.bind(Key::shift(KeyCode::PageUp), Command::PageUp { extend: true });
        self.bind(Key::plain(KeyCode::PageDown), Command::PageDown { extend: false });
        self.bind(Key::shift(KeyCode::PageDown), Command::PageDown { extend: true });

        // ファイル
        self.bind(Key::ctrl(Char('n')), NewFile);
        self.bind(Key::ctrl(Char('o')), OpenFile);
        self.bind(Key::ctrl(Char('s')), Save);
        self.bind(Key::ctrl_shift(Char('s')), SaveAs);
        self.bind(Key::ctrl(Char('w')), CloseTab);
        self.bind(Key::ctrl_shift(Char('w')), CloseAll);
        self.bind(Key::ctrl(Char('q')), Quit);

        // 編集
        self.bind(Key::ctrl(Char('z')), Undo);
        self.bind(Key::ctrl(Char('y')), Redo);
        self.bind(Key::ctrl_shift(Char('z')), Redo);
        self.bind(Key::ctrl(Char('x')), Cut);
        self.bind(Key::ctrl(Char('c')), Copy);
        self.bind(Key::ctrl(Char('v')), Paste);
        self.bind(Key::ctrl(Char('a')), SelectAll);
        self.bind(Key::ctrl(Char('d')), SelectWord);
        self.bind(Key::ctrl(Char('l')), SelectLine);
        self.bind(Key::ctrl_shift(Char('d')), DuplicateLine);
        self.bind(Key::ctrl_shift(Char('k')), DeleteLine);
        self.bind(Key::alt(Up), MoveLineUp);
        self.bind(Key::alt(Down), MoveLineDown);

        // 検索
        self.bind(Key::ctrl(Char('f')), Find);
        self.bind(Key::plain(F(3)), FindNext);
        self.bind(Key::shift(F(3)), FindPrevious);
        self.bind(Key::ctrl(Char('h')), Replace);
        self.bind(Key::ctrl_shift(Char('f')), FindInFiles);
        self.bind(Key::ctrl(Char('g')), GoToLine);

        // 表示（Ctrl+M / Ctrl+H は端末によって Enter / Backspace になるため Alt 版も置く）
        self.bind(Key::ctrl(Char('m')), TogglePreview);
        self.bind(Key::alt(Char('m')), TogglePreview);
        self.bind(Key::alt(Char('h')), Replace);
        self.bind(Key::ctrl_shift(Char('e')), ExportPreview);
        self.bind(Key::ctrl(Char('b')), ToggleExplorer);
        self.bind(Key::ctrl(Char('e')), FocusExplorer);

        // 分割
        self.bind(Key::ctrl(Char('\\')), SplitRight);
        self.bind(Key::ctrl(Char('|')), SplitDown);
        self.bind(Key::ctrl_shift(Char('x')), CloseSplit);
        self.bind(Key::ctrl_alt(Right), FocusNextSplit);
        self.bind(Key::ctrl_alt(Left), FocusPreviousSplit);
        self.bind(Key::ctrl_alt(Up), EnlargeSplit);
        self.bind(Key::ctrl_alt(Down), ShrinkSplit);
        self.bind(Key::ctrl_alt(Char('=')), BalanceSplits);

        // タブ
        self.bind(Key::ctrl(Tab), NextTab);
        self.bind(Key::ctrl(KeyCode::PageDown), NextTab);
        self.bind(Key::ctrl_shift(Tab), PreviousTab);
        self.bind(Key::ctrl(KeyCode::PageUp), PreviousTab);

        self.bind(Key::plain(F(1)), About);
    }
}

fn motion_for(code: KeyCode) -> Option<Motion> {
    match code {
        KeyCode::Left => Some(Motion::Left),
        KeyCode::Right => Some(Motion::Right),
        KeyCode::Up => Some(Motion::Up),
        KeyCode::Down => Some(Motion::Down),
        KeyCode::Home => Some(Motion::LineStart),
        KeyCode::End => Some(Motion::LineEnd),
        _ => None,
    }
}

/// Ctrl+Home / Ctrl+End は文書の先頭・末尾
fn with_ctrl(motion: Motion, ctrl: bool) -> Motion {
    match (motion, ctrl) {
        (Motion::LineStart, true) => Motion::DocumentStart,
        (Motion::LineEnd, true) => Motion::DocumentEnd,
        (motion, _) => motion,
    }
}
