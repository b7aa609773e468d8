//! ファイル操作モジュール

pub mod io;

pub use io::{canonical_key, normalize_line_endings, read_text_file, remove_bom, write_text_file};
