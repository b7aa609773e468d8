//! 検索システム
//!
//! 単一ドキュメントの検索・置換バーと、複数ファイル検索を提供する。

pub mod find_replace;
pub mod matcher;
pub mod multi_file;

pub use find_replace::FindReplace;
pub use matcher::{
    find_matches, is_whole_word, LiteralMatcher, RegexMatcher, SearchOptions, StringMatcher,
    TextMatch,
};
pub use multi_file::{
    collect_directory_files, replace_in_text, replaced_label, search_in_text, LineMatch,
    MultiFileSearch, ReplaceSummary, SearchResult, SearchScope, SearchSource,
};
