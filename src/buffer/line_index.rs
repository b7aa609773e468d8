//! 行頭位置のキャッシュ
//!
//! 各行の先頭を `(文字位置, バイト位置)` で保持し、編集ごとに差分で更新する。
//! 文字位置からバイト位置への変換は該当行の中だけを走査する。

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// 行頭 `(文字位置, バイト位置)`。先頭は常に `(0, 0)`
    starts: Vec<(usize, usize)>,
    len_chars: usize,
    len_bytes: usize,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new("")
    }
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![(0, 0)];
        let mut chars = 0usize;
        for (byte, ch) in text.char_indices() {
            chars += 1;
            if ch == '\n' {
                starts.push((chars, byte + 1));
            }
        }
        Self {
            starts,
            len_chars: chars,
            len_bytes: text.len(),
        }
    }

    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// 文字位置が属する行（末尾を超える位置は最終行）
    pub fn line_of(&self, pos: usize) -> usize {
        let pos = pos.min(self.len_chars);
        self.starts.partition_point(|&(start, _)| start <= pos) - 1
    }

    /// 行の文字範囲 `(開始, 終了)`（終了は改行を含まない）
    pub fn line_bounds(&self, line: usize) -> (usize, usize) {
        match self.starts.get(line) {
            Some(&(start, _)) => {
                let end = self
                    .starts
                    .get(line + 1)
                    .map(|&(next, _)| next - 1)
                    .unwrap_or(self.len_chars);
                (start, end)
            }
            None => (self.len_chars, self.len_chars),
        }
    }

    /// 行のバイト範囲（改行を含まない）
    pub fn line_byte_range(&self, line: usize) -> Option<(usize, usize)> {
        let &(_, start) = self.starts.get(line)?;
        let end = self
            .starts
            .get(line + 1)
            .map(|&(_, next)| next - 1)
            .unwrap_or(self.len_bytes);
        Some((start, end))
    }

    /// 文字位置をバイト位置へ変換（末尾以降はテキスト長）
    pub fn byte_of(&self, text: &str, pos: usize) -> usize {
        if pos >= self.len_chars {
            return self.len_bytes;
        }
        let (char_start, byte_start) = self.starts[self.line_of(pos)];
        text[byte_start..]
            .char_indices()
            .nth(pos - char_start)
            .map(|(offset, _)| byte_start + offset)
            .unwrap_or(self.len_bytes)
    }

    /// `start`（文字）/`start_byte` の位置で `removed` を `inserted` に置き換えた編集を反映
    pub fn apply(&mut self, start: usize, start_byte: usize, removed: &str, inserted: &str) {
        let removed_chars = removed.chars().count();
        let inserted_chars = inserted.chars().count();
        let end = start + removed_chars;

        // 削除された改行の直後から始まっていた行を落とす
        let first = self.starts.partition_point(|&(line_start, _)| line_start <= start);
        let last = self.starts.partition_point(|&(line_start, _)| line_start <= end);

        let mut added = Vec::new();
        let mut chars = start;
        for (offset, ch) in inserted.char_indices() {
            chars += 1;
            if ch == '\n' {
                added.push((chars, start_byte + offset + 1));
            }
        }
        let added_len = added.len();
        self.starts.splice(first..last, added);

        for entry in &mut self.starts[first + added_len..] {
            entry.0 = entry.0 - removed_chars + inserted_chars;
            entry.1 = entry.1 - removed.len() + inserted.len();
        }
        self.len_chars = self.len_chars - removed_chars + inserted_chars;
        self.len_bytes = self.len_bytes - removed.len() + inserted.len();
    }
}
