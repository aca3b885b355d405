//! Source text ownership and byte-offset ↔ line/column conversion.
//!
//! Every span in the compiler is a [`SourceRange`]: a half-open byte range into one file owned by a
//! [`SourceManager`]. Line/column information is computed lazily, only when something is displayed.
//!
//! ## Notes
//! - Offsets are bytes. Columns reported by [`SourceManager::line_col`] are 1-indexed and counted in
//!   Unicode scalar values; [`SourceManager::lsp_position`] reports 0-indexed lines and UTF-16 columns.
//! - An offset that falls inside a multi-byte character is floored to that character's first byte.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Maximum size of a source file we are willing to load (100 MiB).
pub const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Identifier of a file registered with a [`SourceManager`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Sentinel for "no file". Ranges carrying it have no location.
    pub const DETACHED: FileId = FileId(u32::MAX);

    pub fn is_detached(self) -> bool {
        self == Self::DETACHED
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            write!(f, "detached")
        } else {
            write!(f, "file#{}", self.0)
        }
    }
}

/// Half-open byte range `[start, end)` into a single file.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    /// The "no location" range.
    pub const NONE: SourceRange = SourceRange {
        file: FileId::DETACHED,
        start: 0,
        end: 0,
    };

    pub const fn new(file: FileId, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }

    /// Zero-width range at `offset`.
    pub const fn empty_at(file: FileId, offset: usize) -> Self {
        Self {
            file,
            start: offset,
            end: offset,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.file.is_detached()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Smallest range covering both `self` and `other`.
    ///
    /// A detached range is the identity element, so merging with [`SourceRange::NONE`] returns the other side.
    pub fn merge(self, other: SourceRange) -> SourceRange {
        if !self.is_valid() {
            return other;
        }
        if !other.is_valid() {
            return self;
        }
        debug_assert_eq!(self.file, other.file, "cannot merge ranges from different files");
        SourceRange {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Return `true` if `other` lies entirely inside `self` (same file).
    pub fn covers(&self, other: &SourceRange) -> bool {
        self.file == other.file && self.start <= other.start && other.end <= self.end
    }
}

impl Default for SourceRange {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}@{:?}", self.start, self.end, self.file)
    }
}

/// Errors raised while loading a file from disk.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{}` is too large ({size} bytes, the limit is {limit} bytes)", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("`{}` is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },
}

/// One registered file: its path, text and precomputed line starts.
#[derive(Debug)]
pub struct SourceFile {
    id: FileId,
    path: PathBuf,
    text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(id: FileId, path: PathBuf, text: String) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            id,
            path,
            text,
            line_starts,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-indexed line containing `offset`.
    fn line_index(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }

    /// Byte bounds of a 0-indexed line, excluding the line terminator.
    fn line_bounds(&self, line: usize) -> (usize, usize) {
        let start = self.line_starts[line];
        let mut end = self.line_starts.get(line + 1).map_or(self.text.len(), |next| next - 1);
        if end > start && self.text.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        (start, end)
    }

    fn floor_offset(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

/// Owner of all source text for one compile invocation.
#[derive(Debug, Default)]
pub struct SourceManager {
    files: Vec<SourceFile>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register in-memory text under `path` and return its id.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(id, path.into(), text.into()));
        id
    }

    /// Read `path` from disk and register it.
    ///
    /// ## Errors
    /// - [`SourceError::Io`] if the file cannot be read.
    /// - [`SourceError::TooLarge`] if it exceeds [`MAX_SOURCE_SIZE`].
    /// - [`SourceError::NotUtf8`] if its content is not UTF-8.
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, SourceError> {
        let io_err = |source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_SOURCE_SIZE {
            return Err(SourceError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_SOURCE_SIZE,
            });
        }
        let bytes = std::fs::read(path).map_err(io_err)?;
        let text = String::from_utf8(bytes).map_err(|_| SourceError::NotUtf8 {
            path: path.to_path_buf(),
        })?;
        Ok(self.add_file(path, text))
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        if id.is_detached() {
            return None;
        }
        self.files.get(id.index())
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.file(id).map(SourceFile::path)
    }

    /// Text of `id`, or `""` for detached/unknown ids.
    pub fn text(&self, id: FileId) -> &str {
        self.file(id).map_or("", SourceFile::text)
    }

    /// Slice of source text covered by `range`, if it is a valid range on char boundaries.
    pub fn slice(&self, range: SourceRange) -> Option<&str> {
        self.file(range.file)?.text.get(range.start..range.end)
    }

    pub fn line_count(&self, id: FileId) -> usize {
        self.file(id).map_or(0, SourceFile::line_count)
    }

    /// 1-indexed `(line, column)` of `offset`; the column counts Unicode scalar values.
    ///
    /// Offsets past the end clamp to the end of the file. Unknown files report `(1, 1)`.
    pub fn line_col(&self, id: FileId, offset: usize) -> (usize, usize) {
        let Some(file) = self.file(id) else {
            return (1, 1);
        };
        let offset = file.floor_offset(offset);
        let line = file.line_index(offset);
        let line_start = file.line_starts[line];
        let col = file.text[line_start..offset].chars().count() + 1;
        (line + 1, col)
    }

    /// Text of the 1-indexed `line`, without its terminator.
    pub fn line_text(&self, id: FileId, line: usize) -> Option<&str> {
        let file = self.file(id)?;
        if line == 0 || line > file.line_count() {
            return None;
        }
        let (start, end) = file.line_bounds(line - 1);
        Some(&file.text[start..end])
    }

    /// Byte offset where the 1-indexed `line` starts.
    pub fn line_start(&self, id: FileId, line: usize) -> Option<usize> {
        let file = self.file(id)?;
        file.line_starts.get(line.checked_sub(1)?).copied()
    }

    /// 0-indexed line and UTF-16 column of `offset`, as LSP clients expect.
    pub fn lsp_position(&self, id: FileId, offset: usize) -> (u32, u32) {
        let Some(file) = self.file(id) else {
            return (0, 0);
        };
        let offset = file.floor_offset(offset);
        let line = file.line_index(offset);
        let line_start = file.line_starts[line];
        let col = file.text[line_start..offset].encode_utf16().count();
        (line as u32, col as u32)
    }

    /// Path of `id` relative to the current working directory, or absolute when that is not possible.
    pub fn display_path(&self, id: FileId) -> String {
        match self.path(id) {
            Some(path) => relative_to_cwd(path),
            None => "<unknown>".to_string(),
        }
    }

    /// Find an already registered file by path.
    pub fn find(&self, path: &Path) -> Option<FileId> {
        self.files.iter().find(|f| f.path == path).map(|f| f.id)
    }
}

fn relative_to_cwd(path: &Path) -> String {
    let Ok(cwd) = std::env::current_dir() else {
        return path.display().to_string();
    };
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    match absolute.strip_prefix(&cwd) {
        Ok(relative) => relative.display().to_string(),
        Err(_) => absolute.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_chars_not_bytes() {
        let mut sm = SourceManager::new();
        let id = sm.add_file("t.bt", "ab\nçé x\n");
        assert_eq!(sm.line_col(id, 0), (1, 1));
        assert_eq!(sm.line_col(id, 3), (2, 1));
        // "çé " is 5 bytes; `x` is the 4th character.
        assert_eq!(sm.line_col(id, 8), (2, 4));
    }

    #[test]
    fn offsets_inside_a_char_are_floored() {
        let mut sm = SourceManager::new();
        let id = sm.add_file("t.bt", "é");
        assert_eq!(sm.line_col(id, 1), (1, 1));
        assert_eq!(sm.line_col(id, 99), (1, 2));
    }

    #[test]
    fn line_text_strips_terminators() {
        let mut sm = SourceManager::new();
        let id = sm.add_file("t.bt", "one\r\ntwo\nthree");
        assert_eq!(sm.line_text(id, 1), Some("one"));
        assert_eq!(sm.line_text(id, 2), Some("two"));
        assert_eq!(sm.line_text(id, 3), Some("three"));
        assert_eq!(sm.line_text(id, 4), None);
        assert_eq!(sm.line_text(id, 0), None);
    }

    #[test]
    fn lsp_position_uses_utf16_columns() {
        let mut sm = SourceManager::new();
        let id = sm.add_file("t.bt", "x\n😀y");
        // The emoji is one char but two UTF-16 code units.
        assert_eq!(sm.lsp_position(id, 6), (1, 2));
        assert_eq!(sm.line_col(id, 6), (2, 2));
    }

    #[test]
    fn merge_with_none_is_identity() {
        let file = FileId(0);
        let r = SourceRange::new(file, 3, 7);
        assert_eq!(r.merge(SourceRange::NONE), r);
        assert_eq!(SourceRange::NONE.merge(r), r);
        assert_eq!(r.merge(SourceRange::new(file, 1, 4)), SourceRange::new(file, 1, 7));
    }

    #[test]
    fn detached_file_has_no_text() {
        let sm = SourceManager::new();
        assert_eq!(sm.text(FileId::DETACHED), "");
        assert_eq!(sm.line_col(FileId::DETACHED, 10), (1, 1));
    }

    #[test]
    fn relative_display_path() {
        let mut sm = SourceManager::new();
        let id = sm.add_file("dir/main.bt", "");
        assert_eq!(sm.display_path(id), Path::new("dir").join("main.bt").display().to_string());
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let mut sm = SourceManager::new();
        let err = sm.load_file(Path::new("definitely/not/here.bt")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
