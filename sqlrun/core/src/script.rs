//! Discovering and reading script files.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub const SQL_EXTENSION: &str = ".sql";

/// Returns `true` if the file name of `path` ends with `.sql`.
pub fn has_sql_extension(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(SQL_EXTENSION))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    path: PathBuf,
    content: Vec<u8>,
}

impl ScriptFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Reads the whole file at `path`. The handle is closed before this returns.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match fs::read(&path) {
            Ok(content) => Ok(Self { path, content }),
            Err(source) => Err(Error::Read { path, source }),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the file name without its directory components.
    pub fn base_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy())
    }
}

enum Source {
    File(Option<PathBuf>),
    Dir { root: PathBuf, walker: walkdir::IntoIter },
}

/// Script files under a root, in traversal order.
///
/// Files are read one at a time as the iterator advances. The sequence ends after the first
/// error.
pub struct Scripts {
    source: Source,
    done: bool,
}

impl Scripts {
    fn next_path(&mut self) -> Option<Result<PathBuf>> {
        match &mut self.source {
            Source::File(path) => path.take().map(Ok),
            Source::Dir { root, walker } => loop {
                let entry = match walker.next()? {
                    Ok(entry) => entry,
                    Err(source) => {
                        let path = source
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| root.clone());
                        return Some(Err(Error::Walk { path, source }));
                    }
                };
                if entry.file_type().is_dir() {
                    continue;
                }
                if !has_sql_extension(entry.path()) {
                    debug!(path = %entry.path().display(), "skipping non-sql file");
                    continue;
                }
                return Some(Ok(entry.into_path()));
            },
        }
    }
}

impl Iterator for Scripts {
    type Item = Result<ScriptFile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .next_path()
            .map(|path| path.and_then(ScriptFile::read));
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl std::iter::FusedIterator for Scripts {}

/// Resolves `root` into the script files to run.
///
/// A regular file resolves to itself, whatever its extension. A directory is walked
/// recursively, depth first, with the entries of each directory sorted by name. Only files
/// whose name ends with `.sql` are yielded.
pub fn resolve(root: impl AsRef<Path>) -> Result<Scripts> {
    let root = root.as_ref();
    let metadata = fs::metadata(root).map_err(|source| Error::Discovery {
        path: root.to_path_buf(),
        source,
    })?;
    let source = if metadata.is_dir() {
        Source::Dir {
            root: root.to_path_buf(),
            walker: WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter(),
        }
    } else {
        Source::File(Some(root.to_path_buf()))
    };
    Ok(Scripts {
        source,
        done: false,
    })
}
