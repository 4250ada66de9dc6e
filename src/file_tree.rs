//! Two-level directory listing over the configured search roots (spec §4.6
//! step 1 / §6). Grounded on GPlugin's `gplugin_file_tree_new`, which builds
//! exactly this shape before the discovery loop runs; the teacher crate has
//! no equivalent since it discovers plugins by explicit path rather than by
//! walking search roots.

use std::path::{Path, PathBuf};

use tracing::trace;

/// A candidate file found directly inside one of the search roots, with its
/// extension already split out for loader-by-extension routing.
#[derive(Debug, Clone)]
pub struct FileTreeEntry {
    pub path: PathBuf,
    pub extension: String,
}

/// One level of directories (the search roots), each holding one level of
/// candidate files (spec §6: "non-recursive: one level of files per
/// directory"). Built once per [`Manager::refresh`](crate::Manager::refresh)
/// call and walked repeatedly by the reentrant discovery loop.
#[derive(Debug, Default)]
pub struct FileTree {
    directories: Vec<(PathBuf, Vec<FileTreeEntry>)>,
}

impl FileTree {
    /// Lists the immediate contents of every path in `search_paths`,
    /// recording only files that have an extension. Directories visited in
    /// `search_paths` order; within a directory, files are visited in
    /// `read_dir`'s listing order (both are part of the observable ordering
    /// guarantee in spec §5).
    pub fn build<P: AsRef<Path>>(search_paths: &[P]) -> Self {
        let mut directories = Vec::with_capacity(search_paths.len());

        for dir in search_paths {
            let dir = dir.as_ref();
            let mut entries = Vec::new();

            let read_dir = match std::fs::read_dir(dir) {
                Ok(read_dir) => read_dir,
                Err(error) => {
                    trace!(?dir, %error, "search path is not readable, skipping");
                    directories.push((dir.to_path_buf(), entries));
                    continue;
                }
            };

            for entry in read_dir.flatten() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }

                if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
                    entries.push(FileTreeEntry {
                        path,
                        extension: extension.to_string(),
                    });
                }
            }

            directories.push((dir.to_path_buf(), entries));
        }

        Self { directories }
    }

    /// Iterates every candidate file across every directory, in the same
    /// search-path-then-listing order used to build the tree.
    pub fn entries(&self) -> impl Iterator<Item = &FileTreeEntry> {
        self.directories.iter().flat_map(|(_, files)| files.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_one_level_of_files_with_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.so"), b"").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"").unwrap();
        std::fs::write(dir.path().join("no_extension"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let tree = FileTree::build(&[dir.path()]);
        let extensions: Vec<_> = tree.entries().map(|e| e.extension.clone()).collect();

        assert_eq!(extensions.len(), 2);
        assert!(extensions.contains(&"so".to_string()));
        assert!(extensions.contains(&"txt".to_string()));
    }

    #[test]
    fn missing_search_path_is_skipped_not_fatal() {
        let tree = FileTree::build(&["/nonexistent/path/for/plugforge/tests"]);
        assert_eq!(tree.entries().count(), 0);
    }
}
