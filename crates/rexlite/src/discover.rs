use crate::error::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory of corpus files, or a single file given on the command line.
#[derive(Debug, Clone)]
pub struct Suite {
    pub path: PathBuf,
    pub name: String,
    pub single_file: Option<PathBuf>,
}

fn is_corpus_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
        && !path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('_'))
}

impl Suite {
    pub fn new(path: PathBuf, base_dir: &Path) -> Self {
        let name = path
            .strip_prefix(base_dir)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned())
            });

        Self {
            path,
            name,
            single_file: None,
        }
    }

    pub fn from_file(file: PathBuf) -> Self {
        let path = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            single_file: Some(file),
        }
    }

    pub fn corpus_files(&self) -> Vec<PathBuf> {
        if let Some(file) = &self.single_file {
            return vec![file.clone()];
        }
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.path)
            .into_iter()
            .flatten()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_corpus_file(p))
            .collect();
        files.sort();
        files
    }
}

/// Every directory under `root` holding at least one corpus file becomes a
/// suite. A `root` that is itself a file yields a single-file suite.
pub fn discover_suites(root: &Path) -> Result<Vec<Suite>> {
    if root.is_file() {
        return Ok(vec![Suite::from_file(root.to_path_buf())]);
    }

    let mut suite_dirs: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || !is_corpus_file(path) {
            continue;
        }
        if let Some(parent) = path.parent() {
            suite_dirs.insert(parent.to_path_buf());
        }
    }

    let mut suites: Vec<Suite> = suite_dirs
        .into_iter()
        .map(|p| Suite::new(p, root))
        .collect();

    suites.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CASE: &str = "===\nliteral\n===\nab\n---\nmatch: ab\n";

    fn create_test_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_single_suite() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "basics/literals.txt", CASE);

        let suites = discover_suites(tmp.path()).unwrap();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].name, "basics");
        assert_eq!(suites[0].corpus_files().len(), 1);
    }

    #[test]
    fn test_discover_nested_suites() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "syntax/groups/a.txt", CASE);
        create_test_file(tmp.path(), "syntax/classes/b.txt", CASE);

        let suites = discover_suites(tmp.path()).unwrap();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("classes"));
        assert!(names[1].ends_with("groups"));
    }

    #[test]
    fn test_skips_underscore_and_other_extensions() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "suite/cases.txt", CASE);
        create_test_file(tmp.path(), "suite/_draft.txt", CASE);
        create_test_file(tmp.path(), "suite/notes.md", "# notes");
        create_test_file(tmp.path(), "other/_only_draft.txt", CASE);

        let suites = discover_suites(tmp.path()).unwrap();
        assert_eq!(suites.len(), 1);
        let files = suites[0].corpus_files();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("cases.txt"));
    }

    #[test]
    fn test_root_as_single_file() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "one.txt", CASE);

        let suites = discover_suites(&tmp.path().join("one.txt")).unwrap();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].name, "one");
        assert_eq!(suites[0].corpus_files(), vec![tmp.path().join("one.txt")]);
    }

    #[test]
    fn test_files_directly_under_root() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "top.txt", CASE);

        let suites = discover_suites(tmp.path()).unwrap();
        assert_eq!(suites.len(), 1);
        assert!(!suites[0].name.is_empty());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        assert!(discover_suites(Path::new("/nonexistent/rexlite/corpus")).is_err());
    }
}
