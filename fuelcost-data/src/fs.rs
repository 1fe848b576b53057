//! Capability-based filesystem helpers built on `cap-std` and `camino`.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether `path` is a regular file.
///
/// A missing file surfaces as an [`io::ErrorKind::NotFound`] error so callers
/// can tell it apart from a path naming a directory.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|metadata| metadata.is_file())
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = split_base(parent);
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(base, ambient_authority())?.create_dir_all(relative)
}

fn split_base(parent: &Utf8Path) -> (&'static str, Utf8PathBuf) {
    if parent.is_absolute() {
        let relative = parent.strip_prefix("/").unwrap_or(parent);
        ("/", relative.to_path_buf())
    } else {
        (".", parent.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn utf8(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 path")
    }

    #[rstest]
    fn reports_regular_files(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "request.json");
        std::fs::write(path.as_std_path(), "{}").expect("write file");
        assert!(file_is_file(&path).expect("inspect file"));
    }

    #[rstest]
    fn missing_files_report_not_found(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "absent.json");
        let err = file_is_file(&path).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn directories_are_not_files(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "nested");
        std::fs::create_dir(path.as_std_path()).expect("create dir");
        assert!(!file_is_file(&path).expect("inspect directory"));
    }

    #[rstest]
    fn creates_nested_parents(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "a/b/reference.db");
        ensure_parent_dir(&path).expect("create parents");
        assert!(temp_dir.path().join("a/b").is_dir());
    }

    #[rstest]
    fn bare_file_names_need_no_parent() {
        ensure_parent_dir(Utf8Path::new("reference.db")).expect("nothing to create");
    }
}
