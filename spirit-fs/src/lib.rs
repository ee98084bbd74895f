//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Every helper resolves an ambient directory for the target's parent and
//! then operates relative to it, so absolute and relative paths behave the
//! same way.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;
use std::time::SystemTime;

/// Resolve an ambient directory for the given path and return the directory with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} should include a file name")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create `path` and any missing ancestors.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
    if path.as_str().is_empty() || path == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = base_dir_and_relative(path)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

/// Return whether a path exists and is a regular file.
///
/// A missing parent directory counts as a missing file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    probe(path, |meta| meta.is_file())
}

/// Return whether a path exists and is a directory.
pub fn dir_exists(path: &Utf8Path) -> io::Result<bool> {
    probe(path, |meta| meta.is_dir())
}

fn probe(path: &Utf8Path, check: impl Fn(&fs_utf8::Metadata) -> bool) -> io::Result<bool> {
    let lookup = open_dir_and_file(path).and_then(|(dir, name)| dir.metadata(name.as_str()));
    match lookup {
        Ok(meta) => Ok(check(&meta)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Create or truncate the file at `path`, creating parent directories first.
pub fn create_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Open a UTF-8 file path for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Move `from` to `to`, replacing any existing file at `to`.
pub fn rename(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    let (from_dir, from_name) = open_dir_and_file(from)?;
    let (to_dir, to_name) = open_dir_and_file(to)?;
    from_dir.rename(from_name.as_str(), &to_dir, to_name.as_str())
}

/// Read the whole file at `path`.
pub fn read(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read(name.as_str())
}

/// Read the whole file at `path` as UTF-8 text.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str())
}

/// Write `contents` to `path`, replacing any existing file.
pub fn write(path: &Utf8Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.write(name.as_str(), contents)
}

/// Last modification time of the file at `path`.
pub fn modified(path: &Utf8Path) -> io::Result<SystemTime> {
    let (dir, name) = open_dir_and_file(path)?;
    Ok(dir.metadata(name.as_str())?.modified()?.into_std())
}

/// Remove the file at `path`, returning `false` when it did not exist.
pub fn remove_file_if_exists(path: &Utf8Path) -> io::Result<bool> {
    let removal = open_dir_and_file(path).and_then(|(dir, name)| dir.remove_file(name.as_str()));
    match removal {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Remove the directory at `path` with its contents and recreate it empty.
pub fn reset_dir(path: &Utf8Path) -> io::Result<()> {
    if dir_exists(path)? {
        let (dir, name) = open_dir_and_file(path)?;
        dir.remove_dir_all(name.as_str())?;
    }
    ensure_dir(path)
}

/// Split an absolute or relative path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();

    let (base, relative) = match std_path.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_path.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other(format!("failed to strip prefix from {path}")))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other(format!("failed to strip root from {path}")))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_path.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative =
        Utf8PathBuf::from_path_buf(relative).map_err(|_| io::Error::other("non-UTF-8 path"))?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn root() -> TempDir {
        TempDir::new().expect("create temporary directory")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is UTF-8")
    }

    #[rstest]
    fn writes_into_missing_parents(root: TempDir) {
        let target = utf8(&root).join("a/b/file.txt");
        write(&target, "hello").expect("write succeeds");
        assert_eq!(read_to_string(&target).expect("read succeeds"), "hello");
        assert!(file_is_file(&target).expect("probe succeeds"));
        assert!(dir_exists(&utf8(&root).join("a/b")).expect("probe succeeds"));
    }

    #[rstest]
    fn missing_parent_counts_as_missing_file(root: TempDir) {
        let target = utf8(&root).join("nowhere/file.txt");
        assert!(!file_is_file(&target).expect("probe succeeds"));
        assert!(!remove_file_if_exists(&target).expect("removal succeeds"));
    }

    #[rstest]
    fn removes_existing_files(root: TempDir) {
        let target = utf8(&root).join("cache.bin");
        write(&target, [1_u8, 2, 3]).expect("write succeeds");
        assert!(remove_file_if_exists(&target).expect("removal succeeds"));
        assert!(!file_is_file(&target).expect("probe succeeds"));
    }

    #[rstest]
    fn rename_replaces_the_target(root: TempDir) {
        let base = utf8(&root);
        write(&base.join("font.ttf.part"), "new").expect("write succeeds");
        write(&base.join("font.ttf"), "old").expect("write succeeds");
        rename(&base.join("font.ttf.part"), &base.join("font.ttf")).expect("rename succeeds");
        assert_eq!(read_to_string(&base.join("font.ttf")).expect("read"), "new");
        assert!(!file_is_file(&base.join("font.ttf.part")).expect("probe succeeds"));
    }

    #[rstest]
    fn reset_dir_empties_the_directory(root: TempDir) {
        let dir = utf8(&root).join("glyphs");
        write(&dir.join("0-255.pbf"), "x").expect("write succeeds");
        reset_dir(&dir).expect("reset succeeds");
        assert!(dir_exists(&dir).expect("probe succeeds"));
        assert!(!file_is_file(&dir.join("0-255.pbf")).expect("probe succeeds"));
    }
}
