//! Temporary workspaces holding theme files and extracts.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const LANDUSE_AND_POIS: &str = r#"{
  "topics": [
    {"name": "core/name-with-fallback"},
    {"name": "shortbread_v1/landuse"},
    {"name": "shortbread_v1/pois"}
  ]
}"#;

#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write `contents` to `name` under the workspace and return its path.
    pub(super) fn file(&self, name: &str, contents: impl AsRef<[u8]>) -> Utf8PathBuf {
        let path = self.root.join(name);
        spirit_fs::write(&path, contents).expect("write workspace file");
        path
    }
}
