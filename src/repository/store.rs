use git2::Repository;
use std::path::{Path, PathBuf};

/// Filesystem layout of the local object store.
///
/// Objects live under `<root>/objects/`, sharded by the first two byte pairs
/// of their content oid. Quarantined objects live flat under `<root>/bad/`,
/// populated only by the repair step.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The store rooted inside a repository's git directory.
    pub fn for_repo(repo: &Repository) -> Self {
        Self::new(repo.path().join("lode"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store path for a content oid: `objects/aa/bb/<oid>`.
    pub fn object_path(&self, oid: &str) -> PathBuf {
        let objects = self.root.join("objects");
        if oid.len() < 4 {
            return objects.join(oid);
        }
        objects.join(&oid[0..2]).join(&oid[2..4]).join(oid)
    }

    pub fn quarantine_dir(&self) -> PathBuf {
        self.root.join("bad")
    }

    pub fn quarantine_path(&self, oid: &str) -> PathBuf {
        self.quarantine_dir().join(oid)
    }
}
