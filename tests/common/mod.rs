// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use git2::{Repository, Signature};
use lode::model::Pointer;
use lode::repository::ObjectStore;
use lode::util::hash_bytes;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary git repository with configured user
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    // Configure git user for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

/// Add files to the repository and create a commit
pub fn add_commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> git2::Oid {
    let sig = Signature::now("Test User", "test@example.com").unwrap();

    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        index.add_path(std::path::Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    match parent {
        Some(parent) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap(),
        None => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}

/// Stage files into the index without committing
pub fn stage_files(repo: &Repository, files: &[(&str, &[u8])]) {
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        index.add_path(std::path::Path::new(path)).unwrap();
    }
    index.write().unwrap();
}

/// The store rooted inside the repository's git directory
pub fn store(repo: &Repository) -> ObjectStore {
    ObjectStore::for_repo(repo)
}

/// Canonical pointer for a payload
pub fn pointer_for(content: &[u8]) -> Pointer {
    Pointer {
        oid: hash_bytes(content),
        size: content.len() as i64,
    }
}

/// Write a payload into the store under its own content oid
pub fn put_object(repo: &Repository, content: &[u8]) -> String {
    let oid = hash_bytes(content);
    put_object_at(repo, &oid, content);
    oid
}

/// Write arbitrary bytes at the store slot of `oid` (for corruption tests)
pub fn put_object_at(repo: &Repository, oid: &str, content: &[u8]) {
    let path = store(repo).object_path(oid);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
}

/// Commit a canonical pointer for `content` at `path`; returns the content oid
pub fn commit_pointer(repo: &Repository, path: &str, content: &[u8], message: &str) -> String {
    let pointer = pointer_for(content);
    add_commit(repo, &[(path, pointer.encode().as_bytes())], message);
    pointer.oid
}

/// Commit a healthy pointer+object pair; returns the content oid
pub fn commit_clean_pointer(repo: &Repository, path: &str, content: &[u8], message: &str) -> String {
    put_object(repo, content);
    commit_pointer(repo, path, content, message)
}
