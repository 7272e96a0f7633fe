//! By-blob pointer feed
//!
//! Walks every commit in the scan range (and optionally the working index)
//! and yields one `PointerRecord` per distinct pointer blob. Drives the
//! object content verifier.

use anyhow::{Context, Result};
use git2::{ObjectType, Oid, Repository, Revwalk};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use super::types::PointerRecord;
use crate::model::{POINTER_SIZE_CUTOFF, Pointer};
use crate::repository::filter::PathFilter;
use crate::repository::refs::ScanRange;

const FILEMODE_LINK: i32 = 0o120000;

/// Lazy, non-restartable sequence of pointer records over a scan range.
///
/// Trees and blobs are each visited at most once (`FxHashSet` dedup), so a
/// pointer reachable through many commits is yielded exactly once. Paths
/// rejected by the fetch-exclude filter never reach the consumer.
pub struct ByBlobFeed<'r> {
    repo: &'r Repository,
    filter: &'r PathFilter,
    revwalk: Option<Revwalk<'r>>,
    trees: VecDeque<(Oid, String)>,
    ready: VecDeque<PointerRecord>,
    seen_trees: FxHashSet<Oid>,
    seen_blobs: FxHashSet<Oid>,
    scan_index: bool,
}

impl<'r> ByBlobFeed<'r> {
    pub fn new(repo: &'r Repository, filter: &'r PathFilter, range: &ScanRange) -> Result<Self> {
        let mut revwalk = repo.revwalk().context("Failed to start revision walk")?;
        revwalk
            .push(range.end)
            .with_context(|| format!("Failed to walk from {}", range.end))?;
        if let Some(start) = range.start {
            revwalk
                .hide(start)
                .with_context(|| format!("Failed to exclude history of {}", start))?;
        }
        let mut feed = Self {
            repo,
            filter,
            revwalk: Some(revwalk),
            trees: VecDeque::new(),
            ready: VecDeque::new(),
            seen_trees: FxHashSet::default(),
            seen_blobs: FxHashSet::default(),
            scan_index: range.use_index,
        };
        if let Some(start) = range.start {
            feed.mark_excluded(start)?;
        }
        Ok(feed)
    }

    /// Pre-mark every tree and blob reachable from `start` as already seen,
    /// so a range scan yields only objects introduced after it (rev-list
    /// range semantics: in-range commits still carry older blobs in their
    /// trees).
    fn mark_excluded(&mut self, start: Oid) -> Result<()> {
        let mut revwalk = self.repo.revwalk().context("Failed to start revision walk")?;
        revwalk
            .push(start)
            .with_context(|| format!("Failed to walk from {}", start))?;

        let mut stack: Vec<Oid> = Vec::new();
        for oid in revwalk {
            let oid = oid.context("Revision walk failed")?;
            let commit = self
                .repo
                .find_commit(oid)
                .with_context(|| format!("Failed to read commit {}", oid))?;
            if self.seen_trees.insert(commit.tree_id()) {
                stack.push(commit.tree_id());
            }
            while let Some(tree_oid) = stack.pop() {
                let tree = self
                    .repo
                    .find_tree(tree_oid)
                    .with_context(|| format!("Failed to read tree {}", tree_oid))?;
                for entry in tree.iter() {
                    match entry.kind() {
                        Some(ObjectType::Tree) => {
                            if self.seen_trees.insert(entry.id()) {
                                stack.push(entry.id());
                            }
                        }
                        Some(ObjectType::Blob) => {
                            self.seen_blobs.insert(entry.id());
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn queue_commit(&mut self, oid: Oid) -> Result<()> {
        let commit = self
            .repo
            .find_commit(oid)
            .with_context(|| format!("Failed to read commit {}", oid))?;
        let tree_id = commit.tree_id();
        if self.seen_trees.insert(tree_id) {
            self.trees.push_back((tree_id, String::new()));
        }
        Ok(())
    }

    fn visit_tree(&mut self, tree_oid: Oid, prefix: &str) -> Result<()> {
        let tree = self
            .repo
            .find_tree(tree_oid)
            .with_context(|| format!("Failed to read tree {}", tree_oid))?;

        for entry in tree.iter() {
            let name = entry.name().unwrap_or_default();
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", prefix, name)
            };

            match entry.kind() {
                Some(ObjectType::Tree) => {
                    let oid = entry.id();
                    if self.seen_trees.insert(oid) {
                        self.trees.push_back((oid, path));
                    }
                }
                Some(ObjectType::Blob) if entry.filemode() != FILEMODE_LINK => {
                    self.consider_blob(entry.id(), &path)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn consider_blob(&mut self, oid: Oid, path: &str) -> Result<()> {
        if !self.filter.allows(path) {
            return Ok(());
        }
        if !self.seen_blobs.insert(oid) {
            return Ok(());
        }
        let blob = self
            .repo
            .find_blob(oid)
            .with_context(|| format!("Failed to read blob {}", oid))?;
        if blob.size() == 0 || blob.size() >= POINTER_SIZE_CUTOFF {
            return Ok(());
        }
        if let Some(pointer) = Pointer::decode(blob.content()) {
            let canonical = pointer.is_canonical(blob.content());
            self.ready.push_back(PointerRecord {
                path: path.to_string(),
                blob_oid: oid.to_string(),
                oid: pointer.oid,
                size: pointer.size,
                canonical,
            });
        }
        Ok(())
    }

    /// Scan the working index as an extra endpoint, through the same dedup.
    fn visit_index(&mut self) -> Result<()> {
        let index = self.repo.index().context("Failed to open the working index")?;
        for entry in index.iter() {
            if entry.mode == FILEMODE_LINK as u32 || entry.mode == 0o160000 {
                continue;
            }
            let path = String::from_utf8_lossy(&entry.path).into_owned();
            self.consider_blob(entry.id, &path)?;
        }
        Ok(())
    }
}

impl Iterator for ByBlobFeed<'_> {
    type Item = Result<PointerRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.ready.pop_front() {
                return Some(Ok(record));
            }
            if let Some((tree_oid, prefix)) = self.trees.pop_front() {
                if let Err(err) = self.visit_tree(tree_oid, &prefix) {
                    return Some(Err(err));
                }
                continue;
            }
            match self.revwalk.as_mut().map(Iterator::next) {
                Some(Some(Ok(oid))) => {
                    if let Err(err) = self.queue_commit(oid) {
                        return Some(Err(err));
                    }
                }
                Some(Some(Err(err))) => {
                    self.revwalk = None;
                    return Some(Err(anyhow::Error::new(err).context("Revision walk failed")));
                }
                Some(None) => self.revwalk = None,
                None => {
                    if !self.scan_index {
                        return None;
                    }
                    self.scan_index = false;
                    if let Err(err) = self.visit_index() {
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}
