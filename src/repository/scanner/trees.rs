//! By-tree pointer feed
//!
//! Walks the trees of every commit in the scan range, carrying
//! `.gitattributes` context, and yields pointers together with scan errors
//! for entries that were expected to be pointers but are not. Drives the
//! pointer canonicality checker.

use anyhow::{Context, Result};
use git2::{ObjectType, Oid, Repository, Revwalk, Tree};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use super::attrs::AttrStack;
use super::types::{PointerRecord, TreeScanItem};
use crate::model::{POINTER_SIZE_CUTOFF, Pointer};
use crate::repository::refs::ScanRange;

const FILEMODE_LINK: i32 = 0o120000;

/// Lazy, non-restartable sequence of `TreeScanItem`s over a scan range.
///
/// Trees are deduplicated per (oid, path) pair, as identical subtrees at
/// different locations can sit under different attribute scopes. Pointer
/// records are deduplicated by blob oid.
pub struct ByTreeFeed<'r> {
    repo: &'r Repository,
    revwalk: Option<Revwalk<'r>>,
    trees: VecDeque<(Oid, String, AttrStack)>,
    ready: VecDeque<TreeScanItem>,
    seen_trees: FxHashSet<(Oid, String)>,
    seen_blobs: FxHashSet<Oid>,
}

impl<'r> ByTreeFeed<'r> {
    /// Build the feed over a scan range. Unlike the by-blob feed this never
    /// consults the working index.
    pub fn new(repo: &'r Repository, range: &ScanRange) -> Result<Self> {
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
            revwalk: Some(revwalk),
            trees: VecDeque::new(),
            ready: VecDeque::new(),
            seen_trees: FxHashSet::default(),
            seen_blobs: FxHashSet::default(),
        };
        if let Some(start) = range.start {
            feed.mark_excluded(start)?;
        }
        Ok(feed)
    }

    /// Pre-mark trees and blobs reachable from `start` as already seen, so a
    /// range scan only examines entries introduced after it.
    fn mark_excluded(&mut self, start: Oid) -> Result<()> {
        let mut revwalk = self.repo.revwalk().context("Failed to start revision walk")?;
        revwalk
            .push(start)
            .with_context(|| format!("Failed to walk from {}", start))?;

        let mut stack: Vec<(Oid, String)> = Vec::new();
        for oid in revwalk {
            let oid = oid.context("Revision walk failed")?;
            let commit = self
                .repo
                .find_commit(oid)
                .with_context(|| format!("Failed to read commit {}", oid))?;
            if self.seen_trees.insert((commit.tree_id(), String::new())) {
                stack.push((commit.tree_id(), String::new()));
            }
            while let Some((tree_oid, prefix)) = stack.pop() {
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
                            if self.seen_trees.insert((entry.id(), path.clone())) {
                                stack.push((entry.id(), path));
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
        if self.seen_trees.insert((tree_id, String::new())) {
            self.trees.push_back((tree_id, String::new(), AttrStack::new()));
        }
        Ok(())
    }

    fn visit_tree(&mut self, tree_oid: Oid, prefix: &str, attrs: AttrStack) -> Result<()> {
        let tree = self
            .repo
            .find_tree(tree_oid)
            .with_context(|| format!("Failed to read tree {}", tree_oid))?;

        let attrs = self.scope_attrs(&tree, prefix, attrs)?;

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
                    if self.seen_trees.insert((oid, path.clone())) {
                        self.trees.push_back((oid, path, attrs.clone()));
                    }
                }
                Some(ObjectType::Blob) if entry.filemode() != FILEMODE_LINK => {
                    self.consider_blob(tree_oid, entry.id(), &path, &attrs)?;
                }
                // A submodule (or symlink) where a pointer was expected is a
                // wrong-object-type finding.
                _ => {
                    if attrs.tracked(&path) {
                        self.ready.push_back(TreeScanItem::NotAPointer {
                            tree_oid: tree_oid.to_string(),
                            path,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Extend the attribute stack with this tree's `.gitattributes`, if any.
    fn scope_attrs(&self, tree: &Tree<'_>, prefix: &str, attrs: AttrStack) -> Result<AttrStack> {
        let Some(entry) = tree.get_name(".gitattributes") else {
            return Ok(attrs);
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(attrs);
        }
        let blob = self
            .repo
            .find_blob(entry.id())
            .with_context(|| format!("Failed to read attributes blob {}", entry.id()))?;
        Ok(attrs.push(prefix, blob.content()))
    }

    fn consider_blob(
        &mut self,
        tree_oid: Oid,
        blob_oid: Oid,
        path: &str,
        attrs: &AttrStack,
    ) -> Result<()> {
        let tracked = attrs.tracked(path);
        if !tracked && self.seen_blobs.contains(&blob_oid) {
            return Ok(());
        }
        let blob = self
            .repo
            .find_blob(blob_oid)
            .with_context(|| format!("Failed to read blob {}", blob_oid))?;

        let pointer = if blob.size() > 0 && blob.size() < POINTER_SIZE_CUTOFF {
            Pointer::decode(blob.content())
        } else {
            None
        };

        match pointer {
            Some(pointer) => {
                if self.seen_blobs.insert(blob_oid) {
                    let canonical = pointer.is_canonical(blob.content());
                    self.ready.push_back(TreeScanItem::Pointer(PointerRecord {
                        path: path.to_string(),
                        blob_oid: blob_oid.to_string(),
                        oid: pointer.oid,
                        size: pointer.size,
                        canonical,
                    }));
                }
            }
            None if tracked => {
                self.ready.push_back(TreeScanItem::NotAPointer {
                    tree_oid: tree_oid.to_string(),
                    path: path.to_string(),
                });
            }
            None => {}
        }
        Ok(())
    }
}

impl Iterator for ByTreeFeed<'_> {
    type Item = Result<TreeScanItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(Ok(item));
            }
            if let Some((tree_oid, prefix, attrs)) = self.trees.pop_front() {
                if let Err(err) = self.visit_tree(tree_oid, &prefix, attrs) {
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
                None => return None,
            }
        }
    }
}
