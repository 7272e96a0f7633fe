//! Quarantine relocation
//!
//! The one filesystem-mutating side effect of the whole subsystem: corrupt
//! objects are renamed out of the live store into the quarantine directory,
//! never deleted or rewritten.
//!
//! Runs assume a single writer per store. Two concurrent invocations against
//! the same store race on the renames; the loser aborts on the failed
//! rename rather than silently skipping it.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::repository::ObjectStore;

/// Move every corrupt object to the quarantine directory, creating it if
/// absent. Any failed rename aborts immediately: the run must not report
/// repair while leaving the store in a split state. A missing source file
/// (already-quarantined oid from an inconsistent prior run) is therefore an
/// error, not a no-op.
pub(super) fn relocate_corrupt(store: &ObjectStore, oids: &[String]) -> Result<PathBuf> {
    let bad_dir = store.quarantine_dir();
    println!("objects: repair: moving corrupt objects to {}", bad_dir.display());

    fs::create_dir_all(&bad_dir)
        .with_context(|| format!("Failed to create quarantine directory {}", bad_dir.display()))?;

    for oid in oids {
        let source = store.object_path(oid);
        let target = store.quarantine_path(oid);
        fs::rename(&source, &target).with_context(|| {
            format!(
                "Failed to move corrupt object {} to {}",
                source.display(),
                target.display()
            )
        })?;
    }

    Ok(bad_dir)
}
