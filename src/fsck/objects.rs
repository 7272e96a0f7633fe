//! Object content verification
//!
//! Rehashes every stored object the by-blob feed points at and classifies
//! what it finds.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::fs::File;
use std::io;

use super::VerificationRun;
use crate::model::Finding;
use crate::repository::{ObjectStore, PointerRecord};
use crate::util::hash_reader;

/// Drain the feed, verifying each pointed-at object against the store.
///
/// Findings are printed as they are discovered and recorded on `run`. Only
/// feed errors and read failures mid-hash abort; per-object findings never
/// do.
pub(super) fn verify_objects(
    feed: impl Iterator<Item = Result<PointerRecord>>,
    store: &ObjectStore,
    run: &mut VerificationRun,
    progress: &ProgressBar,
) -> Result<()> {
    for record in feed {
        let record = record?;
        progress.inc(1);
        if let Some(finding) = check_object(store, &record)? {
            progress.suspend(|| println!("{}", finding));
            run.record(finding);
        }
    }
    Ok(())
}

/// Verify one stored object. `Ok(None)` means the object is healthy.
///
/// A missing file is fine when the pointer declares an empty payload (empty
/// objects have no store file by convention). A failed read after a
/// successful open is fatal: a partial hash can classify neither way.
fn check_object(store: &ObjectStore, record: &PointerRecord) -> Result<Option<Finding>> {
    let path = store.object_path(&record.oid);

    let mut file = match File::open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound && record.size == 0 => {
            return Ok(None);
        }
        Err(err) => {
            return Ok(Some(Finding::OpenError {
                name: record.path.clone(),
                oid: record.oid.clone(),
                message: err.to_string(),
            }));
        }
    };

    let digest = hash_reader(&mut file)
        .with_context(|| format!("Failed to read object {}", path.display()))?;

    if digest == record.oid {
        Ok(None)
    } else {
        Ok(Some(Finding::CorruptObject {
            name: record.path.clone(),
            oid: record.oid.clone(),
        }))
    }
}
