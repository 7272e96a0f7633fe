//! Pointer canonicality verification
//!
//! Classifies the well-formedness of pointers, independently of whether the
//! objects they reference are healthy.

use anyhow::Result;

use super::VerificationRun;
use crate::model::Finding;
use crate::repository::TreeScanItem;

/// Drain the by-tree feed, recording every malformed pointer.
///
/// Findings are printed as they are discovered. Feed errors are fatal.
pub(super) fn verify_pointers(
    feed: impl Iterator<Item = Result<TreeScanItem>>,
    run: &mut VerificationRun,
) -> Result<()> {
    for item in feed {
        let finding = match item? {
            TreeScanItem::Pointer(record) => {
                if record.canonical {
                    continue;
                }
                Finding::NonCanonicalPointer {
                    oid: record.oid,
                    blob_oid: record.blob_oid,
                }
            }
            TreeScanItem::NotAPointer { tree_oid, path } => {
                Finding::UnexpectedGitObject { tree_oid, path }
            }
        };
        println!("{}", finding);
        run.record(finding);
    }
    Ok(())
}
