//! Domain types for pointer scanning
//!
//! These types form the data contract between the feeds and the verifiers.

/// A pointer discovered in history or the index.
///
/// `blob_oid` is the git blob that carried the pointer text; `oid` is the
/// content oid the pointer declares. `canonical` records whether the blob's
/// bytes were exactly the canonical pointer serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerRecord {
    pub path: String,
    pub blob_oid: String,
    pub oid: String,
    pub size: i64,
    pub canonical: bool,
}

/// One item from the by-tree feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeScanItem {
    /// A tree entry that decoded as a pointer.
    Pointer(PointerRecord),
    /// A tree entry that was expected to be a pointer but is not one.
    NotAPointer { tree_oid: String, path: String },
}
