use std::fmt;

/// A single corruption finding from either verification pass.
///
/// Object findings (`CorruptObject`, `OpenError`) name the path the pointer
/// was committed under and the content oid whose store file is bad. Pointer
/// findings name the offending git objects instead: the pointer blob for
/// `NonCanonicalPointer`, the containing tree for `UnexpectedGitObject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Stored bytes hash to something other than the declared content oid.
    CorruptObject { name: String, oid: String },
    /// The store file could not be opened (and the payload is not empty).
    OpenError {
        name: String,
        oid: String,
        message: String,
    },
    /// A pointer decoded but its blob is not the canonical serialization.
    NonCanonicalPointer { oid: String, blob_oid: String },
    /// A tree entry expected to be a pointer is some other git object.
    UnexpectedGitObject { tree_oid: String, path: String },
}

impl Finding {
    pub fn kind(&self) -> &'static str {
        match self {
            Finding::CorruptObject { .. } => "corruptObject",
            Finding::OpenError { .. } => "openError",
            Finding::NonCanonicalPointer { .. } => "nonCanonicalPointer",
            Finding::UnexpectedGitObject { .. } => "unexpectedGitObject",
        }
    }

    /// Content oid of the corrupt store object, for findings that have one.
    pub fn corrupt_oid(&self) -> Option<&str> {
        match self {
            Finding::CorruptObject { oid, .. } | Finding::OpenError { oid, .. } => Some(oid),
            _ => None,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::CorruptObject { name, oid } => {
                write!(f, "objects: corruptObject: {} ({}) is corrupt", name, oid)
            }
            Finding::OpenError { name, oid, message } => {
                write!(
                    f,
                    "objects: openError: {} ({}) could not be checked: {}",
                    name, oid, message
                )
            }
            Finding::NonCanonicalPointer { oid, blob_oid } => {
                write!(
                    f,
                    "pointer: nonCanonicalPointer: Pointer for {} (blob {}) was not canonical",
                    oid, blob_oid
                )
            }
            Finding::UnexpectedGitObject { tree_oid, path } => {
                write!(
                    f,
                    "pointer: unexpectedGitObject: {:?} (treeish {}) should have been a pointer but was not",
                    path, tree_oid
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let f = Finding::CorruptObject {
            name: "big.bin".into(),
            oid: "abc123".into(),
        };
        assert_eq!(f.to_string(), "objects: corruptObject: big.bin (abc123) is corrupt");
        assert_eq!(f.kind(), "corruptObject");
        assert_eq!(f.corrupt_oid(), Some("abc123"));

        let f = Finding::OpenError {
            name: "big.bin".into(),
            oid: "abc123".into(),
            message: "No such file or directory (os error 2)".into(),
        };
        assert_eq!(
            f.to_string(),
            "objects: openError: big.bin (abc123) could not be checked: No such file or directory (os error 2)"
        );

        let f = Finding::NonCanonicalPointer {
            oid: "abc123".into(),
            blob_oid: "def456".into(),
        };
        assert_eq!(
            f.to_string(),
            "pointer: nonCanonicalPointer: Pointer for abc123 (blob def456) was not canonical"
        );
        assert_eq!(f.corrupt_oid(), None);

        let f = Finding::UnexpectedGitObject {
            tree_oid: "def456".into(),
            path: "data.bin".into(),
        };
        assert_eq!(
            f.to_string(),
            "pointer: unexpectedGitObject: \"data.bin\" (treeish def456) should have been a pointer but was not"
        );
    }
}
