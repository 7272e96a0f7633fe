mod finding;
mod pointer;

pub use finding::Finding;
pub use pointer::{POINTER_SIZE_CUTOFF, Pointer, SPEC_VERSION_URL};
