mod hash;

pub use hash::{hash_bytes, hash_reader};
