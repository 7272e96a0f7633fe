mod filter;
mod refs;
mod scanner;
mod store;

pub use filter::{FETCH_EXCLUDE_KEY, PathFilter};
pub use refs::{ScanRange, resolve_current_ref, resolve_scan_range};
pub use scanner::{AttrStack, ByBlobFeed, ByTreeFeed, PointerRecord, TRACK_ATTRIBUTE, TreeScanItem};
pub use store::ObjectStore;
