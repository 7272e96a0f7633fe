//! Pointer discovery feeds
//!
//! Turns a resolved scan range into lazy sequences of pointer records for
//! the verification passes to consume.
//!
//! # Architecture
//!
//! The scanner is organized into layers:
//!
//! - **types**: Domain types (PointerRecord, TreeScanItem)
//! - **attrs**: `.gitattributes` tracking context for the tree walk
//! - **blobs**: by-blob feed (history + optional index), drives object checks
//! - **trees**: by-tree feed (history only), drives pointer checks
//!
//! Both feeds are pull-based iterators: each commit's tree is expanded only
//! as records are consumed, so huge histories are never materialized. Feed
//! errors other than the domain findings themselves surface as `Err` items
//! and are fatal to the run.

mod attrs;
mod blobs;
mod trees;
mod types;

pub use attrs::{AttrStack, TRACK_ATTRIBUTE};
pub use blobs::ByBlobFeed;
pub use trees::ByTreeFeed;
pub use types::{PointerRecord, TreeScanItem};
