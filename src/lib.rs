//! Bit-packed bucket table for cuckoo filters.
//!
//! - Fixed number of buckets, [`BUCKET_SIZE`] tag slots per bucket
//! - Tags are 5..=27 bits wide and packed back to back, no padding
//! - Insert with optional random eviction, dual-bucket lookup, single-occurrence delete
//! - Hashing keys, picking buckets and relocating evicted tags belong to the owning filter
//!
//! ```
//! use cuckoo_table::{FilterTable, InsertOutcome};
//!
//! let mut table = FilterTable::create(12, 1000, 2_000_000).unwrap();
//! assert_eq!(table.insert_tag_into_bucket(5, 0x1F, false), InsertOutcome::Inserted);
//! assert!(table.find_tag_in_buckets(5, 42, 0x1F));
//! assert!(table.delete_tag_in_bucket(5, 0x1F));
//! ```

pub mod bits;
pub mod config;
mod error;
mod snapshot;
pub mod table;
pub mod victim;

pub use config::{TableConfig, BUCKET_SIZE, MAX_STORAGE_BITS, MAX_TAG_BITS, MIN_TAG_BITS};
pub use error::{Result, TableError};
pub use snapshot::TableSnapshot;
pub use table::{FilterTable, InsertOutcome};
pub use victim::{RandomSlots, SlotSelector};
