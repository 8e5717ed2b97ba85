use thiserror::Error;

use crate::config::{MAX_TAG_BITS, MIN_TAG_BITS};

/// Errors reported by table construction, snapshot restore and the checked
/// entry points.
///
/// A full bucket is not an error, see [`InsertOutcome::Full`](crate::InsertOutcome::Full).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("bits per tag ({bits}) must be in {min}..={max}", min = MIN_TAG_BITS, max = MAX_TAG_BITS)]
    TagBitsOutOfRange { bits: u32 },

    #[error("number of buckets ({buckets}) must be > 1")]
    TooFewBuckets { buckets: usize },

    #[error("max keys ({max_keys}) must be > 1")]
    TooFewKeys { max_keys: usize },

    #[error("table size computation overflowed")]
    StorageOverflow,

    #[error("table of {bits} bits is too large, exceeds 32 bit boundary")]
    StorageTooLarge { bits: u64 },

    #[error("bucket index {bucket} out of range for {buckets} buckets")]
    BucketOutOfRange { bucket: usize, buckets: usize },

    #[error("slot {slot} out of range for bucket")]
    SlotOutOfRange { slot: usize },

    #[error("tag {tag:#x} is zero or wider than {bits} bits")]
    TagOutOfRange { tag: u32, bits: u32 },

    #[error("corrupt table snapshot: {0}")]
    CorruptSnapshot(String),
}

pub type Result<T> = std::result::Result<T, TableError>;
