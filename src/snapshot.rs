//! Persisted form of a [`FilterTable`].
//!
//! Only the tag bits, `bits_per_tag` and `max_keys` are stored. The bucket
//! count is recovered from the blob length on restore.

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bits::PackedBits;
use crate::config::{TableConfig, BUCKET_SIZE, MAX_TAG_BITS, MIN_TAG_BITS};
use crate::error::{Result, TableError};
use crate::table::FilterTable;
use crate::victim::{RandomSlots, SlotSelector};

/// Serializable table state
///
/// `bits` holds the storage region packed little-endian into exactly
/// `ceil(storage_bits / 8)` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub bits_per_tag: u32,
    pub max_keys: usize,
    pub bits: Vec<u8>,
}

impl TableSnapshot {
    /// Bucket count implied by the blob length.
    ///
    /// Exact for snapshots taken from a table: a bucket is at least 20 bits,
    /// so the padding of the final byte never adds up to another bucket.
    pub fn num_buckets(&self) -> usize {
        let bits_per_bucket = BUCKET_SIZE * self.bits_per_tag as usize;
        if bits_per_bucket == 0 {
            return 0;
        }
        self.bits.len() * 8 / bits_per_bucket
    }
}

impl<S> FilterTable<S> {
    /// Capture the persisted state of the table
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            bits_per_tag: self.bits_per_tag(),
            max_keys: self.max_keys(),
            bits: self.bits().to_le_bytes(),
        }
    }
}

impl FilterTable<RandomSlots> {
    /// Rebuild a table from a snapshot with a fresh random selector
    pub fn from_snapshot(snapshot: TableSnapshot) -> Result<Self> {
        Self::from_snapshot_with_selector(snapshot, RandomSlots::new())
    }
}

impl<S: SlotSelector> FilterTable<S> {
    /// Rebuild a table from a snapshot.
    ///
    /// Rejects snapshots whose config is out of bounds, whose blob length does
    /// not match a whole number of buckets, or that carry bits past the
    /// storage region.
    pub fn from_snapshot_with_selector(snapshot: TableSnapshot, selector: S) -> Result<Self> {
        if !(MIN_TAG_BITS..=MAX_TAG_BITS).contains(&snapshot.bits_per_tag) {
            return Err(TableError::TagBitsOutOfRange {
                bits: snapshot.bits_per_tag,
            });
        }

        let config = TableConfig::new(
            snapshot.bits_per_tag,
            snapshot.num_buckets(),
            snapshot.max_keys,
        );
        let storage_bits = config.validate()?;

        let Some(bits) = PackedBits::from_le_bytes(&snapshot.bits, storage_bits) else {
            warn!(
                "rejecting table snapshot: {} bytes for {} buckets of {} bit tags",
                snapshot.bits.len(),
                config.num_buckets,
                config.bits_per_tag
            );
            return Err(TableError::CorruptSnapshot(format!(
                "{} bytes do not hold {} buckets of {} bit tags",
                snapshot.bits.len(),
                config.num_buckets,
                config.bits_per_tag
            )));
        };

        debug!(
            "restored filter table: bits_per_tag={} buckets={} max_keys={}",
            config.bits_per_tag, config.num_buckets, config.max_keys
        );
        Ok(Self::from_parts(bits, config, selector))
    }
}

impl<S> Serialize for FilterTable<S> {
    fn serialize<Se>(&self, serializer: Se) -> std::result::Result<Se::Ok, Se::Error>
    where
        Se: Serializer,
    {
        self.snapshot().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterTable<RandomSlots> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let snapshot = TableSnapshot::deserialize(deserializer)?;
        Self::from_snapshot(snapshot).map_err(serde::de::Error::custom)
    }
}
