//! Bit-packed bucket table storing cuckoo filter tags.
//!
//! - `num_buckets` buckets of [`BUCKET_SIZE`] slots, each slot `bits_per_tag` wide
//! - Tag 0 marks an empty slot; the tag producer must never hand out 0
//! - A full bucket can kick a random victim for the caller to relocate
//!
//! NOTE: for speed, the hot-path operations do not check bucket indices or
//! slot positions. Callers must pass in-range values. The `try_*` variants
//! check and return [`TableError`] instead.

use std::hash::{Hash, Hasher};

use log::{debug, trace};

use crate::bits::{field_mask, PackedBits};
use crate::config::{TableConfig, BUCKET_SIZE};
use crate::error::{Result, TableError};
use crate::victim::{RandomSlots, SlotSelector};

/// Result of inserting a tag into a single bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Tag stored in an empty slot
    Inserted,
    /// Bucket was full; tag replaced this victim, which the caller must relocate
    Evicted(u32),
    /// Bucket was full and kicking was not requested; nothing written
    Full,
}

impl InsertOutcome {
    /// `true` if the tag was written
    #[inline]
    pub fn is_success(&self) -> bool {
        !matches!(self, InsertOutcome::Full)
    }

    /// The kicked tag, if any
    #[inline]
    pub fn evicted(&self) -> Option<u32> {
        match self {
            InsertOutcome::Evicted(tag) => Some(*tag),
            _ => None,
        }
    }
}

/// Fixed-size table of bucketed, bit-packed tags
///
/// Equality compares `bits_per_tag`, `max_keys` and the stored bits; the
/// bucket count only sized the storage and is not compared. `Clone` yields
/// a table with its own storage.
#[derive(Clone, Debug)]
pub struct FilterTable<S = RandomSlots> {
    /// Tag storage
    bits: PackedBits,

    /// Width of each tag
    bits_per_tag: u32,

    /// Number of buckets the storage was sized for
    num_buckets: usize,

    /// Capacity hint from the owning filter
    max_keys: usize,

    /// Picks victims when kicking from a full bucket
    selector: S,
}

impl FilterTable<RandomSlots> {
    /// Create an empty table with a randomly seeded victim selector
    pub fn create(bits_per_tag: u32, num_buckets: usize, max_keys: usize) -> Result<Self> {
        Self::with_config(TableConfig::new(bits_per_tag, num_buckets, max_keys))
    }

    /// Create an empty table from a config
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_selector(config, RandomSlots::new())
    }
}

impl<S: SlotSelector> FilterTable<S> {
    /// Create an empty table using `selector` to pick eviction victims.
    ///
    /// Fails before allocating if the config is out of bounds or the
    /// storage size would not fit the 32 bit boundary.
    pub fn with_selector(config: TableConfig, selector: S) -> Result<Self> {
        let storage_bits = config.validate()?;
        debug!(
            "allocating filter table: bits_per_tag={} buckets={} max_keys={} storage_bits={}",
            config.bits_per_tag, config.num_buckets, config.max_keys, storage_bits
        );
        Ok(Self::from_parts(
            PackedBits::zeroed(storage_bits),
            config,
            selector,
        ))
    }

    /// Insert `tag` into the first empty slot of `bucket`.
    ///
    /// When the bucket is full and `kick_on_full` is set, a random slot is
    /// overwritten and its old tag returned in [`InsertOutcome::Evicted`].
    /// Deciding where the victim goes next is up to the caller.
    pub fn insert_tag_into_bucket(
        &mut self,
        bucket: usize,
        tag: u32,
        kick_on_full: bool,
    ) -> InsertOutcome {
        debug_assert!(tag != 0, "tag 0 is reserved for empty slots");
        debug_assert!(tag <= self.tag_mask(), "tag wider than bits_per_tag");

        for slot in 0..BUCKET_SIZE {
            if self.read_tag(bucket, slot) == 0 {
                self.write_tag(bucket, slot, tag);
                return InsertOutcome::Inserted;
            }
        }

        if !kick_on_full {
            return InsertOutcome::Full;
        }

        // bucket is full, kick a random victim
        let slot = self.selector.select(BUCKET_SIZE);
        debug_assert!(slot < BUCKET_SIZE, "selector returned slot {}", slot);
        let old_tag = self.read_tag(bucket, slot);
        debug_assert!(old_tag != 0, "full bucket holds an empty slot");
        self.write_tag(bucket, slot, tag);
        trace!(
            "bucket {} full, evicted tag {:#x} from slot {}",
            bucket,
            old_tag,
            slot
        );
        InsertOutcome::Evicted(old_tag)
    }

    /// Checked [`insert_tag_into_bucket`](Self::insert_tag_into_bucket)
    pub fn try_insert_tag_into_bucket(
        &mut self,
        bucket: usize,
        tag: u32,
        kick_on_full: bool,
    ) -> Result<InsertOutcome> {
        self.check_bucket(bucket)?;
        self.check_tag(tag)?;
        Ok(self.insert_tag_into_bucket(bucket, tag, kick_on_full))
    }
}

impl<S> FilterTable<S> {
    pub(crate) fn from_parts(bits: PackedBits, config: TableConfig, selector: S) -> Self {
        Self {
            bits,
            bits_per_tag: config.bits_per_tag,
            num_buckets: config.num_buckets,
            max_keys: config.max_keys,
            selector,
        }
    }

    /// Width of each tag in bits
    #[inline]
    pub fn bits_per_tag(&self) -> u32 {
        self.bits_per_tag
    }

    /// Number of buckets
    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Capacity hint the table was created with
    #[inline]
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Dimensions this table was created with
    pub fn config(&self) -> TableConfig {
        TableConfig::new(self.bits_per_tag, self.num_buckets, self.max_keys)
    }

    /// Largest tag value that fits in a slot
    #[inline]
    pub fn tag_mask(&self) -> u32 {
        field_mask(self.bits_per_tag) as u32
    }

    /// Size of the tag region in bits
    #[inline]
    pub fn storage_bits(&self) -> u64 {
        self.bits.len()
    }

    /// Allocated storage in bits, rounded up to whole words
    #[inline]
    pub fn storage_size(&self) -> u64 {
        self.bits.words().len() as u64 * 64
    }

    /// Heap bytes held by the tag storage
    #[inline]
    pub fn memory_usage(&self) -> usize {
        self.bits.words().len() * std::mem::size_of::<u64>()
    }

    /// Reference to the victim selector
    pub fn selector(&self) -> &S {
        &self.selector
    }

    pub(crate) fn bits(&self) -> &PackedBits {
        &self.bits
    }

    /// Bit offset of `slot` in `bucket`
    #[inline(always)]
    fn tag_offset(&self, bucket: usize, slot: usize) -> usize {
        let bits_per_tag = self.bits_per_tag as usize;
        bucket * BUCKET_SIZE * bits_per_tag + slot * bits_per_tag
    }

    /// Read the tag at `slot` in `bucket`; 0 means empty.
    #[inline]
    pub fn read_tag(&self, bucket: usize, slot: usize) -> u32 {
        self.bits.read(self.tag_offset(bucket, slot), self.bits_per_tag)
    }

    /// Write `tag` at `slot` in `bucket`.
    ///
    /// Only the low `bits_per_tag` bits of `tag` are stored. Writing 0 empties the slot.
    #[inline]
    pub fn write_tag(&mut self, bucket: usize, slot: usize, tag: u32) {
        let offset = self.tag_offset(bucket, slot);
        self.bits.write(offset, self.bits_per_tag, tag);
    }

    /// Copy of every slot in `bucket`, in slot order
    #[inline]
    pub fn bucket_tags(&self, bucket: usize) -> [u32; BUCKET_SIZE] {
        std::array::from_fn(|slot| self.read_tag(bucket, slot))
    }

    /// Check if `tag` is stored in either bucket. Argument order does not matter.
    #[inline]
    pub fn find_tag_in_buckets(&self, bucket1: usize, bucket2: usize, tag: u32) -> bool {
        debug_assert!(tag != 0, "tag 0 is reserved for empty slots");
        (0..BUCKET_SIZE)
            .any(|slot| self.read_tag(bucket1, slot) == tag || self.read_tag(bucket2, slot) == tag)
    }

    /// Clear the first slot in `bucket` holding `tag`.
    ///
    /// Returns `false` and leaves the bucket alone if no slot matches.
    /// Duplicate tags are removed one per call.
    pub fn delete_tag_in_bucket(&mut self, bucket: usize, tag: u32) -> bool {
        for slot in 0..BUCKET_SIZE {
            if self.read_tag(bucket, slot) == tag {
                self.write_tag(bucket, slot, 0);
                return true;
            }
        }
        false
    }

    /// Checked [`read_tag`](Self::read_tag)
    pub fn try_read_tag(&self, bucket: usize, slot: usize) -> Result<u32> {
        self.check_bucket(bucket)?;
        check_slot(slot)?;
        Ok(self.read_tag(bucket, slot))
    }

    /// Checked [`write_tag`](Self::write_tag); rejects tags wider than a slot.
    pub fn try_write_tag(&mut self, bucket: usize, slot: usize, tag: u32) -> Result<()> {
        self.check_bucket(bucket)?;
        check_slot(slot)?;
        if tag > self.tag_mask() {
            return Err(TableError::TagOutOfRange {
                tag,
                bits: self.bits_per_tag,
            });
        }
        self.write_tag(bucket, slot, tag);
        Ok(())
    }

    /// Checked [`find_tag_in_buckets`](Self::find_tag_in_buckets)
    pub fn try_find_tag_in_buckets(&self, bucket1: usize, bucket2: usize, tag: u32) -> Result<bool> {
        self.check_bucket(bucket1)?;
        self.check_bucket(bucket2)?;
        self.check_tag(tag)?;
        Ok(self.find_tag_in_buckets(bucket1, bucket2, tag))
    }

    /// Checked [`delete_tag_in_bucket`](Self::delete_tag_in_bucket)
    pub fn try_delete_tag_in_bucket(&mut self, bucket: usize, tag: u32) -> Result<bool> {
        self.check_bucket(bucket)?;
        self.check_tag(tag)?;
        Ok(self.delete_tag_in_bucket(bucket, tag))
    }

    fn check_bucket(&self, bucket: usize) -> Result<()> {
        if bucket >= self.num_buckets {
            return Err(TableError::BucketOutOfRange {
                bucket,
                buckets: self.num_buckets,
            });
        }
        Ok(())
    }

    /// Tags passed to insert/find/delete must be nonzero and fit a slot
    fn check_tag(&self, tag: u32) -> Result<()> {
        if tag == 0 || tag > self.tag_mask() {
            return Err(TableError::TagOutOfRange {
                tag,
                bits: self.bits_per_tag,
            });
        }
        Ok(())
    }
}

fn check_slot(slot: usize) -> Result<()> {
    if slot >= BUCKET_SIZE {
        return Err(TableError::SlotOutOfRange { slot });
    }
    Ok(())
}

impl<S> PartialEq for FilterTable<S> {
    fn eq(&self, other: &Self) -> bool {
        self.bits_per_tag == other.bits_per_tag
            && self.max_keys == other.max_keys
            && self.bits == other.bits
    }
}

impl<S> Eq for FilterTable<S> {}

impl<S> Hash for FilterTable<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits_per_tag.hash(state);
        self.max_keys.hash(state);
        self.bits.significant_words().hash(state);
    }
}
