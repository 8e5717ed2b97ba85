//! Table geometry and sizing.
//!
//! - 4 slots per bucket
//! - Tags are 5..=27 bits wide
//! - Storage is capped below the 32 bit boundary, checked before allocation

use crate::error::{Result, TableError};

/// Number of tag slots per bucket
pub const BUCKET_SIZE: usize = 4;

/// Narrowest tag; shorter fingerprints give poor fill capacity
pub const MIN_TAG_BITS: u32 = 5;

/// Widest tag that can be packed alongside the bucket/slot arithmetic
pub const MAX_TAG_BITS: u32 = 27;

/// Exclusive upper bound on the storage region, in bits
pub const MAX_STORAGE_BITS: u64 = i32::MAX as u64;

/// Dimensions of a [`FilterTable`](crate::FilterTable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Width of each tag in bits
    pub bits_per_tag: u32,
    /// Number of buckets; only used to size the storage region
    pub num_buckets: usize,
    /// Capacity hint carried by the table, not enforced
    pub max_keys: usize,
}

impl TableConfig {
    pub const fn new(bits_per_tag: u32, num_buckets: usize, max_keys: usize) -> Self {
        Self {
            bits_per_tag,
            num_buckets,
            max_keys,
        }
    }

    /// Bits occupied by one bucket
    #[inline]
    pub const fn bits_per_bucket(&self) -> u64 {
        BUCKET_SIZE as u64 * self.bits_per_tag as u64
    }

    /// Checks the parameter bounds and returns the required storage size in bits.
    pub fn validate(&self) -> Result<u64> {
        if !(MIN_TAG_BITS..=MAX_TAG_BITS).contains(&self.bits_per_tag) {
            return Err(TableError::TagBitsOutOfRange {
                bits: self.bits_per_tag,
            });
        }
        if self.num_buckets <= 1 {
            return Err(TableError::TooFewBuckets {
                buckets: self.num_buckets,
            });
        }
        if self.max_keys <= 1 {
            return Err(TableError::TooFewKeys {
                max_keys: self.max_keys,
            });
        }

        let bits_per_bucket = (BUCKET_SIZE as u32)
            .checked_mul(self.bits_per_tag)
            .ok_or(TableError::StorageOverflow)?;
        let num_buckets =
            u64::try_from(self.num_buckets).map_err(|_| TableError::StorageOverflow)?;
        let bits = u64::from(bits_per_bucket)
            .checked_mul(num_buckets)
            .ok_or(TableError::StorageOverflow)?;

        if bits >= MAX_STORAGE_BITS {
            return Err(TableError::StorageTooLarge { bits });
        }
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = TableConfig::new(12, 1000, 2_000_000);
        assert_eq!(config.bits_per_bucket(), 48);
        assert_eq!(config.validate(), Ok(48_000));
    }

    #[test]
    fn test_tag_bits_bounds() {
        assert_eq!(
            TableConfig::new(4, 100, 10_000).validate(),
            Err(TableError::TagBitsOutOfRange { bits: 4 })
        );
        assert_eq!(
            TableConfig::new(28, 100, 10_000).validate(),
            Err(TableError::TagBitsOutOfRange { bits: 28 })
        );
        assert!(TableConfig::new(MIN_TAG_BITS, 100, 10_000).validate().is_ok());
        assert!(TableConfig::new(MAX_TAG_BITS, 100, 10_000).validate().is_ok());
    }

    #[test]
    fn test_bucket_and_key_bounds() {
        assert_eq!(
            TableConfig::new(12, 1, 10_000).validate(),
            Err(TableError::TooFewBuckets { buckets: 1 })
        );
        assert_eq!(
            TableConfig::new(12, 100, 1).validate(),
            Err(TableError::TooFewKeys { max_keys: 1 })
        );
    }

    #[test]
    fn test_storage_too_large() {
        // 4 * 27 * 20M = 2.16e9 bits
        let err = TableConfig::new(27, 20_000_000, 10_000).validate().unwrap_err();
        assert_eq!(err, TableError::StorageTooLarge { bits: 2_160_000_000 });

        // exactly 2^31 bits
        let err = TableConfig::new(16, 1 << 25, 10_000).validate().unwrap_err();
        assert_eq!(err, TableError::StorageTooLarge { bits: 1 << 31 });
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_storage_overflow() {
        let err = TableConfig::new(27, usize::MAX, 10_000).validate().unwrap_err();
        assert_eq!(err, TableError::StorageOverflow);
    }
}
