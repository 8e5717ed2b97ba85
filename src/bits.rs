//! Bit region backed by `u64` words with fixed-width field access.
//!
//! - Fields are addressed by bit offset, little-endian bit order
//! - Reads and writes go through a 128-bit window over two adjacent words,
//!   so a field may straddle a word boundary without branching
//! - One zeroed guard word trails the region so the window never runs off the end

/// Computes the number of `u64` words needed to store `n` bits.
#[inline]
pub const fn words_for_bits(n: u64) -> usize {
    n.div_ceil(64) as usize
}

/// Mask covering the low `width` bits
#[inline(always)]
pub const fn field_mask(width: u32) -> u64 {
    debug_assert!(width <= 32);
    (1u64 << width) - 1
}

/// Zero-initialized, fixed-length bit region.
#[derive(Clone, Debug)]
pub struct PackedBits {
    /// Data words followed by one guard word that stays zero
    words: Box<[u64]>,

    /// Logical length in bits
    len: u64,
}

impl PackedBits {
    /// Allocate a region of `len` bits, all clear.
    pub fn zeroed(len: u64) -> Self {
        let data_words = words_for_bits(len);
        Self {
            words: vec![0u64; data_words + 1].into_boxed_slice(),
            len,
        }
    }

    /// Logical length in bits
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Data words, excluding the guard word
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words[..self.words.len() - 1]
    }

    /// Data words with trailing zero words dropped.
    ///
    /// Two regions holding the same set bits have equal significant words
    /// regardless of their lengths.
    pub fn significant_words(&self) -> &[u64] {
        let words = self.words();
        let end = words.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1);
        &words[..end]
    }

    /// Reads the `width`-bit field starting at bit `offset`.
    ///
    /// Caller must keep `offset + width <= len`; this is only checked in debug builds.
    #[inline]
    pub fn read(&self, offset: usize, width: u32) -> u32 {
        debug_assert!(offset as u64 + width as u64 <= self.len);
        let (idx, shift) = (offset / 64, offset % 64);
        let window = self.window(idx);
        ((window >> shift) as u64 & field_mask(width)) as u32
    }

    /// Writes the low `width` bits of `value` at bit `offset`.
    ///
    /// Bits of `value` above `width` are dropped; bits outside
    /// `[offset, offset + width)` are left untouched.
    #[inline]
    pub fn write(&mut self, offset: usize, width: u32, value: u32) {
        debug_assert!(offset as u64 + width as u64 <= self.len);
        let (idx, shift) = (offset / 64, offset % 64);
        let mask = field_mask(width);
        let field = (mask as u128) << shift;
        let bits = ((value as u64 & mask) as u128) << shift;

        let window = (self.window(idx) & !field) | bits;
        self.words[idx] = window as u64;
        self.words[idx + 1] = (window >> 64) as u64;
    }

    #[inline(always)]
    fn window(&self, idx: usize) -> u128 {
        (self.words[idx] as u128) | ((self.words[idx + 1] as u128) << 64)
    }

    /// Packs the region little-endian into exactly `len.div_ceil(8)` bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let byte_len = self.len.div_ceil(8) as usize;
        let mut bytes: Vec<u8> = self.words().iter().flat_map(|w| w.to_le_bytes()).collect();
        bytes.truncate(byte_len);
        bytes
    }

    /// Rebuilds a region of `len` bits from [`to_le_bytes`](Self::to_le_bytes) output.
    ///
    /// Returns `None` when the byte count does not match `len` or a bit past
    /// `len` is set.
    pub fn from_le_bytes(bytes: &[u8], len: u64) -> Option<Self> {
        if bytes.len() as u64 != len.div_ceil(8) {
            return None;
        }

        let mut region = Self::zeroed(len);
        for (word, chunk) in region.words.iter_mut().zip(bytes.chunks(8)) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            *word = u64::from_le_bytes(buf);
        }

        // stray bits in the final partial word
        let tail = (len % 64) as u32;
        if tail != 0 {
            let last = region.words().len() - 1;
            if region.words[last] & !field_mask_wide(tail) != 0 {
                return None;
            }
        }
        Some(region)
    }
}

/// Like [`field_mask`] but for widths up to 63 bits.
#[inline]
const fn field_mask_wide(width: u32) -> u64 {
    (1u64 << width) - 1
}

impl PartialEq for PackedBits {
    /// Compares set bits only; trailing clear bits do not matter.
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for PackedBits {}
