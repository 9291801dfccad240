//! Wire framing constants and the size/variant word.
//!
//! Every non-naked struct on the wire starts with a 24-byte preamble,
//! little-endian throughout:
//!
//! | Offset | Size | Field          |
//! |-------:|-----:|----------------|
//! |      0 |    4 | MAGIC (`TNDV`) |
//! |      4 |    4 | size + variant |
//! |      8 |    8 | struct hash    |
//! |     16 |    8 | timestamp (f64 seconds) |
//!
//! The size word packs a 4-bit publisher variant into its top nibble: if
//! bit 27 is set, bits 27–30 are the variant and bits 0–26 the total
//! framed size; otherwise the variant is 0 and bits 0–30 are the size.
//! The serializer always writes the plain form.

/// `'TNDV'` — the little-endian bytes on the wire read `54 4e 44 56`.
pub const MAGIC: u32 = 0x5644_4e54;

/// Preamble length in bytes.
pub const HEADER_SIZE: usize = 24;

const VARIANT_FLAG: u32 = 0x0800_0000;
const SIZE_MASK_WITH_VARIANT: u32 = 0x07ff_ffff;
const SIZE_MASK_PLAIN: u32 = 0x7fff_ffff;

/// Split a size word into (framed size, variant).
pub fn unpack_size_and_variant(word: u32) -> (usize, u8) {
    if word & VARIANT_FLAG != 0 {
        (
            (word & SIZE_MASK_WITH_VARIANT) as usize,
            ((word >> 27) & 0x0f) as u8,
        )
    } else {
        ((word & SIZE_MASK_PLAIN) as usize, 0)
    }
}

/// Pack a framed size with variant 0.
pub fn pack_size(size: usize) -> u32 {
    size as u32
}
