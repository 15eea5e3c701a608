//! Common types and bit helpers shared by every hardware component.

/// 8-bit unsigned integer (Game Boy byte)
pub type Byte = u8;

/// 16-bit unsigned integer (Game Boy word / address)
pub type Word = u16;

/// Check if a specific bit is set in a byte value
///
/// # Arguments
/// * `value` - The byte to test
/// * `n` - The bit position (0-7)
///
/// # Returns
/// `true` if bit `n` is set
#[inline]
pub fn bit(value: Byte, n: u8) -> bool {
    (value & (1 << n)) != 0
}

/// Set or clear a single bit in place
///
/// # Arguments
/// * `value` - The byte to modify
/// * `n` - The bit position (0-7)
/// * `on` - Whether the bit ends up set
#[inline]
pub fn bit_set(value: &mut Byte, n: u8, on: bool) {
    if on {
        *value |= 1 << n;
    } else {
        *value &= !(1 << n);
    }
}

/// Combine a high and low byte into a word
///
/// # Arguments
/// * `hi` - Bits 15-8
/// * `lo` - Bits 7-0
///
/// # Returns
/// The 16-bit value `hi:lo`
#[inline]
pub fn word(hi: Byte, lo: Byte) -> Word {
    ((hi as Word) << 8) | lo as Word
}

/// Split a word into its two bytes
///
/// # Returns
/// `(hi, lo)`, the inverse of [`word`]
#[inline]
pub fn split(value: Word) -> (Byte, Byte) {
    ((value >> 8) as Byte, value as Byte)
}
