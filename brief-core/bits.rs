//! Bit-level helpers shared by the encoder and the matcher.
//!
//! Bit `j` of an N-bit descriptor lives in word `j / WORD_BITS` at position
//! `j % WORD_BITS`. Every component reads and writes descriptors through this
//! convention.

/// Storage word of a packed descriptor
pub type Word = u32;

/// Number of bits held by one [`Word`]
pub const WORD_BITS: usize = Word::BITS as usize;

/// Number of words needed to hold a `bits`-long descriptor.
#[inline]
pub fn words_per_descriptor(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// Whether `bits` is a usable descriptor length (positive multiple of the word width).
#[inline]
pub fn is_valid_bit_length(bits: usize) -> bool {
    bits > 0 && bits % WORD_BITS == 0
}

/// Number of differing bits between two equal-length packed codes.
///
/// Both slices are expected to have the same length; extra words in the longer
/// slice are ignored.
#[inline]
pub fn hamming_distance(a: &[Word], b: &[Word]) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

#[inline]
pub fn get_bit(words: &[Word], j: usize) -> bool {
    (words[j / WORD_BITS] >> (j % WORD_BITS)) & 1 == 1
}

#[inline]
pub fn set_bit(words: &mut [Word], j: usize) {
    words[j / WORD_BITS] |= 1 << (j % WORD_BITS);
}
