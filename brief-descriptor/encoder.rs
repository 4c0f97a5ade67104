use brief_core::{BriefError, BriefResult, Descriptors, Keypoint, Word, WORD_BITS};
use log::trace;
use rayon::prelude::*;

use crate::cache::ImageOffsetTable;

/// Packs intensity comparisons around keypoints into binary descriptors.
///
/// For test `j` the encoder sets bit `j % 32` of the current word when the
/// first sampled pixel is strictly darker than the second, and flushes the
/// word every 32 tests.
pub struct DescriptorEncoder<'a> {
    offsets: &'a ImageOffsetTable,
    parallel: bool,
}

impl<'a> DescriptorEncoder<'a> {
    pub fn new(offsets: &'a ImageOffsetTable) -> Self {
        Self {
            offsets,
            parallel: true,
        }
    }

    /// Describe keypoints one after another on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    /// Encode one descriptor per keypoint, concatenated in keypoint order.
    ///
    /// `width` must be the width the offsets were resolved for. Any sample that
    /// lands outside `pixels` fails with [`BriefError::OutOfBounds`].
    pub fn encode<P>(&self, pixels: &[P], width: usize, keypoints: &[Keypoint]) -> BriefResult<Descriptors>
    where
        P: PartialOrd + Copy + Sync,
    {
        if width != self.offsets.width() {
            return Err(BriefError::SizeMismatch {
                what: "image width for resolved offsets",
                expected: self.offsets.width(),
                actual: width,
            });
        }

        let bits = self.offsets.bits();
        let per = bits / WORD_BITS;
        let mut words: Vec<Word> = vec![0; keypoints.len() * per];
        if keypoints.is_empty() {
            return Descriptors::from_words(bits, words);
        }

        if self.parallel {
            words
                .par_chunks_mut(per)
                .zip(keypoints.par_iter())
                .enumerate()
                .try_for_each(|(i, (out, kp))| self.encode_keypoint(pixels, width, i, kp, out))?;
        } else {
            words
                .chunks_mut(per)
                .zip(keypoints.iter())
                .enumerate()
                .try_for_each(|(i, (out, kp))| self.encode_keypoint(pixels, width, i, kp, out))?;
        }

        trace!("Encoded {} descriptors of {} bits", keypoints.len(), bits);
        Descriptors::from_words(bits, words)
    }

    fn encode_keypoint<P>(
        &self,
        pixels: &[P],
        width: usize,
        index: usize,
        kp: &Keypoint,
        out: &mut [Word],
    ) -> BriefResult<()>
    where
        P: PartialOrd + Copy,
    {
        let base = kp
            .y
            .checked_mul(width)
            .and_then(|v| v.checked_add(kp.x))
            .and_then(|v| isize::try_from(v).ok())
            .ok_or(BriefError::OutOfBounds {
                keypoint: index,
                index: isize::MAX,
                len: pixels.len(),
            })?;

        let mut word: Word = 0;
        let mut position = 0;
        for (j, (a, b)) in self.offsets.pairs().enumerate() {
            let first = sample(pixels, base, a, index)?;
            let second = sample(pixels, base, b, index)?;
            if first < second {
                word |= 1 << (j % WORD_BITS);
            }
            if (j + 1) % WORD_BITS == 0 {
                out[position] = word;
                position += 1;
                word = 0;
            }
        }
        Ok(())
    }
}

#[inline]
fn sample<P: Copy>(pixels: &[P], base: isize, delta: isize, keypoint: usize) -> BriefResult<P> {
    let index = base.checked_add(delta).ok_or(BriefError::OutOfBounds {
        keypoint,
        index: isize::MAX,
        len: pixels.len(),
    })?;
    usize::try_from(index)
        .ok()
        .and_then(|i| pixels.get(i).copied())
        .ok_or(BriefError::OutOfBounds {
            keypoint,
            index,
            len: pixels.len(),
        })
}
