pub mod bits;
pub mod config;
pub mod error;

pub use bits::{hamming_distance, words_per_descriptor, Word, WORD_BITS};
pub use config::BriefConfig;
pub use error::{BriefError, BriefResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel coordinate produced by an external corner detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: usize,
    pub y: usize,
}

impl Keypoint {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Row-major index of this keypoint in an image of the given width
    #[inline]
    pub fn linear_index(&self, width: usize) -> usize {
        width * self.y + self.x
    }
}

/// Build keypoints from a flat `[x0, y0, x1, y1, ...]` list.
pub fn keypoints_from_flat(flat: &[usize]) -> BriefResult<Vec<Keypoint>> {
    if flat.len() % 2 != 0 {
        return Err(BriefError::SizeMismatch {
            what: "flat keypoint list",
            expected: flat.len() + 1,
            actual: flat.len(),
        });
    }
    Ok(flat.chunks_exact(2).map(|xy| Keypoint::new(xy[0], xy[1])).collect())
}

/// Flatten keypoints back into `[x0, y0, x1, y1, ...]`
pub fn keypoints_to_flat(kps: &[Keypoint]) -> Vec<usize> {
    kps.iter().flat_map(|kp| [kp.x, kp.y]).collect()
}

/// Packed N-bit descriptors, one per keypoint, stored keypoint-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptors {
    bits: usize,
    words: Vec<Word>,
}

impl Descriptors {
    /// Empty set of `bits`-long descriptors
    pub fn new(bits: usize) -> BriefResult<Self> {
        Self::from_words(bits, Vec::new())
    }

    /// Wrap already-packed words. The word count must be a whole number of descriptors.
    pub fn from_words(bits: usize, words: Vec<Word>) -> BriefResult<Self> {
        if !bits::is_valid_bit_length(bits) {
            return Err(BriefError::invalid_configuration(format!(
                "descriptor length {} is not a positive multiple of {}",
                bits, WORD_BITS
            )));
        }
        let per = words_per_descriptor(bits);
        if words.len() % per != 0 {
            return Err(BriefError::SizeMismatch {
                what: "descriptor words",
                expected: (words.len() / per + 1) * per,
                actual: words.len(),
            });
        }
        Ok(Self { bits, words })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn words_per_descriptor(&self) -> usize {
        words_per_descriptor(self.bits)
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.words.len() / self.words_per_descriptor()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&[Word]> {
        let per = self.words_per_descriptor();
        let start = i.checked_mul(per)?;
        self.words.get(start..start.checked_add(per)?)
    }

    pub fn iter(&self) -> std::slice::ChunksExact<'_, Word> {
        self.words.chunks_exact(self.words_per_descriptor())
    }

    /// Bit `j` of descriptor `i`
    pub fn bit(&self, i: usize, j: usize) -> Option<bool> {
        if j >= self.bits {
            return None;
        }
        self.get(i).map(|d| bits::get_bit(d, j))
    }

    pub fn as_words(&self) -> &[Word] {
        &self.words
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    /// Hamming distance between descriptor `i` of `self` and descriptor `j` of `other`
    pub fn distance(&self, i: usize, other: &Descriptors, j: usize) -> Option<u32> {
        Some(hamming_distance(self.get(i)?, other.get(j)?))
    }
}

/// Nearest-neighbour correspondence between keypoint `index_a` and `index_b`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    pub index_a: usize,
    pub index_b: usize,
    pub keypoint_a: Keypoint,
    pub keypoint_b: Keypoint,
    /// Minimum Hamming distance found
    pub distance: u32,
    /// `1 - distance / bits`, in `[0, 1]`
    pub confidence: f32,
}

impl Match {
    pub fn confidence_for(distance: u32, bits: usize) -> f32 {
        1.0 - distance as f32 / bits as f32
    }
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> BriefResult<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()?;
    Ok(())
}
