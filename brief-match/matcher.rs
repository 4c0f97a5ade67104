use brief_core::{hamming_distance, BriefError, BriefResult, Descriptors, Keypoint, Match, Word};
use log::debug;
use rayon::prelude::*;

/// Brute-force nearest-neighbour search over packed binary descriptors.
///
/// Every query descriptor is compared with every train descriptor; the first
/// train descriptor reaching the minimum Hamming distance wins.
#[derive(Debug, Clone, Copy)]
pub struct HammingMatcher {
    pub(crate) parallel: bool,
}

impl Default for HammingMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HammingMatcher {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Scan queries one after another on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    /// For every descriptor in A, find its nearest neighbour in B.
    ///
    /// Returns one match per keypoint of A, in A's order. Empty A or B yields
    /// an empty result.
    pub fn match_one_way(
        &self,
        keypoints_a: &[Keypoint],
        descriptors_a: &Descriptors,
        keypoints_b: &[Keypoint],
        descriptors_b: &Descriptors,
    ) -> BriefResult<Vec<Match>> {
        validate_pair(keypoints_a, descriptors_a, keypoints_b, descriptors_b)?;
        if keypoints_a.is_empty() || keypoints_b.is_empty() {
            return Ok(Vec::new());
        }

        let bits = descriptors_a.bits();
        let to_match = |(i, query): (usize, &[Word])| {
            let (j, distance) = nearest(query, descriptors_b);
            Match {
                index_a: i,
                index_b: j,
                keypoint_a: keypoints_a[i],
                keypoint_b: keypoints_b[j],
                distance,
                confidence: Match::confidence_for(distance, bits),
            }
        };

        let matches: Vec<Match> = if self.parallel {
            descriptors_a
                .as_words()
                .par_chunks_exact(descriptors_a.words_per_descriptor())
                .enumerate()
                .map(to_match)
                .collect()
        } else {
            descriptors_a.iter().enumerate().map(to_match).collect()
        };

        debug!(
            "Matched {} descriptors against {} ({} bits)",
            keypoints_a.len(),
            keypoints_b.len(),
            bits
        );
        Ok(matches)
    }
}

/// Index and distance of the closest train descriptor. Ties keep the lowest index.
///
/// `train` must not be empty.
pub fn nearest(query: &[Word], train: &Descriptors) -> (usize, u32) {
    let mut min = u32::MAX;
    let mut min_j = 0;
    for (j, candidate) in train.iter().enumerate() {
        let dist = hamming_distance(query, candidate);
        if dist < min {
            min = dist;
            min_j = j;
        }
    }
    (min_j, min)
}

pub(crate) fn validate_pair(
    keypoints_a: &[Keypoint],
    descriptors_a: &Descriptors,
    keypoints_b: &[Keypoint],
    descriptors_b: &Descriptors,
) -> BriefResult<()> {
    if descriptors_a.bits() != descriptors_b.bits() {
        return Err(BriefError::SizeMismatch {
            what: "descriptor bit-length",
            expected: descriptors_a.bits(),
            actual: descriptors_b.bits(),
        });
    }
    if descriptors_a.len() != keypoints_a.len() {
        return Err(BriefError::SizeMismatch {
            what: "descriptors for keypoint set A",
            expected: keypoints_a.len(),
            actual: descriptors_a.len(),
        });
    }
    if descriptors_b.len() != keypoints_b.len() {
        return Err(BriefError::SizeMismatch {
            what: "descriptors for keypoint set B",
            expected: keypoints_b.len(),
            actual: descriptors_b.len(),
        });
    }
    Ok(())
}

/// One-directional match with the default (parallel) matcher
pub fn match_descriptors(
    keypoints_a: &[Keypoint],
    descriptors_a: &Descriptors,
    keypoints_b: &[Keypoint],
    descriptors_b: &Descriptors,
) -> BriefResult<Vec<Match>> {
    HammingMatcher::new().match_one_way(keypoints_a, descriptors_a, keypoints_b, descriptors_b)
}
