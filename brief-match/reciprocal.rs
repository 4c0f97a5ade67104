use brief_core::{BriefResult, Descriptors, Keypoint, Match};
use log::debug;

use crate::matcher::{validate_pair, HammingMatcher};

impl HammingMatcher {
    /// Match in both directions and keep only mutual nearest neighbours.
    ///
    /// `A[i] -> B[j]` survives iff `B[j] -> A[i]`. The result is a subsequence of
    /// the A→B matches, in the same order.
    pub fn match_reciprocal(
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

        let forward = || self.match_one_way(keypoints_a, descriptors_a, keypoints_b, descriptors_b);
        let backward = || self.match_one_way(keypoints_b, descriptors_b, keypoints_a, descriptors_a);
        let (ab, ba) = if self.parallel {
            rayon::join(forward, backward)
        } else {
            (forward(), backward())
        };

        let total = keypoints_a.len();
        let kept = filter_reciprocal(ab?, &ba?);
        debug!("Reciprocal filter kept {} of {} matches", kept.len(), total);
        Ok(kept)
    }
}

/// Keep `forward[i]` iff `backward[forward[i].index_b].index_b == i`.
pub fn filter_reciprocal(forward: Vec<Match>, backward: &[Match]) -> Vec<Match> {
    forward
        .into_iter()
        .enumerate()
        .filter(|(i, m)| backward.get(m.index_b).is_some_and(|r| r.index_b == *i))
        .map(|(_, m)| m)
        .collect()
}

/// Reciprocal match with the default (parallel) matcher
pub fn reciprocal_match(
    keypoints_a: &[Keypoint],
    descriptors_a: &Descriptors,
    keypoints_b: &[Keypoint],
    descriptors_b: &Descriptors,
) -> BriefResult<Vec<Match>> {
    HammingMatcher::new().match_reciprocal(keypoints_a, descriptors_a, keypoints_b, descriptors_b)
}
