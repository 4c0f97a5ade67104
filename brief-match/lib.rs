//! Nearest-neighbour matching of BRIEF descriptors by Hamming distance,
//! with a mutual-consistency filter to reject one-sided matches.

pub mod matcher;
pub mod reciprocal;

pub use matcher::{match_descriptors, nearest, HammingMatcher};
pub use reciprocal::{filter_reciprocal, reciprocal_match};

pub use brief_core::{BriefError, BriefResult, Descriptors, Keypoint, Match};
