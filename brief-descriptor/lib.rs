//! BRIEF descriptor generation.
//!
//! A [`MatchingContext`] owns one randomly generated sampling pattern
//! ([`WindowOffsetTable`]) and caches its per-width pixel-index form
//! ([`ImageOffsetTable`]). Describing an image resolves the offsets for its
//! width and packs one intensity comparison per bit.

pub mod builder;
pub mod cache;
pub mod context;
pub mod encoder;
pub mod offsets;

pub use builder::ContextBuilder;
pub use cache::{ImageOffsetCache, ImageOffsetTable};
pub use context::MatchingContext;
pub use encoder::DescriptorEncoder;
pub use offsets::{WindowOffset, WindowOffsetTable};

pub use brief_core::{BriefConfig, BriefError, BriefResult, Descriptors, Keypoint};
