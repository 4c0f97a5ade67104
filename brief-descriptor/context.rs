use std::sync::Arc;

use brief_core::{BriefConfig, BriefError, BriefResult, Descriptors, Keypoint};
use log::{debug, info};

use crate::cache::{ImageOffsetCache, ImageOffsetTable};
use crate::encoder::DescriptorEncoder;
use crate::offsets::WindowOffsetTable;

/// Owns one sampling pattern and its per-width offset cache.
///
/// Every image described through the same context yields comparable
/// descriptors. A new pattern means a new context.
#[derive(Debug)]
pub struct MatchingContext {
    config: BriefConfig,
    cache: ImageOffsetCache,
}

impl MatchingContext {
    /// Validate the config and generate a fresh sampling pattern for it
    pub fn new(config: BriefConfig) -> BriefResult<Self> {
        config.validate()?;
        let table = WindowOffsetTable::generate(&config)?;
        info!(
            "Created matching context: {} bits, seed {:?}",
            table.bits(),
            table.seed()
        );
        Ok(Self {
            config,
            cache: ImageOffsetCache::new(Arc::new(table)),
        })
    }

    /// Use an existing sampling pattern, e.g. one shared by another process.
    ///
    /// The stored config takes its seed from the table. The offset range only
    /// drives generation and is not checked against the table.
    pub fn with_table(mut config: BriefConfig, table: WindowOffsetTable) -> BriefResult<Self> {
        config.validate()?;
        if table.bits() != config.bits {
            return Err(BriefError::invalid_configuration(format!(
                "window offset table has {} tests but config asks for {} bits",
                table.bits(),
                config.bits
            )));
        }
        config.seed = table.seed();
        Ok(Self {
            config,
            cache: ImageOffsetCache::new(Arc::new(table)),
        })
    }

    pub fn config(&self) -> &BriefConfig {
        &self.config
    }

    pub fn table(&self) -> &WindowOffsetTable {
        self.cache.table()
    }

    pub fn cache(&self) -> &ImageOffsetCache {
        &self.cache
    }

    pub fn bits(&self) -> usize {
        self.config.bits
    }

    /// Minimum distance a keypoint needs from the image border
    pub fn border(&self) -> usize {
        self.table().radius()
    }

    /// Offsets for images of the given width, cached after first use
    pub fn resolve(&self, width: usize) -> BriefResult<Arc<ImageOffsetTable>> {
        self.cache.resolve(width)
    }

    /// Encode one descriptor per keypoint for a row-major intensity buffer
    pub fn describe<P>(&self, pixels: &[P], width: usize, keypoints: &[Keypoint]) -> BriefResult<Descriptors>
    where
        P: PartialOrd + Copy + Sync,
    {
        let offsets = self.resolve(width)?;
        debug!("Describing {} keypoints at width {}", keypoints.len(), width);
        DescriptorEncoder::new(&offsets)
            .parallel(self.config.parallel)
            .encode(pixels, width, keypoints)
    }
}
