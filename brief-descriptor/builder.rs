use brief_core::{BriefConfig, BriefResult};

use crate::context::MatchingContext;
use crate::offsets::WindowOffsetTable;

/// Builder for creating a [`MatchingContext`]
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    config: BriefConfig,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: BriefConfig::default(),
        }
    }

    /// Set the descriptor length in bits (multiple of 32)
    pub fn bits(mut self, bits: usize) -> Self {
        self.config.bits = bits;
        self
    }

    /// Fix the sampling seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the half-open sampling range `[min, max)`
    pub fn offset_range(mut self, min: i32, max: i32) -> Self {
        self.config.offset_min = min;
        self.config.offset_max = max;
        self
    }

    /// Set the number of threads for parallel processing
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    /// Enable or disable rayon parallelism
    pub fn parallel(mut self, enable: bool) -> Self {
        self.config.parallel = enable;
        self
    }

    pub fn preset_compact(self) -> Self {
        self.apply_preset(BriefConfig::compact())
    }

    pub fn preset_balanced(self) -> Self {
        self.apply_preset(BriefConfig::balanced())
    }

    pub fn preset_extended(self) -> Self {
        self.apply_preset(BriefConfig::extended())
    }

    // Presets only choose the length; seed, range and threading stay as set.
    fn apply_preset(mut self, preset: BriefConfig) -> Self {
        self.config.bits = preset.bits;
        self.config.name = preset.name;
        self.config.description = preset.description;
        self
    }

    /// Build the context, generating a new sampling pattern
    pub fn build(self) -> BriefResult<MatchingContext> {
        MatchingContext::new(self.config)
    }

    /// Build the context around an existing sampling pattern
    pub fn build_with_table(self, table: WindowOffsetTable) -> BriefResult<MatchingContext> {
        MatchingContext::with_table(self.config, table)
    }

    pub fn summary(&self) -> String {
        self.config.summary()
    }

    pub fn from_config(config: BriefConfig) -> Self {
        Self { config }
    }

    pub fn to_config(self) -> BriefConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::BriefError;

    #[test]
    fn test_builder_settings() {
        let cfg = ContextBuilder::new()
            .seed(4)
            .offset_range(-8, 9)
            .threads(2)
            .parallel(false)
            .preset_extended()
            .to_config();
        assert_eq!(cfg.bits, 512);
        assert_eq!(cfg.seed, Some(4));
        assert_eq!((cfg.offset_min, cfg.offset_max), (-8, 9));
        assert_eq!(cfg.n_threads, 2);
        assert!(!cfg.parallel);
        assert_eq!(cfg.name.as_deref(), Some("Extended"));
    }

    #[test]
    fn test_build_respects_range() {
        let ctx = ContextBuilder::new().bits(64).seed(2).offset_range(-2, 3).build().unwrap();
        assert_eq!(ctx.bits(), 64);
        assert!(ctx.border() <= 2);
        assert_eq!(ctx.table().seed(), Some(2));
    }

    #[test]
    fn test_build_invalid() {
        let result = ContextBuilder::new().bits(33).build();
        assert!(matches!(result, Err(BriefError::InvalidConfiguration { .. })));

        let result = ContextBuilder::new().offset_range(3, -3).build();
        assert!(matches!(result, Err(BriefError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_round_trip_through_config() {
        let builder = ContextBuilder::new().preset_compact().seed(8);
        let again = ContextBuilder::from_config(builder.clone().to_config());
        assert_eq!(builder.summary(), again.summary());
    }
}
