use crate::bits::{is_valid_bit_length, WORD_BITS};
use crate::error::{BriefError, BriefResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default descriptor length. 256 bits trades speed against recognition rate.
pub const DEFAULT_BITS: usize = 256;
/// Inclusive lower bound of sampled window offsets
pub const DEFAULT_OFFSET_MIN: i32 = -15;
/// Exclusive upper bound of sampled window offsets
pub const DEFAULT_OFFSET_MAX: i32 = 16;

/// Complete descriptor and matching configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BriefConfig {
    /// Descriptor bit-length N (positive multiple of 32)
    pub bits: usize,
    /// Sampling range `[offset_min, offset_max)` for window offsets
    pub offset_min: i32,
    pub offset_max: i32,
    /// Seed for the sampling pattern. `None` draws a fresh seed per table.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub seed: Option<u64>,
    pub n_threads: usize,
    /// Run encoding and matching on the rayon pool
    pub parallel: bool,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self::with_bits(DEFAULT_BITS)
    }
}

impl BriefConfig {
    /// Default settings with a custom descriptor length
    pub fn with_bits(bits: usize) -> Self {
        Self {
            bits,
            offset_min: DEFAULT_OFFSET_MIN,
            offset_max: DEFAULT_OFFSET_MAX,
            seed: None,
            n_threads: num_cpus::get().max(1),
            parallel: true,
            name: None,
            description: None,
        }
    }

    /// 128-bit descriptors: fastest matching, smallest storage
    pub fn compact() -> Self {
        Self {
            name: Some("Compact".to_string()),
            description: Some("128-bit descriptors for speed and storage".to_string()),
            ..Self::with_bits(128)
        }
    }

    /// 256-bit descriptors
    pub fn balanced() -> Self {
        Self {
            name: Some("Balanced".to_string()),
            description: Some("256-bit descriptors balancing speed and recognition".to_string()),
            ..Self::with_bits(256)
        }
    }

    /// 512-bit descriptors: best recognition rate
    pub fn extended() -> Self {
        Self {
            name: Some("Extended".to_string()),
            description: Some("512-bit descriptors for maximum recognition rate".to_string()),
            ..Self::with_bits(512)
        }
    }

    /// Fix the sampling seed so the pattern is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Number of packed words per descriptor
    pub fn words_per_descriptor(&self) -> usize {
        self.bits / WORD_BITS
    }

    pub fn validate(&self) -> BriefResult<()> {
        if !is_valid_bit_length(self.bits) {
            return Err(BriefError::invalid_configuration(format!(
                "descriptor length {} is not a positive multiple of {}",
                self.bits, WORD_BITS
            )));
        }
        if self.offset_min >= self.offset_max {
            return Err(BriefError::invalid_configuration(format!(
                "empty offset range [{}, {})",
                self.offset_min, self.offset_max
            )));
        }
        if self.n_threads == 0 {
            return Err(BriefError::invalid_configuration("n_threads must be at least 1"));
        }
        Ok(())
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "BriefConfig: bits={}, offsets=[{}, {}), seed={}, threads={}, parallel={}",
            self.bits,
            self.offset_min,
            self.offset_max,
            self.seed.map_or_else(|| "random".to_string(), |s| s.to_string()),
            self.n_threads,
            self.parallel
        )
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = BriefConfig::default();
        assert_eq!(cfg.bits, 256);
        assert_eq!((cfg.offset_min, cfg.offset_max), (-15, 16));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(BriefConfig::compact().bits, 128);
        assert_eq!(BriefConfig::balanced().bits, 256);
        assert_eq!(BriefConfig::extended().bits, 512);
        assert_eq!(BriefConfig::extended().words_per_descriptor(), 16);
        for cfg in [BriefConfig::compact(), BriefConfig::balanced(), BriefConfig::extended()] {
            assert!(cfg.validate().is_ok(), "{}", cfg.summary());
        }
    }

    #[test]
    fn test_invalid_bit_length() {
        for bits in [0, 31, 100, 257] {
            let result = BriefConfig::with_bits(bits).validate();
            assert!(matches!(result, Err(BriefError::InvalidConfiguration { .. })), "bits={}", bits);
        }
    }

    #[test]
    fn test_invalid_offset_range() {
        let mut cfg = BriefConfig::default();
        cfg.offset_min = 4;
        cfg.offset_max = 4;
        assert!(matches!(cfg.validate(), Err(BriefError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_summary_mentions_seed() {
        let cfg = BriefConfig::compact().with_seed(42);
        assert!(cfg.summary().contains("seed=42"));
        assert!(BriefConfig::default().summary().contains("seed=random"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_round_trip_validates() {
        let cfg = BriefConfig::extended().with_seed(7);
        let text = cfg.to_toml().unwrap();
        let back = BriefConfig::from_toml(&text).unwrap();
        assert_eq!(back, cfg);

        let broken = text.replace("bits = 512", "bits = 500");
        assert!(BriefConfig::from_toml(&broken).is_err());
    }
}
