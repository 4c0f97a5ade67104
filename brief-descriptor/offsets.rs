use brief_core::bits::is_valid_bit_length;
use brief_core::{BriefConfig, BriefError, BriefResult, WORD_BITS};
use log::debug;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// One intensity test, relative to the keypoint: compare `(dx1, dy1)` against `(dx2, dy2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOffset {
    pub dx1: i32,
    pub dy1: i32,
    pub dx2: i32,
    pub dy2: i32,
}

/// Sampling pattern shared by every image described in one matching context.
///
/// Stored flat as `4 * bits` integers, grouped `(dx1, dy1, dx2, dy2)` per test
/// in generation order. Descriptors are only comparable when produced from the
/// same table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOffsetTable {
    bits: usize,
    offsets: Vec<i32>,
    seed: Option<u64>,
}

impl WindowOffsetTable {
    /// Generate a table from the config's length, range and seed.
    ///
    /// Without a configured seed a fresh one is drawn and recorded, so the
    /// resulting table can always be regenerated from [`seed`](Self::seed).
    pub fn generate(config: &BriefConfig) -> BriefResult<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self::generate_with_seed(config.bits, config.offset_min, config.offset_max, seed)
    }

    pub fn generate_with_seed(bits: usize, min: i32, max: i32, seed: u64) -> BriefResult<Self> {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut table = Self::generate_with_rng(bits, min, max, &mut rng)?;
        table.seed = Some(seed);
        debug!("Generated {}-bit window offset table from seed {}", bits, seed);
        Ok(table)
    }

    /// Draw every component independently and uniformly from `[min, max)`.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        bits: usize,
        min: i32,
        max: i32,
        rng: &mut R,
    ) -> BriefResult<Self> {
        check_bits(bits)?;
        if min >= max {
            return Err(BriefError::invalid_configuration(format!(
                "empty offset range [{}, {})",
                min, max
            )));
        }
        let range = Uniform::new(min, max);
        let offsets = (0..4 * bits).map(|_| range.sample(rng)).collect();
        Ok(Self { bits, offsets, seed: None })
    }

    /// Wrap an externally supplied table, e.g. one shared with another process.
    pub fn from_offsets(offsets: Vec<i32>) -> BriefResult<Self> {
        if offsets.is_empty() {
            return Err(BriefError::invalid_configuration("empty window offset table"));
        }
        if offsets.len() % 4 != 0 {
            return Err(BriefError::SizeMismatch {
                what: "window offset table",
                expected: (offsets.len() / 4 + 1) * 4,
                actual: offsets.len(),
            });
        }
        let bits = offsets.len() / 4;
        check_bits(bits)?;
        Ok(Self { bits, offsets, seed: None })
    }

    /// Descriptor length N; the table holds one test per bit
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Seed the table was generated from, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.offsets
    }

    pub fn get(&self, j: usize) -> Option<WindowOffset> {
        self.offsets.get(4 * j..4 * j + 4).map(|c| WindowOffset {
            dx1: c[0],
            dy1: c[1],
            dx2: c[2],
            dy2: c[3],
        })
    }

    pub fn pairs(&self) -> impl ExactSizeIterator<Item = WindowOffset> + '_ {
        self.offsets.chunks_exact(4).map(|c| WindowOffset {
            dx1: c[0],
            dy1: c[1],
            dx2: c[2],
            dy2: c[3],
        })
    }

    /// Largest absolute component; keypoints closer than this to the border
    /// may sample outside the image.
    pub fn radius(&self) -> usize {
        self.offsets
            .iter()
            .map(|o| o.unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }
}

fn check_bits(bits: usize) -> BriefResult<()> {
    if !is_valid_bit_length(bits) {
        return Err(BriefError::invalid_configuration(format!(
            "descriptor length {} is not a positive multiple of {}",
            bits, WORD_BITS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_table_shape_and_range() {
        let table = WindowOffsetTable::generate_with_seed(256, -15, 16, 1).unwrap();
        assert_eq!(table.bits(), 256);
        assert_eq!(table.as_slice().len(), 1024);
        assert_eq!(table.pairs().len(), 256);
        assert!(table.as_slice().iter().all(|&o| (-15..16).contains(&o)));
        assert!(table.radius() <= 15);
    }

    #[test]
    fn test_same_seed_same_table() {
        let a = WindowOffsetTable::generate_with_seed(128, -15, 16, 99).unwrap();
        let b = WindowOffsetTable::generate_with_seed(128, -15, 16, 99).unwrap();
        let c = WindowOffsetTable::generate_with_seed(128, -15, 16, 100).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.as_slice(), c.as_slice());
    }

    #[test]
    fn test_unseeded_config_records_seed() {
        let table = WindowOffsetTable::generate(&BriefConfig::compact()).unwrap();
        let seed = table.seed().unwrap();
        let again = WindowOffsetTable::generate(&BriefConfig::compact().with_seed(seed)).unwrap();
        assert_eq!(table.as_slice(), again.as_slice());
    }

    #[test]
    fn test_range_covers_both_ends() {
        let table = WindowOffsetTable::generate_with_seed(512, -15, 16, 3).unwrap();
        let min = table.as_slice().iter().min().copied();
        let max = table.as_slice().iter().max().copied();
        assert_eq!(min, Some(-15));
        assert_eq!(max, Some(15));
    }

    #[test]
    fn test_invalid_generation_parameters() {
        assert!(matches!(
            WindowOffsetTable::generate_with_seed(0, -15, 16, 1),
            Err(BriefError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            WindowOffsetTable::generate_with_seed(100, -15, 16, 1),
            Err(BriefError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            WindowOffsetTable::generate_with_seed(32, 5, 5, 1),
            Err(BriefError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_from_offsets() {
        let mut raw = vec![0; 128];
        raw[0] = -1;
        raw[1] = 2;
        raw[2] = 3;
        raw[3] = -4;
        let table = WindowOffsetTable::from_offsets(raw).unwrap();
        assert_eq!(table.bits(), 32);
        assert_eq!(table.seed(), None);
        assert_eq!(table.get(0), Some(WindowOffset { dx1: -1, dy1: 2, dx2: 3, dy2: -4 }));
        assert_eq!(table.get(32), None);
        assert_eq!(table.radius(), 4);
    }

    #[test]
    fn test_from_offsets_rejects_bad_lengths() {
        assert!(matches!(
            WindowOffsetTable::from_offsets(vec![]),
            Err(BriefError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            WindowOffsetTable::from_offsets(vec![0; 6]),
            Err(BriefError::SizeMismatch { .. })
        ));
        // 16 tests is not a whole word
        assert!(matches!(
            WindowOffsetTable::from_offsets(vec![0; 64]),
            Err(BriefError::InvalidConfiguration { .. })
        ));
    }
}
