use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use brief_core::{BriefError, BriefResult};
use log::{debug, trace};

use crate::offsets::WindowOffsetTable;

/// Window offsets flattened into row-major pixel-index deltas for one image width.
///
/// Entry `2j` and `2j + 1` are the two sample deltas of test `j`, each computed
/// as `dx * width + dy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOffsetTable {
    width: usize,
    deltas: Vec<isize>,
}

impl ImageOffsetTable {
    pub fn compute(table: &WindowOffsetTable, width: usize) -> BriefResult<Self> {
        if width == 0 {
            return Err(BriefError::invalid_configuration("image width must be > 0"));
        }
        let w = isize::try_from(width)
            .map_err(|_| BriefError::invalid_configuration(format!("image width {} too large", width)))?;
        let delta = |dx: i32, dy: i32| {
            (dx as isize)
                .checked_mul(w)
                .and_then(|v| v.checked_add(dy as isize))
                .ok_or_else(|| {
                    BriefError::invalid_configuration(format!(
                        "image width {} too large for offset table",
                        width
                    ))
                })
        };
        let mut deltas = Vec::with_capacity(2 * table.bits());
        for p in table.pairs() {
            deltas.push(delta(p.dx1, p.dy1)?);
            deltas.push(delta(p.dx2, p.dy2)?);
        }
        Ok(Self { width, deltas })
    }

    /// Width these deltas are valid for
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of tests (descriptor bits)
    pub fn bits(&self) -> usize {
        self.deltas.len() / 2
    }

    pub fn pair(&self, j: usize) -> Option<(isize, isize)> {
        let start = j.checked_mul(2)?;
        match self.deltas.get(start..start.checked_add(2)?)? {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn pairs(&self) -> impl ExactSizeIterator<Item = (isize, isize)> + '_ {
        self.deltas.chunks_exact(2).map(|c| (c[0], c[1]))
    }

    pub fn as_slice(&self) -> &[isize] {
        &self.deltas
    }
}

/// Per-width memo of [`ImageOffsetTable`]s bound to a single [`WindowOffsetTable`].
///
/// The cache owns its window table, so entries can never be served for a table
/// they were not computed from. Concurrent first access for the same width
/// computes the entry once.
#[derive(Debug)]
pub struct ImageOffsetCache {
    table: Arc<WindowOffsetTable>,
    entries: RwLock<HashMap<usize, Arc<ImageOffsetTable>>>,
    computations: AtomicUsize,
}

impl ImageOffsetCache {
    pub fn new(table: Arc<WindowOffsetTable>) -> Self {
        Self {
            table,
            entries: RwLock::new(HashMap::new()),
            computations: AtomicUsize::new(0),
        }
    }

    pub fn table(&self) -> &Arc<WindowOffsetTable> {
        &self.table
    }

    /// Return the offsets for `width`, computing and inserting them on first use.
    pub fn resolve(&self, width: usize) -> BriefResult<Arc<ImageOffsetTable>> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = entries.get(&width) {
                trace!("Offset cache hit for width {}", width);
                return Ok(Arc::clone(hit));
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have filled the entry while we waited for the write lock.
        if let Some(hit) = entries.get(&width) {
            return Ok(Arc::clone(hit));
        }
        let computed = Arc::new(ImageOffsetTable::compute(&self.table, width)?);
        self.computations.fetch_add(1, Ordering::Relaxed);
        debug!("Offset cache miss for width {}, computed {} deltas", width, computed.as_slice().len());
        entries.insert(width, Arc::clone(&computed));
        Ok(computed)
    }

    pub fn contains(&self, width: usize) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&width)
    }

    /// Number of cached widths
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times an entry was actually computed
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> WindowOffsetTable {
        let mut raw = vec![0; 128];
        raw[..8].copy_from_slice(&[1, 2, -1, -2, 0, 3, 2, 0]);
        WindowOffsetTable::from_offsets(raw).unwrap()
    }

    #[test]
    fn test_compute_deltas() {
        let offsets = ImageOffsetTable::compute(&small_table(), 10).unwrap();
        assert_eq!(offsets.width(), 10);
        assert_eq!(offsets.bits(), 32);
        assert_eq!(offsets.pair(0), Some((12, -12)));
        assert_eq!(offsets.pair(1), Some((3, 20)));
        assert_eq!(offsets.pair(2), Some((0, 0)));
        assert_eq!(offsets.pair(32), None);
        assert_eq!(offsets.pair(usize::MAX), None);
        assert_eq!(offsets.as_slice().len(), 64);
    }

    #[test]
    fn test_zero_width_rejected() {
        let result = ImageOffsetTable::compute(&small_table(), 0);
        assert!(matches!(result, Err(BriefError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_resolve_is_memoized_per_width() {
        let cache = ImageOffsetCache::new(Arc::new(small_table()));
        assert!(cache.is_empty());

        let a = cache.resolve(10).unwrap();
        let b = cache.resolve(10).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.computations(), 1);

        let c = cache.resolve(20).unwrap();
        assert_eq!(c.pair(0), Some((22, -22)));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(20));
        assert!(!cache.contains(30));
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn test_oversized_width_rejected() {
        let table = WindowOffsetTable::generate_with_seed(32, -15, 16, 1).unwrap();
        let result = ImageOffsetTable::compute(&table, usize::MAX / 2);
        assert!(matches!(result, Err(BriefError::InvalidConfiguration { .. })));

        let cache = ImageOffsetCache::new(Arc::new(table));
        let result = cache.resolve(usize::MAX / 2);
        assert!(matches!(result, Err(BriefError::InvalidConfiguration { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_resolve_is_not_cached() {
        let cache = ImageOffsetCache::new(Arc::new(small_table()));
        assert!(cache.resolve(0).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.computations(), 0);
    }

    #[test]
    fn test_new_table_never_sees_old_entries() {
        let first = ImageOffsetCache::new(Arc::new(
            WindowOffsetTable::generate_with_seed(32, -15, 16, 1).unwrap(),
        ));
        let second = ImageOffsetCache::new(Arc::new(
            WindowOffsetTable::generate_with_seed(32, -15, 16, 2).unwrap(),
        ));
        let a = first.resolve(64).unwrap();
        let b = second.resolve(64).unwrap();
        assert_eq!(*a, ImageOffsetTable::compute(first.table(), 64).unwrap());
        assert_eq!(*b, ImageOffsetTable::compute(second.table(), 64).unwrap());
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_concurrent_first_access_computes_once() {
        let cache = Arc::new(ImageOffsetCache::new(Arc::new(small_table())));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.resolve(640).unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.computations(), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
