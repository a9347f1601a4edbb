//! The pattern catalog: an open-addressed hash table of 4-star pattern
//! tuples, resolved by quadratic probing

use crate::Error;

/// Multiplier used to scramble a summed bin-index key across the table;
/// chosen empirically by the system this design is modeled on, not for
/// any cryptographic property
const MAGIC_RAND: u64 = 2654435761;

//tp PatternCatalog
/// Open-addressed table mapping a quantized edge-ratio key to the 4-tuples
/// of star indices that hash there
///
/// Built at twice the pattern count (load factor 0.5) so quadratic probing
/// terminates quickly in practice; slot `[0,0,0,0]` is the empty sentinel,
/// which can never collide with a real pattern since a pattern's four
/// star indices are always distinct
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    slots: Vec<[u32; 4]>,
}

//ip PatternCatalog
impl PatternCatalog {
    //cp with_capacity
    /// Create an empty table sized for `pattern_count` patterns
    pub fn with_capacity(pattern_count: usize) -> Self {
        let table_size = (2 * pattern_count).max(1);
        Self {
            slots: vec![[0; 4]; table_size],
        }
    }

    //cp from_slots
    /// Wrap an already-populated slot table, e.g. loaded from an archive
    pub fn from_slots(slots: Vec<[u32; 4]>) -> Self {
        Self { slots }
    }

    //ap slots
    pub fn slots(&self) -> &[[u32; 4]] {
        &self.slots
    }

    //ap len
    /// Number of slots in the table (not the number of occupied slots)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    //ap is_empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    //fp key_to_index
    /// Hash a quantized 5-tuple key to a starting slot index
    pub fn key_to_index(key: &[usize; 5], pattern_bins: usize, table_size: usize) -> usize {
        let mut index: u64 = 0;
        let bin_factor = pattern_bins as u64;
        for (i, &k) in key.iter().enumerate() {
            index += (k as u64) * bin_factor.pow(i as u32);
        }
        ((index.wrapping_mul(MAGIC_RAND)) % (table_size as u64)) as usize
    }

    //mp insert
    /// Insert a pattern at the first empty slot found by quadratic probing
    /// from `hash_index`
    ///
    /// Bounded to `table_size/2` probes; at the load factor this table is
    /// always built at, an empty slot is found in a handful of probes, so
    /// hitting the bound indicates the table was built with too many
    /// patterns for its size
    pub fn insert(&mut self, pattern: [u32; 4], hash_index: usize) -> Result<(), Error> {
        let table_size = self.slots.len();
        let max_probes = (table_size / 2).max(1);
        for c in 0..max_probes {
            let i = (hash_index + c * c) % table_size;
            if self.slots[i] == [0; 4] {
                self.slots[i] = pattern;
                return Ok(());
            }
        }
        Err(Error::ProbeOverflow(max_probes))
    }

    //mp probe
    /// Collect every non-empty slot reached by quadratic probing from
    /// `hash_index`, stopping at the first empty slot
    pub fn probe(&self, hash_index: usize) -> Vec<[u32; 4]> {
        let table_size = self.slots.len();
        let mut found = vec![];
        for c in 0.. {
            let i = (hash_index + c * c) % table_size;
            let slot = self.slots[i];
            if slot == [0; 4] {
                break;
            }
            found.push(slot);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reaches_every_inserted_pattern() {
        let mut table = PatternCatalog::with_capacity(50);
        let table_size = table.len();
        let pattern_bins = 7usize;

        let mut inserted = vec![];
        for i in 0u32..40 {
            let pattern = [i * 4 + 1, i * 4 + 2, i * 4 + 3, i * 4 + 4];
            let key = [
                (i as usize) % pattern_bins,
                (i as usize + 1) % pattern_bins,
                (i as usize + 2) % pattern_bins,
                (i as usize + 3) % pattern_bins,
                (i as usize + 4) % pattern_bins,
            ];
            let hash_index = PatternCatalog::key_to_index(&key, pattern_bins, table_size);
            table.insert(pattern, hash_index).unwrap();
            inserted.push((hash_index, pattern));
        }

        for (hash_index, pattern) in inserted {
            let found = table.probe(hash_index);
            assert!(
                found.contains(&pattern),
                "probing from {} never reached {:?}",
                hash_index,
                pattern
            );
        }
    }

    #[test]
    fn empty_slot_is_never_mistaken_for_a_pattern() {
        let table = PatternCatalog::with_capacity(10);
        assert!(table.probe(0).is_empty());
    }

    #[test]
    fn key_to_index_is_in_range() {
        let table_size = 37;
        for a in 0..3usize {
            for b in 0..3usize {
                let key = [a, b, a, b, a];
                let idx = PatternCatalog::key_to_index(&key, 25, table_size);
                assert!(idx < table_size);
            }
        }
    }
}
