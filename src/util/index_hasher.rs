use std::{
    collections::HashMap,
    hash::{BuildHasher, Hasher},
};

/// [`HashMap`] keyed by object indices.
pub type IndexMap<V> = HashMap<usize, V, IndexHasher>;

/// Hashes `usize` keys by their value; indices are already well distributed.
#[derive(Copy, Clone, Debug, Default)]
pub struct IndexHasher;

impl BuildHasher for IndexHasher {
    type Hasher = IndexHash;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        IndexHash { idx: 0 }
    }
}

pub struct IndexHash {
    idx: u64,
}

impl Hasher for IndexHash {
    #[inline]
    fn finish(&self) -> u64 {
        self.idx
    }

    #[inline]
    fn write(&mut self, _: &[u8]) {
        unreachable!("only usize keys are hashed")
    }

    #[inline]
    fn write_usize(&mut self, idx: usize) {
        self.idx = idx as u64;
    }
}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasher, Hash};

    use super::{IndexHasher, IndexMap};

    #[test]
    fn hashes_index() {
        let mut state = IndexHasher.build_hasher();
        42_usize.hash(&mut state);
    }

    #[test]
    #[should_panic]
    fn doesnt_hash_str() {
        let mut state = IndexHasher.build_hasher();
        "42".hash(&mut state);
    }

    #[test]
    fn map_lookup() {
        let mut map = IndexMap::default();
        map.insert(3, 0.5);
        map.insert(7, 0.25);

        assert_eq!(map.get(&3), Some(&0.5));
        assert_eq!(map.get(&4), None);
    }
}
