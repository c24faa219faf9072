use crate::sequence::Sequence;
use std::collections::BTreeMap;

/// A finished edit computation is fully determined by the initiating
/// duplex: guide, dock, transcript, and editing start.
pub type Key = (String, usize, Sequence, usize);

/// Memo of progressed sequences per initiating duplex. A hit spares
/// the whole edit tree; trimmed working transcripts make hits common.
#[derive(Default)]
pub struct Cache {
    entries: BTreeMap<Key, Vec<(Sequence, usize)>>,
    hits: usize,
}

impl Cache {
    pub fn get(&mut self, key: &Key) -> Option<Vec<(Sequence, usize)>> {
        match self.entries.get(key) {
            Some(prior) => {
                self.hits += 1;
                Some(prior.clone())
            }
            None => None,
        }
    }
    pub fn put(&mut self, key: Key, outputs: Vec<(Sequence, usize)>) {
        self.entries.insert(key, outputs);
    }
    pub fn hits(&self) -> usize {
        self.hits
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_are_counted() {
        let mut cache = Cache::default();
        let m = Sequence::messenger("m", "acgu").unwrap();
        let key = ("g1".to_string(), 2, m.clone(), 8);
        assert!(cache.get(&key).is_none());
        assert!(cache.hits() == 0);
        cache.put(key.clone(), vec![(m.clone(), 9)]);
        let hit = cache.get(&key).unwrap();
        assert!(hit.len() == 1);
        assert!(cache.hits() == 1);
        // a different dock is a different computation
        let other = ("g1".to_string(), 3, m, 8);
        assert!(cache.get(&other).is_none());
        assert!(cache.hits() == 1);
    }
}
