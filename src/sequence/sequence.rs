use super::base::Base;
use super::kind::Kind;
use std::sync::Arc;

/// An immutable oriented RNA sequence.
///
/// Bases are stored in the canonical reading direction of the kind:
/// 3'→5' for a messenger, 5'→3' for a guide. The opposite view is a
/// reversal, so the two views always share length. Cloning is cheap
/// and edited copies never touch their ancestors.
#[derive(Debug, Clone)]
pub struct Sequence {
    name: Arc<str>,
    bases: Arc<[Base]>,
    kind: Kind,
}

impl Sequence {
    /// import a messenger from its conventional 5'→3' spelling
    pub fn messenger(name: &str, five_to_three: &str) -> anyhow::Result<Self> {
        let mut bases = Self::parse(five_to_three)?;
        bases.reverse();
        Ok(Self::raw(name, bases, Kind::Messenger))
    }
    /// import a guide from its conventional 5'→3' spelling
    pub fn guide(name: &str, five_to_three: &str) -> anyhow::Result<Self> {
        Ok(Self::raw(name, Self::parse(five_to_three)?, Kind::Guide))
    }
    /// build directly from bases already in canonical orientation
    pub fn raw(name: &str, bases: Vec<Base>, kind: Kind) -> Self {
        Self {
            name: Arc::from(name),
            bases: Arc::from(bases),
            kind,
        }
    }

    fn parse(spelling: &str) -> anyhow::Result<Vec<Base>> {
        spelling.trim().chars().map(Base::try_from).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> Kind {
        self.kind
    }
    pub fn len(&self) -> usize {
        self.bases.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
    /// bases in canonical orientation
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }
    pub fn get(&self, index: usize) -> Option<Base> {
        self.bases.get(index).copied()
    }
    pub fn at(&self, index: usize) -> Base {
        self.bases[index]
    }

    /// the 5'→3' spelling, regardless of canonical orientation
    pub fn five_prime(&self) -> String {
        match self.kind {
            Kind::Guide => self.bases.iter().map(|b| char::from(*b)).collect(),
            Kind::Messenger => self.bases.iter().rev().map(|b| char::from(*b)).collect(),
        }
    }
    /// the 3'→5' spelling, regardless of canonical orientation
    pub fn three_prime(&self) -> String {
        match self.kind {
            Kind::Messenger => self.bases.iter().map(|b| char::from(*b)).collect(),
            Kind::Guide => self.bases.iter().rev().map(|b| char::from(*b)).collect(),
        }
    }

    /// copy with a U inserted before canonical position `at`
    pub fn inserted(&self, at: usize) -> Self {
        let mut bases = Vec::with_capacity(self.len() + 1);
        bases.extend_from_slice(&self.bases[..at]);
        bases.push(Base::U);
        bases.extend_from_slice(&self.bases[at..]);
        Self::raw(&self.name, bases, self.kind)
    }
    /// copy with the base at canonical position `at` removed
    pub fn deleted(&self, at: usize) -> Self {
        let mut bases = Vec::with_capacity(self.len() - 1);
        bases.extend_from_slice(&self.bases[..at]);
        bases.extend_from_slice(&self.bases[at + 1..]);
        Self::raw(&self.name, bases, self.kind)
    }
    /// copy restricted to the canonical range `start..end`
    pub fn trimmed(&self, start: usize, end: usize) -> Self {
        Self::raw(&self.name, self.bases[start..end].to_vec(), self.kind)
    }
    /// copy with leading and trailing fragments re-attached
    pub fn spliced(&self, leader: &[Base], trailer: &[Base]) -> Self {
        let mut bases = Vec::with_capacity(leader.len() + self.len() + trailer.len());
        bases.extend_from_slice(leader);
        bases.extend_from_slice(&self.bases);
        bases.extend_from_slice(trailer);
        Self::raw(&self.name, bases, self.kind)
    }
}

// identity is content, not name: two nodes that arrive at the same
// edited transcript must compare equal for merging and memoization
impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.bases == other.bases
    }
}
impl Eq for Sequence {}
impl PartialOrd for Sequence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Sequence {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.bases.cmp(&other.bases))
    }
}
impl std::hash::Hash for Sequence {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.bases.hash(state);
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for b in self.bases.iter() {
            write!(f, "{}", b)?;
        }
        Ok(())
    }
}

impl crate::Arbitrary for Sequence {
    fn random() -> Self {
        const N: usize = 32;
        Self::raw(
            "random",
            (0..N).map(|_| Base::random()).collect(),
            Kind::Messenger,
        )
    }
}

use crate::Arbitrary;
