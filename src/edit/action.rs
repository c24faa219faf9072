/// A single editing decision at one transcript base: leave it and move
/// on, insert a U before it, or delete it. Root is the decision-free
/// starting point of a tree.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Action {
    Root,
    Pass,
    Insert,
    Delete,
}

impl Action {
    /// whether the machinery moves to the next transcript base after
    /// this decision; deletion re-examines the same position
    pub const fn advances(&self) -> bool {
        matches!(self, Self::Pass | Self::Insert)
    }
    /// Two decisions commute when swapping their order cannot change
    /// the transcript they produce: a pair of deletions, or any pair
    /// drawn from pass/insert. Mixing delete with insert would compose
    /// to the identity and is forbidden outright, and delete against
    /// pass leaves the cursor in different places.
    pub const fn commutes(&self, other: Action) -> bool {
        matches!(
            (self, other),
            (Self::Delete, Self::Delete)
                | (Self::Pass, Self::Pass)
                | (Self::Pass, Self::Insert)
                | (Self::Insert, Self::Pass)
                | (Self::Insert, Self::Insert)
        )
    }
    pub const fn symbol(&self) -> char {
        match self {
            Self::Root => 'r',
            Self::Pass => 'p',
            Self::Insert => 'i',
            Self::Delete => 'd',
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
