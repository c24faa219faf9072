/// Classification of an edit node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// the first node of a new tree
    Root,
    /// non-terminal, still expanding
    Active,
    /// terminal: mismatches or probability ran out before the guide did
    Leaf,
    /// reached the end of the guide or transcript with editing intact
    Complete,
    /// collapsed into a merge set sharing one set of children
    Merged,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Active => write!(f, "active"),
            Self::Leaf => write!(f, "leaf"),
            Self::Complete => write!(f, "complete"),
            Self::Merged => write!(f, "merged"),
        }
    }
}
