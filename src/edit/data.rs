use super::action::Action;
use super::state::State;
use crate::sequence::Sequence;
use crate::settings::Settings;
use crate::Mfe;
use crate::Probability;
use petgraph::graph::NodeIndex;

/// Everything the tree stores at one vertex: the decision taken, the
/// transcript it produced, the cursor positions, the running mismatch
/// count, and the scoring results once the node has been folded.
#[derive(Debug, Clone)]
pub struct Data {
    pub(crate) action: Action,
    /// the parent that spawned this node; merging adds further parents
    /// as graph edges without changing who created it
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) sequence: Sequence,
    pub(crate) m_index: usize,
    pub(crate) g_index: usize,
    pub(crate) edit_level: usize,
    /// mismatches accumulated along the guide since the last deletion
    pub(crate) mismatches: usize,
    /// the mismatch total carried over that deletion boundary
    pub(crate) carried: usize,
    pub(crate) state: State,
    /// the merge set this node belongs to, itself included
    pub(crate) siblings: Vec<NodeIndex>,
    pub(crate) pending_merge: bool,
    pub(crate) mfe: Option<Mfe>,
    pub(crate) structure: Option<String>,
    pub(crate) probability: Probability,
    pub(crate) product: Probability,
    pub(crate) scored: bool,
    pub(crate) progressed: bool,
}

impl Data {
    pub fn root(sequence: Sequence, m_index: usize, g_index: usize) -> Self {
        Self {
            action: Action::Root,
            parent: None,
            sequence,
            m_index,
            g_index,
            edit_level: 0,
            mismatches: 0,
            carried: 0,
            state: State::Root,
            siblings: vec![],
            pending_merge: false,
            mfe: None,
            structure: None,
            probability: 1.0,
            product: 1.0,
            scored: false,
            progressed: false,
        }
    }

    /// Spawn the node an action produces. The cursors advance when the
    /// parent's action advanced, the transcript is edited at the new
    /// cursor, and the mismatch count extends the parent's unless the
    /// parent deleted, in which case the pre-deletion total carries.
    pub fn child(
        index: NodeIndex,
        parent: &Data,
        action: Action,
        guide: &Sequence,
        settings: &Settings,
    ) -> Self {
        let step = parent.action.advances() as usize;
        let m_index = parent.m_index + step;
        let g_index = parent.g_index + step;
        let sequence = match action {
            Action::Insert => parent.sequence.inserted(m_index),
            Action::Delete => parent.sequence.deleted(m_index),
            _ => parent.sequence.clone(),
        };
        let carried = match parent.action {
            Action::Delete => parent.carried,
            _ => parent.mismatches,
        };
        let facing = match (sequence.get(m_index), guide.get(g_index)) {
            (Some(m), Some(g)) => !m.pairs(g) as usize,
            _ => 0,
        };
        let mut data = Self {
            action,
            parent: Some(index),
            sequence,
            m_index,
            g_index,
            edit_level: parent.edit_level + 1,
            mismatches: carried + facing,
            carried,
            state: State::Active,
            siblings: vec![],
            pending_merge: false,
            mfe: None,
            structure: None,
            probability: 0.0,
            product: 0.0,
            scored: false,
            progressed: false,
        };
        data.state = data.classify(guide, settings);
        data
    }

    /// where a node stands once its mismatches and cursors are known
    fn classify(&self, guide: &Sequence, settings: &Settings) -> State {
        if self.mismatches > settings.mismatch_threshold_editing {
            if self.g_index + 1 + settings.guide_end_allowance >= guide.len() {
                State::Complete
            } else {
                State::Leaf
            }
        } else if self.g_index + 1 >= guide.len() || self.m_index + 1 >= self.sequence.len() {
            State::Complete
        } else {
            State::Active
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }
    pub fn m_index(&self) -> usize {
        self.m_index
    }
    pub fn g_index(&self) -> usize {
        self.g_index
    }
    pub fn edit_level(&self) -> usize {
        self.edit_level
    }
    pub fn mismatches(&self) -> usize {
        self.mismatches
    }
    pub fn state(&self) -> State {
        self.state
    }
    pub fn siblings(&self) -> &[NodeIndex] {
        &self.siblings
    }
    pub fn mfe(&self) -> Option<Mfe> {
        self.mfe
    }
    pub fn structure(&self) -> Option<&str> {
        self.structure.as_deref()
    }
    pub fn probability(&self) -> Probability {
        self.probability
    }
    pub fn product(&self) -> Probability {
        self.product
    }
    pub fn progressed(&self) -> bool {
        self.progressed
    }
}
