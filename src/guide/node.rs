use crate::docking::Duplex;
use crate::edit;
use crate::sequence::Base;
use crate::sequence::Sequence;
use crate::settings::Settings;

/// One guide application: the duplex it started from, the edit tree it
/// drove (absent on a cache hit), and the transcripts it sent onward.
/// Guide nodes form a DAG; sharing an already-known transcript adds a
/// parent rather than a copy.
pub struct GuideNode {
    pub(crate) id: usize,
    pub(crate) guide_name: String,
    pub(crate) dock: usize,
    pub(crate) g_index: usize,
    pub(crate) init_sequence: Sequence,
    pub(crate) init_m_index: usize,
    pub(crate) guide_level: usize,
    /// the guides applied along the path that reached this node
    pub(crate) prev_guides: Vec<String>,
    pub(crate) parents: Vec<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) expanded: bool,
    pub(crate) cached: bool,
    pub(crate) terminal: bool,
    pub(crate) progressed: Vec<(Sequence, usize)>,
    /// divergences from the reference edited transcript, per progressed
    /// sequence, when a reference was supplied
    pub(crate) qc_errors: Vec<usize>,
    pub(crate) tree: Option<edit::Tree>,
}

impl GuideNode {
    pub fn id(&self) -> usize {
        self.id
    }
    pub fn guide_name(&self) -> &str {
        &self.guide_name
    }
    pub fn dock(&self) -> usize {
        self.dock
    }
    pub fn g_index(&self) -> usize {
        self.g_index
    }
    pub fn init_sequence(&self) -> &Sequence {
        &self.init_sequence
    }
    pub fn init_m_index(&self) -> usize {
        self.init_m_index
    }
    pub fn guide_level(&self) -> usize {
        self.guide_level
    }
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }
    pub fn children(&self) -> &[usize] {
        &self.children
    }
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
    pub fn used_cache(&self) -> bool {
        self.cached
    }
    pub fn progressed(&self) -> &[(Sequence, usize)] {
        &self.progressed
    }
    pub fn qc_errors(&self) -> &[usize] {
        &self.qc_errors
    }
    pub fn tree(&self) -> Option<&edit::Tree> {
        self.tree.as_ref()
    }
}

/// Cut the working transcript down to what this guide can reach: an
/// editing window 3' of the dock, the guide's span, and tail slack for
/// runs of deletions. Smaller transcripts fold faster and, more
/// importantly, collide in the duplex cache far more often.
pub(crate) fn trim(
    duplex: &Duplex,
    guide_len: usize,
    settings: &Settings,
) -> (Sequence, usize, usize, Vec<Base>, Vec<Base>) {
    let window = settings.editing_window;
    let (start, dock, m_index) = if duplex.dock < window {
        (0, duplex.dock, duplex.dock + duplex.g_index)
    } else {
        (duplex.dock - window, window, duplex.g_index + window)
    };
    let end = (start + guide_len + crate::TRIM_TAIL + window).min(duplex.messenger.len());
    let leader = duplex.messenger.bases()[..start].to_vec();
    let trailer = duplex.messenger.bases()[end..].to_vec();
    (
        duplex.messenger.trimmed(start, end),
        dock,
        m_index,
        leader,
        trailer,
    )
}

/// base-by-base divergence from the reference, 3' end up to the index
pub(crate) fn errors(reference: &Sequence, edited: &Sequence, m_index: usize) -> usize {
    reference
        .bases()
        .iter()
        .take(m_index)
        .zip(edited.bases().iter().take(m_index))
        .filter(|(a, b)| a != b)
        .count()
}
