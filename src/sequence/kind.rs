/// Whether a sequence is a messenger or a guide RNA.
///
/// The distinction fixes the canonical reading orientation: the editing
/// machinery walks a messenger 3' to 5' while it reads a guide 5' to 3',
/// so each kind stores its bases in the direction it is consumed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    Messenger,
    Guide,
}
