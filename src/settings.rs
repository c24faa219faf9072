use crate::Mfe;
use crate::Probability;
use serde::Deserialize;
use serde::Serialize;

/// How much of a guide to hybridize when scoring a duplex. The
/// transcript fragment always matches the guide fragment in length,
/// except in window mode where both are windows around the edit site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CofoldMode {
    WholeGuide,
    ToIndex,
    ToIndexPlus,
    EditingWindow,
}

/// Which docking rounds bias candidate ranking toward a reference site:
/// the 3' initiation region on the first round, the previous edit site
/// on later rounds, both, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DockingMode {
    Initiation,
    CurrentSite,
    InitiationAndCurrent,
    NoWeighting,
}

/// Whether guides that already edited the transcript may dock again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exclusion {
    All,
    One,
    None,
}

/// Runtime knobs for a single run. Immutable once constructed; engines
/// receive a shared reference rather than reading global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// how many guides to investigate against the unedited sequence
    pub no_of_grnas_first: usize,
    /// how many guides to investigate per partially edited sequence
    pub min_no_grnas_subsequent: usize,
    pub max_no_grnas_subsequent: usize,
    /// number of anchors retained for cofolding during guide selection
    pub guides_to_cofold: usize,
    pub cofold_mode: CofoldMode,
    /// guide tail bases disregarded when judging mismatch overruns
    pub guide_end_allowance: usize,
    /// how many edited sequences to take forward to the next guide
    pub sequences_to_progress: usize,
    /// mismatches allowed when identifying anchors
    pub mismatch_threshold_anchor: usize,
    /// mismatches allowed during editing before a node becomes a leaf
    pub mismatch_threshold_editing: usize,
    /// transcript bases beyond the current pair to include in cofolding
    pub editing_window: usize,
    /// permissible anchor length bounds when docking
    pub max_anchor: usize,
    pub min_anchor: usize,
    /// single-step leaf cutoff on the running probability product
    pub probability_threshold: Probability,
    pub docking_mode: DockingMode,
    pub previous_grna_exclusion: Exclusion,
    /// score the whole tree at the end rather than cohort by cohort
    pub bulk_cofold: bool,
    /// trim each working transcript to the region a guide can reach
    pub short_sequence_editing: bool,
    /// guide prefix fraction hybridized when no editing context exists yet
    pub proportion_to_dock: f64,
    /// docking candidates must fold below this
    pub minimum_mfe: Mfe,
    /// progressed edit nodes must fold below this
    pub min_mfe_to_progress: Mfe,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            no_of_grnas_first: 1,
            min_no_grnas_subsequent: 2,
            max_no_grnas_subsequent: 5,
            guides_to_cofold: 50,
            cofold_mode: CofoldMode::ToIndexPlus,
            guide_end_allowance: 3,
            sequences_to_progress: 1,
            mismatch_threshold_anchor: 2,
            mismatch_threshold_editing: 2,
            editing_window: 7,
            max_anchor: 15,
            min_anchor: 8,
            probability_threshold: 0.01,
            docking_mode: DockingMode::CurrentSite,
            previous_grna_exclusion: Exclusion::All,
            bulk_cofold: true,
            short_sequence_editing: true,
            proportion_to_dock: 0.5,
            minimum_mfe: -7.0,
            min_mfe_to_progress: -30.0,
        }
    }
}

impl Settings {
    /// load overrides from a json file; absent keys keep their defaults
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
