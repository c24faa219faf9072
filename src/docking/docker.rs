use super::anchor;
use super::duplex::Duplex;
use crate::fold::window::pairing_input;
use crate::fold::Folder;
use crate::sequence::Pool;
use crate::sequence::Sequence;
use crate::settings::DockingMode;
use crate::settings::Exclusion;
use crate::settings::Settings;
use crate::Mfe;

/// Selection of the best guide candidates for a transcript.
///
/// Anchoring narrows the pool to the strongest alignments, folding
/// ranks them, position bias reweights them where the docking mode
/// asks for it, and gIndex determination decides where editing starts.
pub struct Docker<'a> {
    pool: &'a Pool,
    folder: &'a Folder,
    settings: &'a Settings,
}

struct Candidate {
    guide: String,
    dock: usize,
    mfe: Mfe,
    adjusted: Mfe,
}

impl<'a> Docker<'a> {
    pub fn new(pool: &'a Pool, folder: &'a Folder, settings: &'a Settings) -> Self {
        Self {
            pool,
            folder,
            settings,
        }
    }

    /// Rank candidates and return at most one dock per guide, capped at
    /// the per-round guide budget. An empty result is not an error; the
    /// caller's node simply becomes terminal.
    pub fn select(
        &self,
        messenger: &Sequence,
        previous: &[String],
        current_m_index: usize,
        initial: bool,
    ) -> Vec<Duplex> {
        if !previous.is_empty() && previous.len() >= self.pool.len() {
            return vec![];
        }
        let excluded = self.excluded(previous);
        let aligned = anchor::alignments(messenger, self.pool, &excluded, self.settings);
        let mut candidates = self.scored(messenger, aligned);
        self.weigh(&mut candidates, current_m_index, initial);
        candidates.retain(|c| c.mfe < self.settings.minimum_mfe);
        let budget = if initial {
            self.settings.no_of_grnas_first
        } else {
            self.settings.max_no_grnas_subsequent
        };
        let mut duplexes: Vec<Duplex> = vec![];
        for candidate in candidates {
            if duplexes.len() == budget {
                break;
            }
            if duplexes.iter().any(|d| d.guide == candidate.guide) {
                log::debug!("{} has a preferred alternative site", candidate.guide);
                continue;
            }
            let guide = self.pool.get(&candidate.guide).expect("guide in pool");
            if let Some(g_index) = self.anchor_index(messenger, guide, candidate.dock) {
                if g_index >= self.settings.min_anchor {
                    duplexes.push(Duplex {
                        guide: candidate.guide,
                        dock: candidate.dock,
                        messenger: messenger.clone(),
                        g_index,
                    });
                }
            }
        }
        duplexes
    }

    fn excluded(&self, previous: &[String]) -> Vec<String> {
        match self.settings.previous_grna_exclusion {
            Exclusion::All => previous.to_vec(),
            Exclusion::One => previous.last().cloned().into_iter().collect(),
            Exclusion::None => vec![],
        }
    }

    /// fold each surviving (guide, dock) with the anchoring prefix only
    fn scored(&self, messenger: &Sequence, aligned: Vec<(String, Vec<usize>)>) -> Vec<Candidate> {
        aligned
            .into_iter()
            .flat_map(|(name, docks)| docks.into_iter().map(move |dock| (name.clone(), dock)))
            .filter_map(|(name, dock)| {
                let guide = self.pool.get(&name).expect("guide in pool");
                match pairing_input(messenger, guide, dock, None, self.settings)
                    .and_then(|pair| self.folder.fold(&pair))
                {
                    Ok((_, mfe)) => Some(Candidate {
                        guide: name,
                        dock,
                        mfe,
                        adjusted: mfe,
                    }),
                    Err(e) => {
                        log::warn!("skipping {} at dock {}: {}", name, dock, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// bias candidates toward the reference site where the mode asks
    /// for it, then sort ascending by the effective energy
    fn weigh(&self, candidates: &mut Vec<Candidate>, current_m_index: usize, initial: bool) {
        let weighted = match (initial, self.settings.docking_mode) {
            (true, DockingMode::Initiation) => true,
            (_, DockingMode::InitiationAndCurrent) => true,
            (false, DockingMode::CurrentSite) => true,
            _ => false,
        };
        if weighted {
            for c in candidates.iter_mut() {
                let distance = current_m_index.abs_diff(c.dock) as f64;
                let z = distance / (self.settings.editing_window as f64 * 2.0);
                c.adjusted = c.mfe * 2.0 * (1.0 - phi(z));
            }
        }
        candidates.sort_by(|a, b| a.adjusted.total_cmp(&b.adjusted));
    }

    /// Scan pairs forward from the dock until the anchor mismatch
    /// budget runs out; editing starts after the last pairing base.
    /// Candidates whose start leaves less than the end allowance of
    /// guide, or less than the minimum anchor, are rejected upstream.
    fn anchor_index(&self, messenger: &Sequence, guide: &Sequence, dock: usize) -> Option<usize> {
        let mut anchor_length = 0;
        let mut mismatches = 0;
        let mut trailing = 0;
        for i in 0..guide.len() {
            let m = match messenger.get(dock + i) {
                Some(m) => m,
                None => break,
            };
            if m.pairs(guide.at(i)) {
                trailing = 0;
            } else {
                mismatches += 1;
                trailing += 1;
            }
            anchor_length += 1;
            if mismatches == self.settings.mismatch_threshold_anchor {
                break;
            }
        }
        let g_index = anchor_length - trailing;
        if g_index + self.settings.guide_end_allowance >= guide.len() {
            None
        } else {
            Some(g_index)
        }
    }
}

/// standard normal CDF by the Zelen & Severo polynomial
fn phi(z: f64) -> f64 {
    if z < 0.0 {
        return 1.0 - phi(-z);
    }
    const B: [f64; 5] = [
        0.319381530,
        -0.356563782,
        1.781477937,
        -1.821255978,
        1.330274429,
    ];
    let t = 1.0 / (1.0 + 0.2316419 * z);
    let pdf = (-z * z / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let poly = B
        .iter()
        .enumerate()
        .map(|(i, b)| b * t.powi(i as i32 + 1))
        .sum::<f64>();
    1.0 - pdf * poly
}
