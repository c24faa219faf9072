use crate::sequence::Pool;
use crate::sequence::Sequence;
use crate::settings::Settings;
use std::collections::BTreeMap;

/// Feasible anchors of one guide against one transcript.
///
/// Conceptually this is the shifted compatibility matrix: row i holds
/// the complementarity of guide base i against every transcript
/// position, shifted left by i, and a cumulative column sum counts the
/// mismatches of anchoring the first k+1 guide bases at each position.
/// Since that sum only grows down a column, each dock's longest anchor
/// within the mismatch budget falls out of a single scan.
///
/// Returns dock position → longest feasible anchor length.
pub fn align(guide: &Sequence, messenger: &Sequence, settings: &Settings) -> BTreeMap<usize, usize> {
    let depth = settings.max_anchor.min(guide.len());
    let mut anchors = BTreeMap::new();
    for dock in 0..messenger.len() {
        let mut mismatches = 0;
        let mut longest = None;
        for i in 0..depth {
            match messenger.get(dock + i) {
                None => break,
                Some(m) => {
                    mismatches += !guide.at(i).pairs(m) as usize;
                    if mismatches > settings.mismatch_threshold_anchor {
                        break;
                    }
                    longest = Some(i + 1);
                }
            }
        }
        if let Some(length) = longest {
            anchors.insert(dock, length);
        }
    }
    anchors
}

/// Candidate docks per guide, keeping the globally best anchors.
///
/// All feasible anchor lengths across the pool are ranked descending
/// and the length of the `guides_to_cofold`-th best becomes the bar;
/// every (guide, dock) whose anchor meets the bar goes on to folding.
/// Pool order is preserved, which is what breaks ranking ties.
pub fn alignments(
    messenger: &Sequence,
    pool: &Pool,
    excluded: &[String],
    settings: &Settings,
) -> Vec<(String, Vec<usize>)> {
    let aligned = pool
        .iter()
        .filter(|g| !excluded.iter().any(|x| x.as_str() == g.name()))
        .map(|g| (g.name().to_string(), align(g, messenger, settings)))
        .collect::<Vec<(String, BTreeMap<usize, usize>)>>();
    let mut lengths = aligned
        .iter()
        .flat_map(|(_, anchors)| anchors.values().copied())
        .collect::<Vec<usize>>();
    lengths.sort_unstable_by(|a, b| b.cmp(a));
    let bar = match lengths.get(settings.guides_to_cofold.saturating_sub(1)) {
        Some(nth) => *nth,
        None => match lengths.last() {
            Some(shortest) => *shortest,
            None => return vec![],
        },
    };
    aligned
        .into_iter()
        .map(|(name, anchors)| {
            let docks = anchors
                .into_iter()
                .filter(|(_, length)| *length >= bar)
                .map(|(dock, _)| dock)
                .collect::<Vec<usize>>();
            (name, docks)
        })
        .filter(|(_, docks)| !docks.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            max_anchor: 6,
            mismatch_threshold_anchor: 1,
            guides_to_cofold: 2,
            ..Settings::default()
        }
    }

    #[test]
    fn perfect_anchor_runs_to_depth() {
        // messenger canonical 3'→5': ugcaug
        let m = Sequence::messenger("m", "guacgu").unwrap();
        // guide acgu pairs ugca exactly at dock 0
        let g = Sequence::guide("g", "acguac").unwrap();
        let anchors = align(&g, &m, &settings());
        assert!(anchors[&0] == 6);
    }

    #[test]
    fn wobble_counts_as_pairing() {
        let m = Sequence::messenger("m", "gggu").unwrap(); // canonical uggg
        let g = Sequence::guide("g", "gccc").unwrap(); // ug wobble then gc stacks
        let anchors = align(&g, &m, &settings());
        assert!(anchors[&0] == 4);
    }

    #[test]
    fn mismatch_budget_caps_the_anchor() {
        let m = Sequence::messenger("m", "aaaacgu").unwrap(); // canonical ugcaaaa
        let g = Sequence::guide("g", "acguccc").unwrap();
        // acgu pairs ugca, then ca mismatches: one allowed, then the scan stops
        let anchors = align(&g, &m, &settings());
        assert!(anchors[&0] == 5);
    }

    #[test]
    fn global_bar_keeps_the_best_anchors() {
        let m = Sequence::messenger("m", "aaaguacgu").unwrap(); // canonical ugcaugaaa
        let strong = Sequence::guide("strong", "acguac").unwrap();
        let weak = Sequence::guide("weak", "ccaugg").unwrap();
        let pool = Pool::from(vec![strong, weak]);
        let ranked = alignments(&m, &pool, &[], &settings());
        assert!(ranked.iter().any(|(name, _)| name == "strong"));
    }

    #[test]
    fn exclusion_removes_a_guide() {
        let m = Sequence::messenger("m", "guacgu").unwrap();
        let g = Sequence::guide("used", "acguac").unwrap();
        let pool = Pool::from(vec![g]);
        let ranked = alignments(&m, &pool, &["used".to_string()], &settings());
        assert!(ranked.is_empty());
    }
}
