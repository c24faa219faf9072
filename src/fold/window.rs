use crate::sequence::Sequence;
use crate::settings::CofoldMode;
use crate::settings::Settings;

/// Assemble the strand pair sent to the oracle for one duplex.
///
/// The guide fragment depends on the cofold mode and on whether an
/// editing position is known yet; without one, only the anchoring
/// prefix of the guide is hybridized. The transcript fragment starts
/// at the dock and matches the guide fragment in length, except in
/// window mode where both strands take a window around the edit site.
/// The transcript half is reversed so both halves read 5'→3'.
///
/// A dock at the transcript boundary can leave nothing to hybridize;
/// that is rejected here rather than handed to the oracle.
pub fn pairing_input(
    messenger: &Sequence,
    guide: &Sequence,
    dock: usize,
    g_index: Option<usize>,
    settings: &Settings,
) -> anyhow::Result<String> {
    let half = settings.editing_window / 2;
    let (guide_range, window) = match g_index {
        None => {
            let cut = (guide.len() as f64 * settings.proportion_to_dock) as usize;
            (0..cut, None)
        }
        Some(g) => {
            let g = g.min(guide.len() - 1);
            match settings.cofold_mode {
                CofoldMode::WholeGuide => (0..guide.len(), None),
                CofoldMode::ToIndex => (0..g + 1, None),
                CofoldMode::ToIndexPlus => {
                    (0..(g + 1 + settings.editing_window).min(guide.len()), None)
                }
                CofoldMode::EditingWindow => {
                    let lo = (g + 1).saturating_sub(half);
                    let hi = std::cmp::max(lo, (g + half).min(guide.len()));
                    let mlo = (dock + g + 1).saturating_sub(half).min(messenger.len());
                    let mhi = std::cmp::max(mlo, (dock + g + half).min(messenger.len()));
                    (lo..hi, Some(mlo..mhi))
                }
            }
        }
    };
    let mrna_range = window.unwrap_or_else(|| {
        let hi = std::cmp::max(dock, (dock + guide_range.len()).min(messenger.len()));
        dock..hi
    });
    let mrna = &messenger.bases()[mrna_range];
    let grna = &guide.bases()[guide_range];
    anyhow::ensure!(
        !mrna.is_empty(),
        "no transcript fragment to hybridize at dock {} of {}",
        dock,
        messenger.name(),
    );
    let mut pair = String::with_capacity(mrna.len() + grna.len() + 1);
    pair.extend(mrna.iter().rev().map(|b| char::from(*b)));
    pair.push('&');
    pair.extend(grna.iter().map(|b| char::from(*b)));
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (Sequence, Sequence) {
        let messenger = Sequence::messenger("m", "acggaagccua").unwrap();
        let guide = Sequence::guide("g", "uaggcuacc").unwrap();
        (messenger, guide)
    }

    fn settings(mode: CofoldMode) -> Settings {
        Settings {
            cofold_mode: mode,
            editing_window: 4,
            proportion_to_dock: 0.5,
            ..Settings::default()
        }
    }

    #[test]
    fn whole_guide() {
        let (m, g) = fixtures();
        let s = settings(CofoldMode::WholeGuide);
        let pair = pairing_input(&m, &g, 0, Some(3), &s).unwrap();
        let (left, right) = pair.split_once('&').unwrap();
        assert!(right == g.five_prime());
        assert!(left.len() == g.len().min(m.len()));
    }

    #[test]
    fn to_index_is_inclusive() {
        let (m, g) = fixtures();
        let s = settings(CofoldMode::ToIndex);
        let pair = pairing_input(&m, &g, 1, Some(3), &s).unwrap();
        let (left, right) = pair.split_once('&').unwrap();
        assert!(right.len() == 4);
        assert!(left.len() == 4);
    }

    #[test]
    fn to_index_plus_never_drops_the_last_base() {
        let (m, g) = fixtures();
        let s = settings(CofoldMode::ToIndexPlus);
        // g + 1 + window overruns the guide, so the whole guide folds
        let pair = pairing_input(&m, &g, 0, Some(g.len() - 1), &s).unwrap();
        let (_, right) = pair.split_once('&').unwrap();
        assert!(right == g.five_prime());
    }

    #[test]
    fn without_context_takes_the_anchor_prefix() {
        let (m, g) = fixtures();
        let s = settings(CofoldMode::ToIndexPlus);
        let pair = pairing_input(&m, &g, 2, None, &s).unwrap();
        let (_, right) = pair.split_once('&').unwrap();
        assert!(right.len() == (g.len() as f64 * 0.5) as usize);
    }

    #[test]
    fn transcript_half_is_reversed() {
        let (m, g) = fixtures();
        let s = settings(CofoldMode::ToIndex);
        let pair = pairing_input(&m, &g, 0, Some(2), &s).unwrap();
        let (left, _) = pair.split_once('&').unwrap();
        let forward = m.three_prime().chars().take(3).collect::<String>();
        assert!(left == forward.chars().rev().collect::<String>());
    }

    #[test]
    fn window_mode_straddles_the_edit_site() {
        let (m, g) = fixtures();
        let s = settings(CofoldMode::EditingWindow);
        let pair = pairing_input(&m, &g, 1, Some(4), &s).unwrap();
        let (left, right) = pair.split_once('&').unwrap();
        // guide window is 3..6, transcript window is 4..7
        assert!(right == &g.five_prime()[3..6]);
        assert!(left.len() == 3);
    }

    #[test]
    fn boundary_dock_is_rejected() {
        let (m, g) = fixtures();
        let s = settings(CofoldMode::ToIndex);
        assert!(pairing_input(&m, &g, m.len(), Some(2), &s).is_err());
    }
}
