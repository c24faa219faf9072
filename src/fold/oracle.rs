use crate::sequence::Base;
use crate::Mfe;
use std::sync::Arc;

/// The sole seam to the minimum-free-energy folding routine.
///
/// The input is a strand pair `<transcript fragment reversed>&<guide>`,
/// both halves reading 5'→3'. Implementations must be pure: the same
/// pair always folds to the same `(structure, mfe)`. An FFI-bound
/// RNAcofold is wired here at composition time; tests substitute
/// scripted stand-ins.
pub trait Cofold: Send + Sync {
    fn cofold(&self, pair: &str) -> anyhow::Result<(String, Mfe)>;
}

/// Adapter in front of the oracle. Owns the dispatch decision: small
/// batches fold on the calling thread, large ones fan out over a
/// bounded worker pool, results in input order either way.
#[derive(Clone)]
pub struct Folder(Arc<dyn Cofold>);

impl Folder {
    pub fn fold(&self, pair: &str) -> anyhow::Result<(String, Mfe)> {
        self.0.cofold(pair)
    }

    pub fn batch(&self, pairs: &[String]) -> Vec<anyhow::Result<(String, Mfe)>> {
        if pairs.len() > crate::BULK_FOLD_THRESHOLD {
            use rayon::iter::IntoParallelRefIterator;
            use rayon::iter::ParallelIterator;
            let workers = std::cmp::max(1, num_cpus::get() - 1);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .expect("build fold worker pool");
            pool.install(|| pairs.par_iter().map(|p| self.0.cofold(p)).collect())
        } else {
            pairs.iter().map(|p| self.0.cofold(p)).collect()
        }
    }
}

impl From<Arc<dyn Cofold>> for Folder {
    fn from(oracle: Arc<dyn Cofold>) -> Self {
        Self(oracle)
    }
}

/// Deterministic stand-in energy model used when no external folding
/// library is wired in: antiparallel stacking over the hybridized pair
/// with a duplex initiation penalty. Coarse, but monotone in pairing
/// quality, which is all the search needs to rank candidates.
pub struct Stacked;

impl Stacked {
    const INITIATION: Mfe = 4.1;
    const GC: Mfe = -3.4;
    const AU: Mfe = -2.2;
    const GU: Mfe = -1.3;
    const BULGE: Mfe = 0.8;

    fn strand(half: &str) -> anyhow::Result<Vec<Base>> {
        half.chars().map(Base::try_from).collect()
    }
}

impl Cofold for Stacked {
    fn cofold(&self, pair: &str) -> anyhow::Result<(String, Mfe)> {
        let (mrna, guide) = pair
            .split_once('&')
            .ok_or_else(|| anyhow::anyhow!("malformed strand pair: {}", pair))?;
        let mrna = Self::strand(mrna)?;
        let guide = Self::strand(guide)?;
        // re-reverse the transcript half so position i on one strand
        // faces position i on the other
        let mut energy = Self::INITIATION;
        let mut structure = String::with_capacity(pair.len());
        let paired = mrna
            .iter()
            .rev()
            .zip(guide.iter())
            .map(|(m, g)| {
                energy += match (m, g) {
                    (Base::G, Base::C) | (Base::C, Base::G) => Self::GC,
                    (Base::A, Base::U) | (Base::U, Base::A) => Self::AU,
                    (Base::G, Base::U) | (Base::U, Base::G) => Self::GU,
                    _ => Self::BULGE,
                };
                m.pairs(*g)
            })
            .collect::<Vec<bool>>();
        for open in paired.iter() {
            structure.push(if *open { '(' } else { '.' });
        }
        for _ in paired.len()..mrna.len() {
            structure.push('.');
        }
        structure = structure.chars().rev().collect();
        structure.push('&');
        for close in paired.iter() {
            structure.push(if *close { ')' } else { '.' });
        }
        for _ in paired.len()..guide.len() {
            structure.push('.');
        }
        Ok((structure, energy.min(0.0)))
    }
}

/// test oracle with per-pair energies and a fallback
pub struct Scripted {
    pub energies: std::collections::BTreeMap<String, Mfe>,
    pub fallback: Mfe,
}

impl Cofold for Scripted {
    fn cofold(&self, pair: &str) -> anyhow::Result<(String, Mfe)> {
        let mfe = self.energies.get(pair).copied().unwrap_or(self.fallback);
        Ok((pair.replace(['a', 'c', 'g', 'u'], "."), mfe))
    }
}

/// test oracle with a single energy for every pair
pub struct Constant(pub Mfe);

impl Cofold for Constant {
    fn cofold(&self, pair: &str) -> anyhow::Result<(String, Mfe)> {
        Ok((pair.replace(['a', 'c', 'g', 'u'], "."), self.0))
    }
}

/// test oracle that always fails
pub struct Refusing;

impl Cofold for Refusing {
    fn cofold(&self, pair: &str) -> anyhow::Result<(String, Mfe)> {
        Err(anyhow::anyhow!("fold rejected: {}", pair))
    }
}
