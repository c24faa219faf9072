use super::state::State;
use super::tree::Tree;
use crate::fold::window::pairing_input;
use crate::fold::Folder;
use crate::settings::Settings;
use crate::Mfe;
use crate::Probability;
use petgraph::graph::NodeIndex;

/// Boltzmann weight of an energy against the best in its pool.
/// The pool minimum scores 1 and everything else decays from there.
fn weight(mfe: Mfe, floor: Mfe) -> Probability {
    ((floor - mfe) / (crate::BOLTZMANN * crate::BODY_TEMPERATURE)).exp()
}

/// the best finite energy in a scored pool, if any fold succeeded
fn floor(tree: &Tree, nodes: &[NodeIndex]) -> Option<Mfe> {
    nodes
        .iter()
        .filter_map(|&n| tree.data(n).mfe)
        .filter(|mfe| mfe.is_finite())
        .min_by(|a, b| a.total_cmp(b))
}

/// Fold a set of nodes, in order, and record their energies.
/// A duplex too degenerate to assemble, or one the oracle rejects,
/// costs only its own node: infinite energy and a demotion to leaf.
fn fold(tree: &mut Tree, nodes: &[NodeIndex], folder: &Folder, settings: &Settings) {
    let mut jobs = vec![];
    let mut pairs = vec![];
    for &n in nodes {
        let data = tree.data(n);
        let pair = pairing_input(
            data.sequence(),
            tree.guide(),
            tree.dock(),
            Some(data.g_index()),
            settings,
        );
        match pair {
            Ok(pair) => {
                jobs.push(n);
                pairs.push(pair);
            }
            Err(e) => {
                log::warn!("skipping fold: {}", e);
                demote(tree, n);
            }
        }
    }
    for (n, result) in jobs.into_iter().zip(folder.batch(&pairs)) {
        match result {
            Ok((structure, mfe)) => {
                let data = tree.data_mut(n);
                data.mfe = Some(mfe);
                data.structure = Some(structure);
            }
            Err(e) => {
                log::warn!("fold failed: {}", e);
                demote(tree, n);
            }
        }
    }
}

fn demote(tree: &mut Tree, index: NodeIndex) {
    let data = tree.data_mut(index);
    data.mfe = Some(Mfe::INFINITY);
    data.state = State::Leaf;
}

/// Single-step scoring of one cohort, oldest decisions first.
///
/// Each node's probability comes from its energy against the cohort
/// floor, a deletion chain inherits the best probability below it,
/// and products multiply down from the creating parent. Merge sets
/// represent alternative routes to one transcript, so once every
/// sibling is scored their products collapse to the shared sum.
/// Finally the probability threshold prunes what remains active.
pub(crate) fn step(tree: &mut Tree, cohort: &[NodeIndex], folder: &Folder, settings: &Settings) {
    let mut working = cohort.to_vec();
    working.sort_by_key(|&n| tree.data(n).edit_level);
    if working.is_empty() {
        return;
    }
    fold(tree, &working, folder, settings);
    let Some(floor) = floor(tree, &working) else {
        return;
    };
    for &n in &working {
        let mfe = tree.data(n).mfe.unwrap_or(Mfe::INFINITY);
        tree.data_mut(n).probability = weight(mfe, floor);
    }
    for &n in working.iter().rev() {
        let best = tree
            .children_of(n)
            .into_iter()
            .map(|c| tree.data(c).probability)
            .fold(tree.data(n).probability, f64::max);
        tree.data_mut(n).probability = best;
    }
    for &n in &working {
        let inherited = tree
            .data(n)
            .parent()
            .map(|p| tree.data(p).product)
            .unwrap_or(1.0);
        let product = (inherited * tree.data(n).probability).min(1.0);
        let data = tree.data_mut(n);
        data.product = product;
        data.scored = true;
        if tree.data(n).state == State::Merged {
            let siblings = tree.data(n).siblings().to_vec();
            if siblings.iter().all(|&s| tree.data(s).scored) {
                let sum = siblings
                    .iter()
                    .map(|&s| tree.data(s).product)
                    .sum::<Probability>()
                    .min(1.0);
                for &s in &siblings {
                    tree.data_mut(s).product = sum;
                }
            }
        }
    }
    for &n in &working {
        if tree.data(n).state == State::Active
            && tree.data(n).product < settings.probability_threshold
        {
            tree.data_mut(n).state = State::Leaf;
        }
    }
}

/// Bulk scoring of a finished tree: only complete nodes fold, then
/// their probabilities percolate back up the DAG so every node knows
/// the best outcome reachable beneath it.
pub(crate) fn bulk(tree: &mut Tree, folder: &Folder, settings: &Settings) {
    let complete = tree
        .nodes()
        .filter(|&n| tree.data(n).state == State::Complete)
        .collect::<Vec<NodeIndex>>();
    if complete.is_empty() {
        return;
    }
    fold(tree, &complete, folder, settings);
    let Some(floor) = floor(tree, &complete) else {
        return;
    };
    for &n in &complete {
        let mfe = tree.data(n).mfe.unwrap_or(Mfe::INFINITY);
        let data = tree.data_mut(n);
        data.probability = weight(mfe, floor);
        data.scored = true;
    }
    percolate(tree);
    for n in tree.nodes().collect::<Vec<NodeIndex>>() {
        let p = tree.data(n).probability;
        tree.data_mut(n).product = p;
    }
}

/// iterative reverse-topological pass; levels only ever deepen along
/// edges, so descending level order visits children before parents
fn percolate(tree: &mut Tree) {
    let mut order = tree.nodes().collect::<Vec<NodeIndex>>();
    order.sort_by_key(|&n| std::cmp::Reverse(tree.data(n).edit_level));
    for &n in &order {
        let best = tree
            .children_of(n)
            .into_iter()
            .map(|c| tree.data(c).probability)
            .fold(tree.data(n).probability, f64::max);
        tree.data_mut(n).probability = best;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boltzmann_weights() {
        assert!((weight(-10.0, -10.0) - 1.0).abs() < 1e-12);
        let kt = crate::BOLTZMANN * crate::BODY_TEMPERATURE;
        assert!((weight(-8.0, -10.0) - (-2.0 / kt).exp()).abs() < 1e-12);
        assert!(weight(-8.0, -10.0) < 1.0);
        assert!(weight(Mfe::INFINITY, -10.0) == 0.0);
    }

    #[test]
    fn weights_order_by_energy() {
        let deep = weight(-10.0, -12.0);
        let shallow = weight(-6.0, -12.0);
        assert!(deep > shallow);
        assert!((0.0..=1.0).contains(&deep));
        assert!((0.0..=1.0).contains(&shallow));
    }
}
