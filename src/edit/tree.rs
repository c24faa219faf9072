use super::action::Action;
use super::data::Data;
use super::node::Node;
use super::scoring;
use super::state::State;
use crate::fold::Folder;
use crate::sequence::Sequence;
use crate::settings::Settings;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction::Outgoing;

/// The decision DAG for one guide's pass over a transcript.
///
/// Vertices are editing decisions, edges lead from a decision to its
/// continuations. Growth walks the transcript one base per step,
/// except that deletions re-examine their position and are expanded
/// to exhaustion within the step. Decision orders that provably reach
/// the same transcript collapse into merge sets sharing one set of
/// children, which keeps the arena a DAG rather than a tree.
pub struct Tree {
    pub(crate) graph: DiGraph<Data, Action>,
    pub(crate) guide: Sequence,
    pub(crate) dock: usize,
    pub(crate) frontier: Vec<NodeIndex>,
    pub(crate) complete: bool,
}

impl Tree {
    /// Grow a tree to completion and, in bulk mode, score it.
    pub fn unfold(
        guide: Sequence,
        sequence: Sequence,
        dock: usize,
        g_index: usize,
        m_index: usize,
        folder: &Folder,
        settings: &Settings,
    ) -> Self {
        let mut graph = DiGraph::new();
        graph.add_node(Data::root(sequence, m_index, g_index));
        let mut tree = Self {
            graph,
            guide,
            dock,
            frontier: vec![],
            complete: false,
        };
        while !tree.complete {
            tree.sweep(folder, settings);
        }
        if settings.bulk_cofold {
            scoring::bulk(&mut tree, folder, settings);
        }
        tree
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }
    pub fn at(&self, index: NodeIndex) -> Node<'_> {
        Node::from((index, &self.graph))
    }
    pub fn data(&self, index: NodeIndex) -> &Data {
        self.graph.node_weight(index).expect("valid node index")
    }
    pub fn data_mut(&mut self, index: NodeIndex) -> &mut Data {
        self.graph.node_weight_mut(index).expect("valid node index")
    }
    pub fn guide(&self) -> &Sequence {
        &self.guide
    }
    pub fn dock(&self) -> usize {
        self.dock
    }
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
    pub fn is_complete(&self) -> bool {
        self.complete
    }
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }
    pub fn graph(&self) -> &DiGraph<Data, Action> {
        &self.graph
    }

    pub(crate) fn children_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.graph.neighbors_directed(index, Outgoing).collect()
    }
    fn child_edges(&self, index: NodeIndex) -> Vec<(NodeIndex, Action)> {
        self.children_of(index)
            .into_iter()
            .map(|child| (child, self.data(child).action))
            .collect()
    }

    /// One growth step: process every node at the current transcript
    /// position, exhaust and merge deletion chains, merge the new
    /// same-position children, score the cohort in single-step mode,
    /// then expand the survivors into the next frontier.
    fn sweep(&mut self, folder: &Folder, settings: &Settings) {
        let mut cohort = if self.graph.node_count() == 1 {
            self.expand(self.root(), settings)
        } else {
            std::mem::take(&mut self.frontier)
        };
        let mut dels = cohort
            .iter()
            .copied()
            .filter(|&n| self.data(n).action == Action::Delete)
            .collect::<Vec<NodeIndex>>();
        let mut born = vec![];
        while !dels.is_empty() {
            let checked = self.coalesce(&dels);
            let mut deeper = vec![];
            for n in checked {
                if self.data(n).state == State::Active {
                    let kids = self.expand(n, settings);
                    deeper.extend(
                        kids.iter()
                            .copied()
                            .filter(|&k| self.data(k).action == Action::Delete),
                    );
                    born.extend(kids);
                    if self.data(n).pending_merge {
                        self.seal(n);
                    }
                }
            }
            dels = deeper;
        }
        let fresh = born
            .iter()
            .copied()
            .filter(|&n| self.data(n).state != State::Merged)
            .collect::<Vec<NodeIndex>>();
        cohort.extend(born);
        self.absorb(&fresh, &cohort);
        if !settings.bulk_cofold {
            scoring::step(self, &cohort, folder, settings);
        }
        let mut next = vec![];
        for &n in &cohort {
            match self.data(n).state {
                State::Merged => {
                    if self.data(n).g_index + 1 >= self.guide.len() {
                        self.data_mut(n).state = State::Complete;
                    } else {
                        if self.children_of(n).is_empty() {
                            let donor = self
                                .data(n)
                                .siblings
                                .clone()
                                .into_iter()
                                .find(|&s| s != n && !self.children_of(s).is_empty());
                            match donor {
                                Some(d) => self.adopt(n, d),
                                None => next.extend(self.expand(n, settings)),
                            }
                        }
                        self.share(n);
                    }
                }
                State::Active => {
                    if self.children_of(n).is_empty() {
                        next.extend(self.expand(n, settings));
                    }
                }
                _ => {}
            }
        }
        self.frontier = next;
        if self.frontier.is_empty() {
            self.complete = true;
        }
    }

    /// Generate the children one decision allows: a pass always, an
    /// insert unless the parent deleted or the next base is a U, a
    /// delete unless the parent inserted or the next base is not a U.
    fn expand(&mut self, parent: NodeIndex, settings: &Settings) -> Vec<NodeIndex> {
        let action = self.data(parent).action;
        let cursor = self.data(parent).m_index + action.advances() as usize;
        let next = self.data(parent).sequence.get(cursor);
        let mut kids = vec![self.spawn(parent, Action::Pass, settings)];
        if action != Action::Delete && next.is_some_and(|b| !b.is_u()) {
            kids.push(self.spawn(parent, Action::Insert, settings));
        }
        if action != Action::Insert && next.is_some_and(|b| b.is_u()) {
            kids.push(self.spawn(parent, Action::Delete, settings));
        }
        kids
    }

    fn spawn(&mut self, parent: NodeIndex, action: Action, settings: &Settings) -> NodeIndex {
        let data = Data::child(parent, self.data(parent), action, &self.guide, settings);
        let child = self.graph.add_node(data);
        self.graph.add_edge(parent, child, action);
        child
    }

    /// Group deletion nodes of one round that already hold identical
    /// transcripts at the same depth. Groups are only marked here; the
    /// first member to expand seals the whole set.
    fn coalesce(&mut self, dels: &[NodeIndex]) -> Vec<NodeIndex> {
        let mut unchecked = dels.to_vec();
        let mut checked = vec![];
        while let Some(test) = unchecked.pop() {
            let mut group = vec![];
            let mut rest = vec![];
            for other in unchecked.drain(..) {
                if self.mergeable(test, other) {
                    group.push(other);
                } else {
                    rest.push(other);
                }
            }
            unchecked = rest;
            if group.is_empty() {
                checked.push(test);
            } else {
                group.push(test);
                for &member in &group {
                    self.data_mut(member).pending_merge = true;
                    self.data_mut(member).siblings = group.clone();
                }
                checked.extend(group);
            }
        }
        checked
    }

    /// Merge the freshly born same-position children against the whole
    /// cohort. Anything that provably duplicates another transcript at
    /// the same depth through commuting decisions collapses now; the
    /// child-set sharing follows when the cohort is expanded.
    fn absorb(&mut self, fresh: &[NodeIndex], cohort: &[NodeIndex]) {
        for &test in fresh {
            if self.data(test).state == State::Merged {
                continue;
            }
            let group = cohort
                .iter()
                .copied()
                .filter(|&other| other == test || self.mergeable(test, other))
                .collect::<Vec<NodeIndex>>();
            if group.len() > 1 {
                for &member in &group {
                    self.data_mut(member).pending_merge = true;
                    self.data_mut(member).siblings = group.clone();
                    self.data_mut(member).state = State::Merged;
                }
            }
        }
    }

    fn mergeable(&self, a: NodeIndex, b: NodeIndex) -> bool {
        a != b
            && self.data(a).edit_level == self.data(b).edit_level
            && self.data(a).action.commutes(self.data(b).action)
            && self.data(a).sequence == self.data(b).sequence
    }

    /// promote a freshly expanded group: every sibling becomes Merged
    /// and childless siblings point at the representative's children
    fn seal(&mut self, representative: NodeIndex) {
        for &sibling in &self.data(representative).siblings.clone() {
            self.data_mut(sibling).state = State::Merged;
        }
        self.share(representative);
    }

    /// childless merge siblings receive edges to this node's children
    fn share(&mut self, index: NodeIndex) {
        let kids = self.child_edges(index);
        if kids.is_empty() {
            return;
        }
        for sibling in self.data(index).siblings.clone() {
            if sibling != index && self.children_of(sibling).is_empty() {
                for &(child, action) in &kids {
                    self.graph.add_edge(sibling, child, action);
                }
            }
        }
    }

    /// a merged latecomer takes the group's existing children
    fn adopt(&mut self, index: NodeIndex, donor: NodeIndex) {
        for (child, action) in self.child_edges(donor) {
            self.graph.add_edge(index, child, action);
        }
    }

    /// Pick the transcripts that leave this tree: complete nodes that
    /// folded well enough, ranked by probability product, then energy,
    /// mismatches, editing depth reached, and level.
    pub fn progressed(&mut self, settings: &Settings) -> Vec<(Sequence, usize)> {
        let mut complete = self
            .nodes()
            .filter(|&n| self.data(n).state == State::Complete)
            .filter(|&n| self.data(n).mfe.unwrap_or(f64::INFINITY) < settings.min_mfe_to_progress)
            .collect::<Vec<NodeIndex>>();
        complete.sort_by(|&a, &b| {
            let a = self.data(a);
            let b = self.data(b);
            b.product
                .total_cmp(&a.product)
                .then(a.mfe.unwrap().total_cmp(&b.mfe.unwrap()))
                .then(a.mismatches.cmp(&b.mismatches))
                .then(b.g_index.cmp(&a.g_index))
                .then(a.edit_level.cmp(&b.edit_level))
        });
        complete.truncate(settings.sequences_to_progress);
        complete
            .into_iter()
            .map(|n| {
                self.data_mut(n).progressed = true;
                let data = self.data(n);
                (data.sequence.clone(), data.m_index)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::oracle::Cofold;
    use crate::fold::oracle::Constant;
    use crate::fold::oracle::Refusing;
    use crate::sequence::Base;
    use crate::sequence::Kind;
    use std::sync::Arc;

    fn folder(oracle: impl Cofold + 'static) -> Folder {
        Folder::from(Arc::new(oracle) as Arc<dyn Cofold>)
    }

    fn settings(mismatches: usize) -> Settings {
        Settings {
            mismatch_threshold_editing: mismatches,
            guide_end_allowance: 0,
            bulk_cofold: true,
            min_mfe_to_progress: 0.0,
            sequences_to_progress: 8,
            cofold_mode: crate::settings::CofoldMode::ToIndexPlus,
            ..Settings::default()
        }
    }

    /// every structural promise the engine makes, checked wholesale
    fn audit(tree: &Tree) {
        for n in tree.nodes() {
            let data = tree.data(n);
            if let Some(p) = data.parent {
                let parent = tree.data(p);
                let step = parent.action.advances() as usize;
                assert!(data.m_index == parent.m_index + step);
                assert!(data.g_index == parent.g_index + step);
                assert!(data.edit_level == parent.edit_level + 1);
                match data.action {
                    Action::Delete => {
                        assert!(parent.sequence.at(data.m_index) == Base::U);
                        assert!(parent.action != Action::Insert);
                    }
                    Action::Insert => {
                        assert!(parent.sequence.at(data.m_index) != Base::U);
                        assert!(parent.action != Action::Delete);
                    }
                    _ => {}
                }
            }
            if data.state == State::Merged {
                assert!(data.siblings.len() >= 2);
                for &s in &data.siblings {
                    let sibling = tree.data(s);
                    assert!(sibling.sequence == data.sequence);
                    assert!(sibling.edit_level == data.edit_level);
                    if s != n {
                        assert!(sibling.action.commutes(data.action));
                    }
                }
            }
            assert!((0.0..=1.0).contains(&data.probability));
        }
        // edges only ever deepen by one level, so the arena is acyclic
        // and already in topological order by level
        for e in tree.graph.edge_indices() {
            let (from, to) = tree.graph.edge_endpoints(e).expect("endpoints");
            assert!(tree.data(to).edit_level == tree.data(from).edit_level + 1);
        }
        // no two unmerged nodes may hold the same transcript at the
        // same depth through commuting decisions
        let all = tree.nodes().collect::<Vec<NodeIndex>>();
        for &a in &all {
            for &b in &all {
                if a < b && tree.mergeable(a, b) {
                    assert!(tree.data(a).state == State::Merged);
                    assert!(tree.data(b).state == State::Merged);
                }
            }
        }
    }

    fn completes(tree: &Tree) -> Vec<NodeIndex> {
        tree.nodes()
            .filter(|&n| tree.data(n).state == State::Complete)
            .collect()
    }

    #[test]
    fn pure_pass_editing() {
        // canonical transcript agag pairs guide ucucaaaa from (1,1)
        // until the transcript runs out; insertions all mismatch
        let m = Sequence::messenger("m", "gaga").unwrap();
        let g = Sequence::guide("g", "ucucaaaa").unwrap();
        let mut tree = Tree::unfold(g, m, 0, 1, 1, &folder(Constant(-5.0)), &settings(0));
        audit(&tree);
        assert!(tree.is_complete());
        let complete = completes(&tree);
        assert!(complete.len() == 1);
        let only = complete[0];
        assert!(tree.at(only).log() == "rppp");
        assert!(tree.data(only).mismatches == 0);
        assert!((tree.data(only).product - 1.0).abs() < 1e-12);
        let progressed = tree.progressed(&settings(0));
        assert!(progressed.len() == 1);
        assert!(progressed[0].0.three_prime() == "agag");
        assert!(progressed[0].1 == 3);
    }

    #[test]
    fn single_insertion_is_found() {
        // guide acggu needs one U inserted into acgu to pair through
        let m = Sequence::messenger("m", "acgu").unwrap();
        let g = Sequence::guide("g", "acggu").unwrap();
        let mut tree = Tree::unfold(g, m, 0, 1, 1, &folder(Constant(-5.0)), &settings(0));
        audit(&tree);
        let edited = completes(&tree)
            .into_iter()
            .find(|&n| tree.data(n).sequence.five_prime() == "aucgu")
            .expect("the singly inserted transcript completes");
        assert!(tree.data(edited).mismatches == 0);
        assert!(tree.at(edited).log() == "rppip");
        let progressed = tree.progressed(&settings(0));
        assert!(progressed.iter().any(|(s, _)| s.five_prime() == "aucgu"));
    }

    #[test]
    fn double_deletion_merges_and_shares_children() {
        // the transcript carries a uu the guide cannot read through;
        // deleting both is the only pairing continuation
        let m = Sequence::messenger("m", "aguua").unwrap(); // canonical auuga
        let g = Sequence::guide("g", "ucua").unwrap();
        let mut tree = Tree::unfold(g, m, 0, 1, 1, &folder(Constant(-5.0)), &settings(1));
        audit(&tree);
        assert!(tree.is_complete());
        let doubly = completes(&tree)
            .into_iter()
            .find(|&n| tree.data(n).sequence.three_prime() == "aga")
            .expect("the doubly deleted transcript completes");
        assert!(tree.at(doubly).log().contains("dd"));
        let merged = tree
            .nodes()
            .filter(|&n| tree.data(n).state == State::Merged)
            .collect::<Vec<NodeIndex>>();
        assert!(merged.len() >= 2);
        for &n in &merged {
            let mut mine = tree.children_of(n);
            mine.sort();
            for &s in tree.data(n).siblings.clone().iter() {
                let mut theirs = tree.children_of(s);
                theirs.sort();
                assert!(mine == theirs);
            }
        }
        let _ = tree.progressed(&settings(1));
    }

    #[test]
    fn mismatch_overrun_leafs_the_branch() {
        // the guide cannot pair past its anchor whatever is edited
        let m = Sequence::messenger("m", "acga").unwrap(); // canonical agca
        let g = Sequence::guide("g", "ucca").unwrap();
        let mut tree = Tree::unfold(g, m, 0, 1, 1, &folder(Constant(-5.0)), &settings(0));
        audit(&tree);
        assert!(tree.is_complete());
        assert!(completes(&tree).is_empty());
        for n in tree.nodes() {
            if tree.data(n).state == State::Leaf {
                assert!(tree.children_of(n).is_empty());
            }
        }
        assert!(tree.progressed(&settings(0)).is_empty());
    }

    #[test]
    fn progression_caps_and_filters() {
        // three complete transcripts with stubbed energies; the filter
        // drops the weak fold and the cap keeps the two best
        let s = Settings {
            min_mfe_to_progress: -7.0,
            sequences_to_progress: 2,
            ..settings(0)
        };
        let mut graph = DiGraph::new();
        let root = Data::root(Sequence::messenger("m", "acgu").unwrap(), 0, 0);
        let anchor = graph.add_node(root);
        for (spelling, mfe, product) in [
            ("acga", -8.0, 0.04),
            ("acgg", -10.0, 1.0),
            ("acgc", -5.0, 0.0003),
        ] {
            let mut data = Data::root(Sequence::messenger("m", spelling).unwrap(), 3, 3);
            data.action = Action::Pass;
            data.parent = Some(anchor);
            data.edit_level = 1;
            data.state = State::Complete;
            data.mfe = Some(mfe);
            data.product = product;
            data.probability = product;
            let n = graph.add_node(data);
            graph.add_edge(anchor, n, Action::Pass);
        }
        let mut tree = Tree {
            graph,
            guide: Sequence::guide("g", "ucua").unwrap(),
            dock: 0,
            frontier: vec![],
            complete: true,
        };
        let progressed = tree.progressed(&s);
        assert!(progressed.len() == 2);
        assert!(progressed[0].0.three_prime() == "acgg");
        assert!(progressed[1].0.three_prime() == "acga");
    }

    #[test]
    fn fold_failure_degrades_to_leaf() {
        let m = Sequence::messenger("m", "gaga").unwrap();
        let g = Sequence::guide("g", "ucucaaaa").unwrap();
        let mut tree = Tree::unfold(g, m, 0, 1, 1, &folder(Refusing), &settings(0));
        assert!(tree.is_complete());
        // the lone complete node failed to fold: infinite energy,
        // demoted, and never selected
        assert!(completes(&tree).is_empty());
        let demoted = tree
            .nodes()
            .find(|&n| tree.data(n).mfe == Some(f64::INFINITY))
            .expect("failed fold is recorded");
        assert!(tree.data(demoted).state == State::Leaf);
        assert!(tree.progressed(&settings(0)).is_empty());
    }

    #[test]
    fn single_step_scoring_stays_monotone() {
        let s = Settings {
            bulk_cofold: false,
            probability_threshold: 0.0,
            ..settings(1)
        };
        let m = Sequence::messenger("m", "aguua").unwrap();
        let g = Sequence::guide("g", "ucua").unwrap();
        let tree = Tree::unfold(g, m, 0, 1, 1, &folder(Constant(-3.0)), &s);
        audit(&tree);
        for n in tree.nodes() {
            let data = tree.data(n);
            assert!((0.0..=1.0).contains(&data.product));
            if data.state != State::Merged {
                if let Some(p) = data.parent {
                    assert!(data.product <= tree.data(p).product + 1e-9);
                }
            }
            if data.state == State::Merged {
                for &sib in &data.siblings {
                    assert!((tree.data(sib).product - data.product).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn probability_threshold_prunes_in_single_step() {
        // an impossible threshold turns every scored cohort into leaves
        let s = Settings {
            bulk_cofold: false,
            probability_threshold: 2.0,
            ..settings(2)
        };
        let m = Sequence::messenger("m", "acgu").unwrap();
        let g = Sequence::guide("g", "acggu").unwrap();
        let tree = Tree::unfold(g, m, 0, 1, 1, &folder(Constant(-5.0)), &s);
        assert!(tree.is_complete());
        assert!(tree.len() <= 4);
        for n in tree.nodes() {
            assert!(tree.data(n).state != State::Active || !tree.children_of(n).is_empty());
        }
    }

    #[test]
    fn sequences_stay_immutable_across_editing() {
        let m = Sequence::messenger("m", "acgu").unwrap();
        let g = Sequence::guide("g", "acggu").unwrap();
        let tree = Tree::unfold(
            g,
            m.clone(),
            0,
            1,
            1,
            &folder(Constant(-5.0)),
            &settings(0),
        );
        assert!(tree.data(tree.root()).sequence == m);
        assert!(tree.data(tree.root()).sequence.kind() == Kind::Messenger);
    }
}
