use super::cache::Cache;
use super::node;
use super::node::GuideNode;
use crate::docking::Docker;
use crate::docking::Duplex;
use crate::edit;
use crate::fold::Folder;
use crate::sequence::Pool;
use crate::sequence::Sequence;
use crate::settings::Settings;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// All guide applications descending from one initial duplex on the
/// unedited transcript.
///
/// The tree owns its node arena, the duplex memo, and the transcript
/// index used for child sharing. Nodes reference each other by dense
/// id; sharing adds parent links, never copies, and the reuse lookup
/// always happens before creation so the arena stays acyclic.
pub struct GuideTree {
    id: String,
    pool: Pool,
    edited: Option<Sequence>,
    folder: Folder,
    settings: Arc<Settings>,
    nodes: Vec<GuideNode>,
    by_sequence: BTreeMap<Sequence, Vec<usize>>,
    cache: Cache,
    reused: usize,
    frontier: Vec<usize>,
    levels: usize,
    complete: bool,
}

impl GuideTree {
    pub fn new(
        initial: Duplex,
        pool: Pool,
        edited: Option<Sequence>,
        folder: Folder,
        settings: Arc<Settings>,
    ) -> Self {
        let id = format!(
            "{}_{}_mD{}_gI{}",
            initial.messenger.name(),
            initial.guide,
            initial.dock,
            initial.g_index,
        );
        log::info!("new guide tree: {}", id);
        let mut tree = Self {
            id,
            pool,
            edited,
            folder,
            settings,
            nodes: vec![],
            by_sequence: BTreeMap::new(),
            cache: Cache::default(),
            reused: 0,
            frontier: vec![],
            levels: 1,
            complete: false,
        };
        let root = tree.build_node(initial, None);
        tree.frontier = vec![root];
        tree
    }

    /// Grow level by level until no non-terminal node remains or the
    /// level cap cuts the run off.
    pub fn grow(&mut self) {
        while !self.complete && self.levels < crate::MAX_GUIDE_LEVELS {
            let start = std::time::Instant::now();
            let current = std::mem::take(&mut self.frontier);
            let processed = current.len();
            let mut next = vec![];
            for id in current {
                if !self.nodes[id].terminal && !self.nodes[id].expanded {
                    next.extend(self.expand(id));
                }
            }
            self.levels += 1;
            log::info!(
                "{}: level {} processed {} nodes, spawned {}, in {:.2?}",
                self.id,
                self.levels - 1,
                processed,
                next.len(),
                start.elapsed(),
            );
            self.frontier = next;
            if self.frontier.is_empty() {
                self.complete = true;
            }
        }
        log::info!(
            "{}: finished with {} nodes, {} cache hits, {} shared children",
            self.id,
            self.nodes.len(),
            self.cache.hits(),
            self.reused,
        );
    }

    /// Spawn children for every progressed transcript of one node:
    /// attach the existing node when the transcript is already known,
    /// otherwise re-dock and build guide nodes until one makes
    /// progress or the budget runs out.
    fn expand(&mut self, id: usize) -> Vec<usize> {
        let progressed = self.nodes[id].progressed.clone();
        let mut frontier = vec![];
        for (sequence, m_index) in progressed {
            // sharing an existing node would close a cycle if it sat on
            // this node's own ancestry, so those stay out of reach
            let above = self.ancestry(id);
            let known = self
                .by_sequence
                .get(&sequence)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|&held| held != id && !above.contains(&held))
                .collect::<Vec<usize>>();
            if !known.is_empty() {
                for child in known {
                    if !self.nodes[id].children.contains(&child) {
                        self.nodes[id].children.push(child);
                        self.nodes[child].parents.push(id);
                        frontier.push(child);
                    }
                }
                self.reused += 1;
                continue;
            }
            let mut previous = self.nodes[id].prev_guides.clone();
            previous.push(self.nodes[id].guide_name.clone());
            let duplexes = {
                let docker = Docker::new(&self.pool, &self.folder, &self.settings);
                docker.select(
                    &sequence,
                    &previous,
                    m_index.saturating_sub(crate::REDOCK_OFFSET),
                    false,
                )
            };
            for (nth, duplex) in duplexes.into_iter().enumerate() {
                let advanced = self.nodes[id]
                    .children
                    .iter()
                    .filter(|&&child| !self.nodes[child].progressed.is_empty())
                    .count();
                let wanted = nth < self.settings.min_no_grnas_subsequent
                    || (nth < self.settings.max_no_grnas_subsequent && advanced == 0);
                if wanted {
                    let child = self.build_node(duplex, Some(id));
                    self.nodes[id].children.push(child);
                    frontier.push(child);
                }
            }
        }
        self.nodes[id].expanded = true;
        frontier
    }

    /// Assemble one guide node: trim the working transcript, reuse the
    /// memoized outputs when this duplex has been edited before, build
    /// and select from the edit tree when it hasn't, then splice the
    /// progressed transcripts back to full length.
    fn build_node(&mut self, duplex: Duplex, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        let guide = self
            .pool
            .get(&duplex.guide)
            .expect("docked guide in pool")
            .clone();
        let (guide_level, prev_guides) = match parent {
            None => (1, vec![]),
            Some(p) => {
                let mut path = self.nodes[p].prev_guides.clone();
                path.push(self.nodes[p].guide_name.clone());
                (self.nodes[p].guide_level + 1, path)
            }
        };
        let init_m_index = duplex.m_index();
        let (working, dock, m_index, leader, trailer) = if self.settings.short_sequence_editing {
            node::trim(&duplex, guide.len(), &self.settings)
        } else {
            (
                duplex.messenger.clone(),
                duplex.dock,
                init_m_index,
                vec![],
                vec![],
            )
        };
        let key = (
            duplex.guide.clone(),
            duplex.dock,
            duplex.messenger.clone(),
            duplex.g_index,
        );
        let (mut progressed, tree, cached) = match self.cache.get(&key) {
            Some(prior) => (prior, None, true),
            None => {
                let mut tree = edit::Tree::unfold(
                    guide,
                    working,
                    dock,
                    duplex.g_index,
                    m_index,
                    &self.folder,
                    &self.settings,
                );
                let progressed = tree.progressed(&self.settings);
                self.cache.put(key, progressed.clone());
                (progressed, Some(tree), false)
            }
        };
        if self.settings.short_sequence_editing {
            progressed = progressed
                .into_iter()
                .map(|(sequence, m)| (sequence.spliced(&leader, &trailer), m + leader.len()))
                .collect();
        }
        let qc_errors = match &self.edited {
            Some(reference) => progressed
                .iter()
                .map(|(sequence, m)| node::errors(reference, sequence, *m))
                .collect(),
            None => vec![],
        };
        let built = GuideNode {
            id,
            guide_name: duplex.guide.clone(),
            dock: duplex.dock,
            g_index: duplex.g_index,
            init_sequence: duplex.messenger.clone(),
            init_m_index,
            guide_level,
            prev_guides,
            parents: parent.into_iter().collect(),
            children: vec![],
            expanded: false,
            cached,
            terminal: progressed.is_empty(),
            progressed,
            qc_errors,
            tree,
        };
        self.by_sequence.entry(duplex.messenger).or_default().push(id);
        self.nodes.push(built);
        id
    }

    /// every node reachable upward through parent links
    fn ancestry(&self, id: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            for &p in &self.nodes[n].parents {
                if seen.insert(p) {
                    stack.push(p);
                }
            }
        }
        seen
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn nodes(&self) -> &[GuideNode] {
        &self.nodes
    }
    pub fn root(&self) -> &GuideNode {
        &self.nodes[0]
    }
    pub fn levels(&self) -> usize {
        self.levels
    }
    pub fn is_complete(&self) -> bool {
        self.complete
    }
    pub fn cache_hits(&self) -> usize {
        self.cache.hits()
    }
    pub fn shared_children(&self) -> usize {
        self.reused
    }
}
