use super::action::Action;
use super::data::Data;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction::Outgoing;

/// A Node is a thin wrapper around a NodeIndex and a &Graph, cheap to
/// Copy and convenient for navigation.
#[derive(Debug, Clone, Copy)]
pub struct Node<'tree> {
    index: NodeIndex,
    graph: &'tree DiGraph<Data, Action>,
}

impl<'tree> From<(NodeIndex, &'tree DiGraph<Data, Action>)> for Node<'tree> {
    fn from((index, graph): (NodeIndex, &'tree DiGraph<Data, Action>)) -> Self {
        Self { index, graph }
    }
}

impl<'tree> Node<'tree> {
    pub fn index(&self) -> NodeIndex {
        self.index
    }
    pub fn data(&self) -> &'tree Data {
        self.graph
            .node_weight(self.index)
            .expect("valid node index")
    }
    pub fn children(&self) -> Vec<Node<'tree>> {
        self.graph
            .neighbors_directed(self.index, Outgoing)
            .map(|index| Self::from((index, self.graph)))
            .collect()
    }
    /// the node that spawned this one; merging adds edges, not creators
    pub fn parent(&self) -> Option<Node<'tree>> {
        self.data()
            .parent()
            .map(|index| Self::from((index, self.graph)))
    }
    /// the decisions that produced this transcript, root first
    pub fn log(&self) -> String {
        let mut symbols = vec![];
        let mut cursor = Some(*self);
        while let Some(node) = cursor {
            symbols.push(node.data().action().symbol());
            cursor = node.parent();
        }
        symbols.into_iter().rev().collect()
    }
}

impl std::fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "N{}", self.index.index())
    }
}
