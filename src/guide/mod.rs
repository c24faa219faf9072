pub mod cache;
pub mod node;
pub mod tree;

pub use cache::Cache;
pub use node::GuideNode;
pub use tree::GuideTree;
