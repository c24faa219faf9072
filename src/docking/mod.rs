pub mod anchor;
pub mod docker;
pub mod duplex;

pub use docker::Docker;
pub use duplex::Duplex;
