pub mod oracle;
pub mod window;

pub use oracle::Cofold;
pub use oracle::Folder;
pub use oracle::Stacked;
