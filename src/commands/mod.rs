pub mod config;
pub mod init;
pub mod processing;

pub use config::*;
pub use init::*;
pub use processing::*;
