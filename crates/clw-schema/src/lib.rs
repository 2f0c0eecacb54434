//! Platform identification, the release asset table and version matching
//! for the clw launcher. Nothing in this crate touches the network or disk.

pub mod platform;
pub mod release;
pub mod version;

// Re-exports
pub use platform::*;
pub use release::*;
pub use version::*;
