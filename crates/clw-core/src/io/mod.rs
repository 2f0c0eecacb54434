//! IO modules - side effects (network, filesystem locks)

pub mod download;
pub mod lock;
