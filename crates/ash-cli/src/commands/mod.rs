//! CLI command implementations.

pub mod friends;
pub mod sessions;
pub mod split;
