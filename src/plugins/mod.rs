//! Command surfaces built on the mount engine.

pub mod compose;
pub mod mounts;
