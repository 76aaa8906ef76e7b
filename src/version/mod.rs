//! Version resolution: manifest IO and semantic version bumps

pub mod bump;
pub mod context;
pub mod manifest;

pub use bump::BumpKind;
pub use context::ReleaseContext;
pub use manifest::Manifest;
