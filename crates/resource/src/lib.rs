//! Asset resolvers for the notepress pipeline.
//!
//! - [`FilesystemAssetResolver`]: loads images from the local filesystem
//!
//! The in-memory resolver from notepress-traits is re-exported for convenience.

mod filesystem;

pub use filesystem::FilesystemAssetResolver;

pub use notepress_traits::InMemoryAssetResolver;
