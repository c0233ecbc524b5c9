//! Document loading.

pub mod loader;
pub mod sources;
