pub mod config;
pub mod error;
pub mod extraction;
pub mod inference;
pub mod model;
pub mod preprocessing;
pub mod server;
pub mod telemetry;

#[cfg(test)]
mod test_support;

// Re-export common types
pub use error::ServiceError;
pub use model::store::ArtifactStore;
