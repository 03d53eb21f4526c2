pub mod encoder;
pub mod loader;
pub mod pipeline;
pub mod store;
