pub mod encoding;
pub mod schema;
