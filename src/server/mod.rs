pub mod handlers;
pub mod routes;
pub mod types;

#[cfg(test)]
mod tests;
