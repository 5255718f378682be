//! Settings schema and loader.
//!
//! Defaults, an optional TOML file and `BEATCARD__*` environment variables
//! are layered with the `config` crate.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
