//! Track catalog: the data model shared with the playlist store and the
//! gateway used to fetch tracks and sample metadata.
//!
//! `FileCatalog` is the concrete gateway: a TOML document re-read on every
//! call, so edits to the catalog show up on the next fetch.

mod file;
mod model;

pub use file::FileCatalog;
pub use model::*;
