//! Playlist state store: the single source of truth for playlist position
//! and transport intent.
//!
//! `PlaylistState` is only ever mutated through `PlaylistState::reduce`.

mod model;

pub use model::*;
