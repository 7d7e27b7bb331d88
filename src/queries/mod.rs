//! Query modules for the local store.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and returns typed models.

pub mod cards;
pub mod decks;

pub use cards::CardQuery;
pub use decks::DeckQuery;
