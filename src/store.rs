//! Storage contracts consumed by the deck builder.
//!
//! The rules never talk to storage directly. A [`CatalogReader`] supplies the
//! owned cards and persisted decks, a [`DeckWriter`] accepts full replacements
//! on save. Both the local DuckDB [`Connection`](crate::Connection) and the
//! remote [`RestClient`](crate::remote::RestClient) implement them.

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Card, Deck, DeckUpdate, NewDeck};
use crate::queries::{CardQuery, DeckQuery};

pub trait CatalogReader {
    /// Every card `owner` has in their collection.
    fn owned_cards(&self, owner: &str) -> Result<Vec<Card>>;

    /// A single deck, or `None` if it does not exist.
    fn deck(&self, deck_id: &str) -> Result<Option<Deck>>;

    /// All decks of `owner`, most recently updated first.
    fn decks(&self, owner: &str) -> Result<Vec<Deck>>;
}

pub trait DeckWriter {
    fn create_deck(&self, owner: &str, deck: &NewDeck) -> Result<Deck>;

    /// Replace name, description and all three zones of a deck.
    fn update_deck(&self, deck_id: &str, update: &DeckUpdate) -> Result<Deck>;

    fn delete_deck(&self, deck_id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Local store
// ---------------------------------------------------------------------------

impl CatalogReader for Connection {
    fn owned_cards(&self, owner: &str) -> Result<Vec<Card>> {
        CardQuery::new(self).list(owner)
    }

    fn deck(&self, deck_id: &str) -> Result<Option<Deck>> {
        DeckQuery::new(self).get(deck_id)
    }

    fn decks(&self, owner: &str) -> Result<Vec<Deck>> {
        DeckQuery::new(self).list(owner)
    }
}

impl DeckWriter for Connection {
    fn create_deck(&self, owner: &str, deck: &NewDeck) -> Result<Deck> {
        DeckQuery::new(self).create(owner, deck)
    }

    fn update_deck(&self, deck_id: &str, update: &DeckUpdate) -> Result<Deck> {
        DeckQuery::new(self).update(deck_id, update)
    }

    fn delete_deck(&self, deck_id: &str) -> Result<()> {
        DeckQuery::new(self).delete(deck_id)
    }
}
