//! In-memory catalog operations: facet filtering, kind-aware sorting and
//! collection statistics. Everything here is pure and synchronous.

pub mod filter;
pub mod sort;
pub mod stats;

pub use filter::{filter_cards, CardFilters, Facet, Range};
pub use sort::{sort_cards, SortBy, SortDirection, SortState};
pub use stats::{recent_cards, CollectionStats};

use crate::models::Card;

/// Filter then sort, the way the card list view presents a collection.
pub fn view(
    cards: &[Card],
    filters: &CardFilters,
    by: SortBy,
    direction: SortDirection,
) -> Vec<Card> {
    let mut out = filter_cards(cards, filters);
    sort_cards(&mut out, by, direction);
    out
}
