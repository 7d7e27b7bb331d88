//! The deck builder interaction layer.
//!
//! A [`DeckSession`] owns one deck being edited plus the collection it draws
//! from, and turns user gestures into rule calls. Nothing is persisted until
//! [`DeckSession::save`] succeeds.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{self, CardFilters, SortBy, SortDirection};
use crate::deck::rules::{resolve_zone, DeckZones, Rejection, TypeBreakdown, ZoneLimits};
use crate::error::{CollectionError, Result};
use crate::models::{Card, Deck, DeckCard, DeckUpdate, Zone};
use crate::store::{CatalogReader, DeckWriter};

pub struct DeckSession {
    deck_id: String,
    owner: String,
    name: String,
    description: Option<String>,
    zones: DeckZones,
    catalog: Vec<Card>,
    index: HashMap<String, usize>,
    limits: ZoneLimits,
    dirty: bool,
}

impl DeckSession {
    /// Hydrate a session from a persisted deck and the owner's cards.
    ///
    /// Deck entries pointing at cards that are not in `catalog` are dropped.
    pub fn open(deck: &Deck, catalog: Vec<Card>) -> Self {
        let index: HashMap<String, usize> = catalog
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let known = |list: &[DeckCard]| -> Vec<DeckCard> {
            list.iter()
                .filter(|e| index.contains_key(&e.card_id))
                .cloned()
                .collect()
        };
        let main = known(&deck.main_deck);
        let extra = known(&deck.extra_deck);
        let side = known(&deck.side_deck);

        let dropped = deck.main_deck.len() + deck.extra_deck.len() + deck.side_deck.len()
            - (main.len() + extra.len() + side.len());
        if dropped > 0 {
            tracing::debug!(deck.id = %deck.id, dropped, "dropped deck entries with unknown cards");
        }

        Self {
            deck_id: deck.id.clone(),
            owner: deck.user_id.clone(),
            name: deck.name.clone(),
            description: deck.description.clone(),
            zones: DeckZones::from_lists(&main, &extra, &side),
            catalog,
            index,
            limits: ZoneLimits::default(),
            dirty: false,
        }
    }

    /// Load the deck and its owner's collection through `reader`.
    pub fn load<R: CatalogReader + ?Sized>(reader: &R, deck_id: &str) -> Result<Self> {
        let deck = reader
            .deck(deck_id)?
            .ok_or_else(|| CollectionError::NotFound(format!("Deck {}", deck_id)))?;
        let cards = reader.owned_cards(&deck.user_id)?;
        tracing::debug!(deck.id = %deck_id, cards = cards.len(), "opened deck builder");
        Ok(Self::open(&deck, cards))
    }

    pub fn with_limits(mut self, limits: ZoneLimits) -> Self {
        self.limits = limits;
        self
    }

    // -- Accessors ---------------------------------------------------------

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn zones(&self) -> &DeckZones {
        &self.zones
    }

    pub fn catalog(&self) -> &[Card] {
        &self.catalog
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.index.get(card_id).map(|&i| &self.catalog[i])
    }

    /// True when there are edits that have not been saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -- Editing -----------------------------------------------------------

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.dirty = true;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.dirty = true;
    }

    /// Click-to-add or drop from the card list onto `zone`.
    ///
    /// Returns the zone the card actually landed in.
    pub fn add(&mut self, card_id: &str, zone: Zone) -> std::result::Result<Zone, Rejection> {
        let card = self
            .index
            .get(card_id)
            .map(|&i| &self.catalog[i])
            .ok_or_else(|| Rejection::UnknownCard(card_id.to_string()))?;
        let landed = self.zones.add_card(card, zone)?;
        self.dirty = true;
        Ok(landed)
    }

    /// Remove one copy from `zone`. Returns false if there was nothing to remove.
    pub fn remove(&mut self, card_id: &str, zone: Zone) -> bool {
        let removed = self.zones.remove_card(card_id, zone);
        self.dirty |= removed;
        removed
    }

    /// Drag one copy from `from` to `to`.
    ///
    /// The remove and add run on a copy of the zones that only replaces the
    /// live zones once both succeed, so a refused move changes nothing.
    pub fn move_card(
        &mut self,
        card_id: &str,
        from: Zone,
        to: Zone,
    ) -> std::result::Result<Zone, Rejection> {
        let card = self
            .index
            .get(card_id)
            .map(|&i| &self.catalog[i])
            .ok_or_else(|| Rejection::UnknownCard(card_id.to_string()))?;
        if !self.zones.zone(from).contains(card_id) {
            return Err(Rejection::NotInZone {
                name: card.name.clone(),
                zone: from,
            });
        }
        if from == to {
            return Ok(to);
        }
        if resolve_zone(card, to) != to {
            return Err(Rejection::ZoneMismatch {
                name: card.name.clone(),
                zone: to,
            });
        }

        let mut trial = self.zones.clone();
        trial.remove_card(card_id, from);
        let landed = trial.add_card(card, to)?;
        self.zones = trial;
        self.dirty = true;
        Ok(landed)
    }

    /// Empty all three zones if `confirm` agrees. Returns whether it cleared.
    pub fn clear<F: FnOnce() -> bool>(&mut self, confirm: F) -> bool {
        if !confirm() {
            return false;
        }
        self.zones.clear();
        self.dirty = true;
        true
    }

    // -- Views -------------------------------------------------------------

    /// `(current, max)` copies for a zone's counter.
    pub fn counter(&self, zone: Zone) -> (u32, u32) {
        self.zones.counter(zone, &self.limits)
    }

    /// Counters for all three zones, main first.
    pub fn counts(&self) -> [(Zone, u32, u32); 3] {
        Zone::ALL.map(|zone| {
            let (current, max) = self.counter(zone);
            (zone, current, max)
        })
    }

    pub fn type_breakdown(&self) -> TypeBreakdown {
        let by_id: HashMap<String, Card> = self
            .zones
            .zone(Zone::Main)
            .iter()
            .filter_map(|(id, _)| self.card(id).map(|c| (id.to_string(), c.clone())))
            .collect();
        self.zones.type_breakdown(&by_id)
    }

    /// The collection panel: filtered and sorted cards available to add.
    pub fn available(&self, filters: &CardFilters, by: SortBy, direction: SortDirection) -> Vec<Card> {
        catalog::view(&self.catalog, filters, by, direction)
    }

    /// Cards of one zone with their quantities, in insertion order.
    pub fn zone_cards(&self, zone: Zone) -> Vec<(&Card, u32)> {
        self.zones
            .zone(zone)
            .iter()
            .filter_map(|(id, qty)| self.card(id).map(|c| (c, qty)))
            .collect()
    }

    /// Draw a random opening hand from the main zone.
    pub fn sample_hand<R: Rng + ?Sized>(&self, rng: &mut R, size: usize) -> Vec<Card> {
        let pile: Vec<&Card> = self
            .zone_cards(Zone::Main)
            .into_iter()
            .flat_map(|(card, qty)| std::iter::repeat(card).take(qty as usize))
            .collect();
        pile.choose_multiple(rng, size).map(|c| (*c).clone()).collect()
    }

    // -- Persistence -------------------------------------------------------

    pub fn to_update(&self) -> DeckUpdate {
        DeckUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
            main_deck: self.zones.to_deck_cards(Zone::Main),
            extra_deck: self.zones.to_deck_cards(Zone::Extra),
            side_deck: self.zones.to_deck_cards(Zone::Side),
        }
    }

    /// Write the whole deck through `writer`.
    ///
    /// On failure the in-memory deck is left as it was so the save can be
    /// retried.
    pub fn save<W: DeckWriter + ?Sized>(&mut self, writer: &W) -> Result<Deck> {
        match writer.update_deck(&self.deck_id, &self.to_update()) {
            Ok(deck) => {
                self.dirty = false;
                tracing::info!(
                    deck.id = %self.deck_id,
                    main = self.zones.zone(Zone::Main).total(),
                    extra = self.zones.zone(Zone::Extra).total(),
                    side = self.zones.zone(Zone::Side).total(),
                    "deck saved"
                );
                Ok(deck)
            }
            Err(e) => {
                tracing::warn!(deck.id = %self.deck_id, error = %e, "deck save failed");
                Err(e)
            }
        }
    }
}
