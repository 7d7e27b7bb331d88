//! Deck composition rules.
//!
//! Enforces the per-card copy limit, the owned-quantity cap and fixed zone
//! placement. Deck size is only counted, never enforced.

use std::collections::HashMap;

use crate::config;
use crate::models::{Card, CardType, DeckCard, Zone};

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Why a deck edit was refused. The deck is unchanged whenever one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("cannot add more than {limit} copies of {name}")]
    CopyLimit { name: String, limit: u32 },

    #[error("no more copies of {name} in your collection ({owned} owned)")]
    InsufficientCopies { name: String, owned: u32 },

    #[error("card {0} is not in the collection")]
    UnknownCard(String),

    #[error("{name} is not in the {zone} deck")]
    NotInZone { name: String, zone: Zone },

    #[error("{name} cannot be placed in the {zone} deck")]
    ZoneMismatch { name: String, zone: Zone },
}

// ---------------------------------------------------------------------------
// ZoneList
// ---------------------------------------------------------------------------

/// Card id to quantity, remembering the order entries were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneList {
    quantities: HashMap<String, u32>,
    order: Vec<String>,
}

impl ZoneList {
    pub fn quantity(&self, card_id: &str) -> u32 {
        self.quantities.get(card_id).copied().unwrap_or(0)
    }

    pub fn contains(&self, card_id: &str) -> bool {
        self.quantities.contains_key(card_id)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct cards in this zone.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Total copies in this zone.
    pub fn total(&self) -> u32 {
        self.quantities.values().sum()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.quantity(id)))
    }

    fn increment(&mut self, card_id: &str) {
        match self.quantities.get_mut(card_id) {
            Some(qty) => *qty += 1,
            None => {
                self.quantities.insert(card_id.to_string(), 1);
                self.order.push(card_id.to_string());
            }
        }
    }

    /// Returns false when the card was not present.
    fn decrement(&mut self, card_id: &str) -> bool {
        let Some(qty) = self.quantities.get_mut(card_id) else {
            return false;
        };
        if *qty > 1 {
            *qty -= 1;
        } else {
            self.quantities.remove(card_id);
            self.order.retain(|id| id != card_id);
        }
        true
    }

    /// Load a persisted entry as-is. Repeated ids are merged.
    fn insert_persisted(&mut self, card_id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.quantities.get_mut(card_id) {
            Some(qty) => *qty += quantity,
            None => {
                self.quantities.insert(card_id.to_string(), quantity);
                self.order.push(card_id.to_string());
            }
        }
    }

    fn clear(&mut self) {
        self.quantities.clear();
        self.order.clear();
    }

    pub fn to_deck_cards(&self) -> Vec<DeckCard> {
        self.iter().map(|(id, qty)| DeckCard::new(id, qty)).collect()
    }
}

// ---------------------------------------------------------------------------
// ZoneLimits
// ---------------------------------------------------------------------------

/// Display-only size targets per zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLimits {
    pub main_min: u32,
    pub main_max: u32,
    pub extra_max: u32,
    pub side_max: u32,
}

impl Default for ZoneLimits {
    fn default() -> Self {
        Self {
            main_min: config::MAIN_MIN,
            main_max: config::MAIN_MAX,
            extra_max: config::EXTRA_MAX,
            side_max: config::SIDE_MAX,
        }
    }
}

impl ZoneLimits {
    pub fn max(&self, zone: Zone) -> u32 {
        match zone {
            Zone::Main => self.main_max,
            Zone::Extra => self.extra_max,
            Zone::Side => self.side_max,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeBreakdown {
    pub monster: u32,
    pub spell: u32,
    pub trap: u32,
}

// ---------------------------------------------------------------------------
// DeckZones
// ---------------------------------------------------------------------------

/// Where a card actually goes when the user aims it at `intended`.
///
/// Extra-deck monsters always go to extra unless aimed at side; anything
/// else aimed at extra goes to main.
pub fn resolve_zone(card: &Card, intended: Zone) -> Zone {
    match intended {
        Zone::Side => Zone::Side,
        _ if card.is_extra_deck() => Zone::Extra,
        _ => Zone::Main,
    }
}

/// The three zones of one deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckZones {
    main: ZoneList,
    extra: ZoneList,
    side: ZoneList,
}

impl DeckZones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build zones from persisted lists without re-checking admission.
    pub fn from_lists(main: &[DeckCard], extra: &[DeckCard], side: &[DeckCard]) -> Self {
        let mut zones = Self::new();
        for (zone, list) in [(Zone::Main, main), (Zone::Extra, extra), (Zone::Side, side)] {
            for entry in list {
                zones.zone_mut(zone).insert_persisted(&entry.card_id, entry.quantity);
            }
        }
        zones
    }

    pub fn zone(&self, zone: Zone) -> &ZoneList {
        match zone {
            Zone::Main => &self.main,
            Zone::Extra => &self.extra,
            Zone::Side => &self.side,
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut ZoneList {
        match zone {
            Zone::Main => &mut self.main,
            Zone::Extra => &mut self.extra,
            Zone::Side => &mut self.side,
        }
    }

    /// Copies of `card_id` across all three zones.
    pub fn total_copies(&self, card_id: &str) -> u32 {
        Zone::ALL.iter().map(|z| self.zone(*z).quantity(card_id)).sum()
    }

    /// Check admission without mutating. Returns the zone the card would land in.
    pub fn check_add(&self, card: &Card, intended: Zone) -> Result<Zone, Rejection> {
        let total = self.total_copies(&card.id);
        if total >= config::COPY_LIMIT {
            return Err(Rejection::CopyLimit {
                name: card.name.clone(),
                limit: config::COPY_LIMIT,
            });
        }
        if total >= card.quantity {
            return Err(Rejection::InsufficientCopies {
                name: card.name.clone(),
                owned: card.quantity,
            });
        }
        Ok(resolve_zone(card, intended))
    }

    /// Add one copy of `card`, routed per [`resolve_zone`].
    pub fn add_card(&mut self, card: &Card, intended: Zone) -> Result<Zone, Rejection> {
        let zone = self.check_add(card, intended)?;
        self.zone_mut(zone).increment(&card.id);
        Ok(zone)
    }

    /// Remove one copy of `card_id` from `zone`. Returns false if it was not there.
    pub fn remove_card(&mut self, card_id: &str, zone: Zone) -> bool {
        self.zone_mut(zone).decrement(card_id)
    }

    pub fn clear(&mut self) {
        for zone in Zone::ALL {
            self.zone_mut(zone).clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        Zone::ALL.iter().all(|z| self.zone(*z).is_empty())
    }

    /// `(current, max)` for the zone's counter.
    pub fn counter(&self, zone: Zone, limits: &ZoneLimits) -> (u32, u32) {
        (self.zone(zone).total(), limits.max(zone))
    }

    /// Monster/spell/trap copies in the main zone.
    ///
    /// Ids missing from `catalog` are not counted.
    pub fn type_breakdown(&self, catalog: &HashMap<String, Card>) -> TypeBreakdown {
        let mut breakdown = TypeBreakdown::default();
        for (id, qty) in self.main.iter() {
            match catalog.get(id).map(|c| c.card_type()) {
                Some(CardType::Monster) => breakdown.monster += qty,
                Some(CardType::Spell) => breakdown.spell += qty,
                Some(CardType::Trap) => breakdown.trap += qty,
                None => {}
            }
        }
        breakdown
    }

    pub fn to_deck_cards(&self, zone: Zone) -> Vec<DeckCard> {
        self.zone(zone).to_deck_cards()
    }
}
