use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// One of the three named areas a card can occupy in a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Main,
    Extra,
    Side,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Main, Zone::Extra, Zone::Side];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Main => "main",
            Zone::Extra => "extra",
            Zone::Side => "side",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|z| z.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeckCard / Deck
// ---------------------------------------------------------------------------

/// A card reference and how many copies of it sit in one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCard {
    pub card_id: String,
    pub quantity: u32,
}

impl DeckCard {
    pub fn new(card_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            card_id: card_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub main_deck: Vec<DeckCard>,
    #[serde(default)]
    pub extra_deck: Vec<DeckCard>,
    #[serde(default)]
    pub side_deck: Vec<DeckCard>,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Deck {
    pub fn zone(&self, zone: Zone) -> &[DeckCard] {
        match zone {
            Zone::Main => &self.main_deck,
            Zone::Extra => &self.extra_deck,
            Zone::Side => &self.side_deck,
        }
    }

    /// Total copies across all three zones.
    pub fn total_cards(&self) -> u32 {
        Zone::ALL
            .iter()
            .flat_map(|z| self.zone(*z))
            .map(|c| c.quantity)
            .sum()
    }
}

/// Fields accepted when creating a deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDeck {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub main_deck: Vec<DeckCard>,
    #[serde(default)]
    pub extra_deck: Vec<DeckCard>,
    #[serde(default)]
    pub side_deck: Vec<DeckCard>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewDeck {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn zone(&self, zone: Zone) -> &[DeckCard] {
        match zone {
            Zone::Main => &self.main_deck,
            Zone::Extra => &self.extra_deck,
            Zone::Side => &self.side_deck,
        }
    }
}

/// Full replacement of a deck's editable content, sent on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckUpdate {
    pub name: String,
    pub description: Option<String>,
    pub main_deck: Vec<DeckCard>,
    pub extra_deck: Vec<DeckCard>,
    pub side_deck: Vec<DeckCard>,
}

impl DeckUpdate {
    pub fn zone(&self, zone: Zone) -> &[DeckCard] {
        match zone {
            Zone::Main => &self.main_deck,
            Zone::Extra => &self.extra_deck,
            Zone::Side => &self.side_deck,
        }
    }
}
