//! Facet filtering over an in-memory card list.
//!
//! Every facet is independent: a card passes when it matches every facet that
//! has a selection (AND across facets), and matches a facet when it satisfies
//! any of that facet's selected values (OR within a facet).

use serde::{Deserialize, Serialize};

use crate::models::{Card, MonsterKind};

/// Inclusive numeric bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Range {
    pub fn at_least(min: i64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn at_most(max: i64) -> Self {
        Self { min: None, max: Some(max) }
    }

    pub fn between(min: i64, max: i64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Number of set bounds, for the active filter badge.
    fn bound_count(&self) -> usize {
        usize::from(self.min.is_some()) + usize::from(self.max.is_some())
    }

    /// A missing value never satisfies an active range.
    pub fn contains(&self, value: Option<i64>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(v) = value else {
            return false;
        };
        self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max)
    }
}

/// The multi-select facets, used by [`CardFilters::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    CardType,
    Attribute,
    MonsterType,
    Level,
    Classification,
    SpellTrapIcon,
    Subtype,
}

/// Structured filter criteria for the card list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFilters {
    pub search: String,
    pub card_types: Vec<String>,
    pub attributes: Vec<String>,
    pub monster_types: Vec<String>,
    pub levels: Vec<u32>,
    pub classifications: Vec<String>,
    pub spell_trap_icons: Vec<String>,
    pub subtypes: Vec<String>,
    pub atk: Range,
    pub def: Range,
    pub level: Range,
    pub rank: Range,
    pub link_rating: Range,
    pub pendulum_scale: Range,
}

impl CardFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    /// True when no facet restricts the list.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.active_count() == 0
    }

    /// Number of selected facet values plus set numeric bounds.
    ///
    /// Search text is not counted; it has its own input.
    pub fn active_count(&self) -> usize {
        let selections = self.card_types.len()
            + self.attributes.len()
            + self.monster_types.len()
            + self.levels.len()
            + self.classifications.len()
            + self.spell_trap_icons.len()
            + self.subtypes.len();
        let bounds = [
            &self.atk,
            &self.def,
            &self.level,
            &self.rank,
            &self.link_rating,
            &self.pendulum_scale,
        ]
        .iter()
        .map(|r| r.bound_count())
        .sum::<usize>();
        selections + bounds
    }

    /// Select `value` in `facet`, or deselect it if already selected.
    ///
    /// Level values that do not parse as a number are ignored.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        fn flip<T: PartialEq>(list: &mut Vec<T>, value: T) {
            if let Some(pos) = list.iter().position(|v| *v == value) {
                list.remove(pos);
            } else {
                list.push(value);
            }
        }

        match facet {
            Facet::CardType => flip(&mut self.card_types, value.to_string()),
            Facet::Attribute => flip(&mut self.attributes, value.to_string()),
            Facet::MonsterType => flip(&mut self.monster_types, value.to_string()),
            Facet::Classification => flip(&mut self.classifications, value.to_string()),
            Facet::SpellTrapIcon => flip(&mut self.spell_trap_icons, value.to_string()),
            Facet::Subtype => flip(&mut self.subtypes, value.to_string()),
            Facet::Level => {
                if let Ok(level) = value.trim().parse::<u32>() {
                    flip(&mut self.levels, level);
                }
            }
        }
    }

    /// Reset every facet, keeping nothing.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether a single card satisfies every active facet.
    pub fn matches(&self, card: &Card) -> bool {
        self.matches_search(card)
            && self.matches_card_type(card)
            && self.matches_attribute(card)
            && self.matches_monster_type(card)
            && self.matches_levels(card)
            && self.matches_classification(card)
            && self.matches_icon(card)
            && self.matches_subtype(card)
            && self.atk.contains(card.atk().map(i64::from))
            && self.def.contains(card.def().map(i64::from))
            && self.matches_level_bounds(card)
            && self.matches_pendulum(card)
    }

    fn matches_search(&self, card: &Card) -> bool {
        let needle = self.search.trim();
        needle.is_empty() || card.name.to_lowercase().contains(&needle.to_lowercase())
    }

    fn matches_card_type(&self, card: &Card) -> bool {
        self.card_types.is_empty()
            || self
                .card_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(card.card_type().as_str()))
    }

    fn matches_attribute(&self, card: &Card) -> bool {
        if self.attributes.is_empty() {
            return true;
        }
        card.attribute().is_some_and(|attr| {
            self.attributes
                .iter()
                .any(|a| a.eq_ignore_ascii_case(attr.as_str()))
        })
    }

    fn matches_monster_type(&self, card: &Card) -> bool {
        if self.monster_types.is_empty() {
            return true;
        }
        card.monster()
            .and_then(|m| m.monster_type.as_deref())
            .is_some_and(|mt| self.monster_types.iter().any(|t| t == mt))
    }

    fn matches_levels(&self, card: &Card) -> bool {
        if self.levels.is_empty() {
            return true;
        }
        card.monster()
            .and_then(|m| m.level_rank_link)
            .is_some_and(|lv| self.levels.contains(&lv))
    }

    fn matches_classification(&self, card: &Card) -> bool {
        if self.classifications.is_empty() {
            return true;
        }
        card.classification()
            .is_some_and(|c| self.classifications.iter().any(|s| s == c))
    }

    fn matches_icon(&self, card: &Card) -> bool {
        if self.spell_trap_icons.is_empty() {
            return true;
        }
        card.icon().is_some_and(|icon| {
            let icon = icon.to_lowercase();
            self.spell_trap_icons
                .iter()
                .any(|f| icon.contains(&f.to_lowercase()))
        })
    }

    /// "Normal" and "Effect" live in the classification column, every other
    /// subtype in the subtype column.
    fn matches_subtype(&self, card: &Card) -> bool {
        if self.subtypes.is_empty() {
            return true;
        }
        self.subtypes.iter().any(|wanted| match wanted.as_str() {
            "Normal" | "Effect" => card.classification() == Some(wanted.as_str()),
            _ => card.subtype() == Some(wanted.as_str()),
        })
    }

    /// Level, rank and link bounds each restrict only their own monster kind.
    fn matches_level_bounds(&self, card: &Card) -> bool {
        let Some(monster) = card.monster() else {
            return true;
        };
        let (range, value) = match monster.kind {
            MonsterKind::Xyz => (&self.rank, monster.rank()),
            MonsterKind::Link => (&self.link_rating, monster.link()),
            _ => (&self.level, monster.level()),
        };
        range.contains(value.map(i64::from))
    }

    fn matches_pendulum(&self, card: &Card) -> bool {
        if !self.pendulum_scale.is_active() {
            return true;
        }
        match card.monster() {
            Some(m) if m.pendulum => self.pendulum_scale.contains(m.pendulum_scale.map(i64::from)),
            _ => false,
        }
    }
}

/// Return the cards matching `filters`, in their original order.
pub fn filter_cards(cards: &[Card], filters: &CardFilters) -> Vec<Card> {
    if filters.is_empty() {
        return cards.to_vec();
    }
    cards.iter().filter(|c| filters.matches(c)).cloned().collect()
}
