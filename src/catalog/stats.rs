//! Collection statistics for the dashboard and statistics views.
//!
//! Every count is weighted by owned quantity.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Card, CardType};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total: u32,
    pub unique: usize,
    pub monsters: u32,
    pub spells: u32,
    pub traps: u32,
    pub by_rarity: BTreeMap<String, u32>,
    pub by_attribute: BTreeMap<String, u32>,
    pub by_level: BTreeMap<u32, u32>,
    pub by_rank: BTreeMap<u32, u32>,
    pub by_link: BTreeMap<u32, u32>,
    /// Monster types, most owned first.
    pub by_monster_type: Vec<(String, u32)>,
}

impl CollectionStats {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut stats = CollectionStats {
            unique: cards.len(),
            ..Default::default()
        };
        let mut monster_types: BTreeMap<String, u32> = BTreeMap::new();

        for card in cards {
            let qty = card.quantity;
            stats.total += qty;
            match card.card_type() {
                CardType::Monster => stats.monsters += qty,
                CardType::Spell => stats.spells += qty,
                CardType::Trap => stats.traps += qty,
            }

            let rarity = card.rarity.clone().unwrap_or_else(|| "Common".to_string());
            *stats.by_rarity.entry(rarity).or_default() += qty;

            let Some(monster) = card.monster() else {
                continue;
            };
            if let Some(attr) = monster.attribute {
                *stats.by_attribute.entry(attr.as_str().to_string()).or_default() += qty;
            }
            if let Some(level) = monster.level() {
                *stats.by_level.entry(level).or_default() += qty;
            }
            if let Some(rank) = monster.rank() {
                *stats.by_rank.entry(rank).or_default() += qty;
            }
            if let Some(link) = monster.link() {
                *stats.by_link.entry(link).or_default() += qty;
            }
            if let Some(mt) = &monster.monster_type {
                *monster_types.entry(mt.clone()).or_default() += qty;
            }
        }

        let mut by_type: Vec<(String, u32)> = monster_types.into_iter().collect();
        by_type.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats.by_monster_type = by_type;
        stats
    }
}

/// The `n` most recently added cards, newest first.
///
/// Timestamps are ISO-8601 strings, so lexical order is chronological.
/// Cards without a timestamp sort last.
pub fn recent_cards(cards: &[Card], n: usize) -> Vec<Card> {
    let mut sorted: Vec<&Card> = cards.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.into_iter().take(n).cloned().collect()
}
