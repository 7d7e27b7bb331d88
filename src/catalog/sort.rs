//! Card ordering.
//!
//! A plain numeric sort is meaningless across card kinds: a level 4 monster
//! and a rank 4 Xyz share a display slot but not a scale. The comparator
//! first decides whether each card is of the kind the key addresses and only
//! then compares values. Unlike kinds fall back to name order, which makes
//! the comparator intransitive across mixed inputs, so [`sort_cards`] uses a
//! merge sort that never depends on transitivity.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Card, CardKind, CardType, MonsterCard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Name,
    CardType,
    Atk,
    Def,
    Level,
    Rank,
    Link,
    Pendulum,
}

impl SortBy {
    pub const ALL: [SortBy; 8] = [
        SortBy::Name,
        SortBy::CardType,
        SortBy::Atk,
        SortBy::Def,
        SortBy::Level,
        SortBy::Rank,
        SortBy::Link,
        SortBy::Pendulum,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Name => "Name",
            SortBy::CardType => "Card type",
            SortBy::Atk => "ATK",
            SortBy::Def => "DEF",
            SortBy::Level => "Level",
            SortBy::Rank => "Rank",
            SortBy::Link => "Link",
            SortBy::Pendulum => "Pendulum scale",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// The sort menu state: choosing the active key flips direction, choosing a
/// different key starts ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub by: SortBy,
    pub direction: SortDirection,
}

impl SortState {
    pub fn select(&mut self, by: SortBy) {
        if self.by == by {
            self.direction = self.direction.flipped();
        } else {
            self.by = by;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn apply(&self, cards: &mut [Card]) {
        sort_cards(cards, self.by, self.direction);
    }
}

// ---------------------------------------------------------------------------
// Priorities
// ---------------------------------------------------------------------------

const UNRANKED: u8 = 99;

fn monster_subtype_priority(name: &str) -> u8 {
    match name {
        "Fusion" => 1,
        "Synchro" => 2,
        "Xyz" => 3,
        "Link" => 4,
        "Pendulum" => 5,
        "Ritual" => 6,
        "Effect" => 7,
        "Normal" => 8,
        "Tuner" => 9,
        "Flip" => 10,
        "Gemini" => 11,
        "Spirit" => 12,
        "Toon" => 13,
        "Union" => 14,
        "Token" => 15,
        _ => UNRANKED,
    }
}

/// Spell/trap icon order used inside the spell and trap groups.
pub fn icon_priority(icon: Option<&str>) -> u8 {
    match icon.unwrap_or_default() {
        "Normal" => 1,
        "Continuous" => 2,
        "Quick-Play" => 3,
        "Equip" => 4,
        "Field" => 5,
        "Ritual" => 6,
        "Counter" => 7,
        _ => UNRANKED,
    }
}

/// Composite (family, sub-kind) key used when sorting by card type.
///
/// Monsters rank by subtype, falling back to classification; spells and
/// traps rank by icon.
pub fn type_sort_value(card: &Card) -> (u8, u8) {
    let family = match card.card_type() {
        CardType::Monster => 1,
        CardType::Spell => 2,
        CardType::Trap => 3,
    };
    let sub = match &card.kind {
        CardKind::Monster(m) => m
            .subtype
            .as_deref()
            .or(m.classification.as_deref())
            .map(monster_subtype_priority)
            .unwrap_or(UNRANKED),
        CardKind::Spell(st) | CardKind::Trap(st) => icon_priority(st.icon.as_deref()),
    };
    (family, sub)
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

fn by_name(a: &Card, b: &Card) -> Ordering {
    a.name.cmp(&b.name)
}

/// Compare values only when both cards carry one; otherwise fall back to name.
fn numeric_or_name(a: &Card, b: &Card, va: Option<u32>, vb: Option<u32>) -> Ordering {
    match (va, vb) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| by_name(a, b)),
        _ => by_name(a, b),
    }
}

fn compare_monsters(a: &Card, ma: &MonsterCard, b: &Card, mb: &MonsterCard, by: SortBy) -> Ordering {
    match by {
        SortBy::Name | SortBy::CardType => by_name(a, b),
        SortBy::Atk => ma.atk.cmp(&mb.atk).then_with(|| by_name(a, b)),
        SortBy::Def => ma.def.cmp(&mb.def).then_with(|| by_name(a, b)),
        SortBy::Level => {
            // Xyz and Link after leveled monsters, by name among themselves.
            match (ma.kind.has_level(), mb.kind.has_level()) {
                (true, true) => ma
                    .level_rank_link
                    .cmp(&mb.level_rank_link)
                    .then_with(|| by_name(a, b)),
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => by_name(a, b),
            }
        }
        SortBy::Rank => numeric_or_name(a, b, ma.rank(), mb.rank()),
        SortBy::Link => numeric_or_name(a, b, ma.link(), mb.link()),
        SortBy::Pendulum => match (ma.pendulum, mb.pendulum) {
            (true, true) => ma
                .pendulum_scale
                .cmp(&mb.pendulum_scale)
                .then_with(|| by_name(a, b)),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => by_name(a, b),
        },
    }
}

/// Ascending comparison of two cards under `by`.
pub fn compare(a: &Card, b: &Card, by: SortBy) -> Ordering {
    if by == SortBy::CardType {
        return type_sort_value(a)
            .cmp(&type_sort_value(b))
            .then_with(|| by_name(a, b));
    }
    match (&a.kind, &b.kind) {
        (CardKind::Monster(ma), CardKind::Monster(mb)) => compare_monsters(a, ma, b, mb, by),
        (CardKind::Monster(_), _) => Ordering::Less,
        (_, CardKind::Monster(_)) => Ordering::Greater,
        _ => a
            .card_type()
            .cmp(&b.card_type())
            .then_with(|| icon_priority(a.icon()).cmp(&icon_priority(b.icon())))
            .then_with(|| by_name(a, b)),
    }
}

/// Sort in place by one key; the direction inverts the whole comparator.
pub fn sort_cards(cards: &mut [Card], by: SortBy, direction: SortDirection) {
    merge_sort_by(cards, &mut |a, b| {
        let ord = compare(a, b, by);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Stable top-down merge sort.
///
/// `slice::sort_by` may panic when the comparator is not a total order.
fn merge_sort_by<T: Clone, F>(items: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }
    let mid = len / 2;
    merge_sort_by(&mut items[..mid], cmp);
    merge_sort_by(&mut items[mid..], cmp);

    let left = items[..mid].to_vec();
    let right = items[mid..].to_vec();
    let (mut i, mut j) = (0, 0);
    for slot in items.iter_mut() {
        let take_left = j >= right.len()
            || (i < left.len() && cmp(&right[j], &left[i]) != Ordering::Less);
        if take_left {
            *slot = left[i].clone();
            i += 1;
        } else {
            *slot = right[j].clone();
            j += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardRecord;

    fn card(id: &str, name: &str, f: impl FnOnce(&mut CardRecord)) -> Card {
        let mut r = CardRecord {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        };
        f(&mut r);
        r.into()
    }

    fn names(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn name_ascending_and_descending() {
        let mut cards = vec![
            card("1", "Blue-Eyes White Dragon", |_| {}),
            card("2", "Ash Blossom", |_| {}),
            card("3", "Zeus", |_| {}),
        ];
        sort_cards(&mut cards, SortBy::Name, SortDirection::Asc);
        assert_eq!(names(&cards), vec!["Ash Blossom", "Blue-Eyes White Dragon", "Zeus"]);

        sort_cards(&mut cards, SortBy::Name, SortDirection::Desc);
        assert_eq!(names(&cards), vec!["Zeus", "Blue-Eyes White Dragon", "Ash Blossom"]);
    }

    #[test]
    fn spells_and_traps_follow_monsters_under_any_key() {
        let mut cards = vec![
            card("t", "A Trap", |r| r.card_type = CardType::Trap),
            card("s", "A Spell", |r| {
                r.card_type = CardType::Spell;
                r.card_icon = Some("Field".into());
            }),
            card("q", "B Spell", |r| {
                r.card_type = CardType::Spell;
                r.card_icon = Some("Normal".into());
            }),
            card("m", "Zombie Monster", |r| r.atk = Some(100)),
        ];
        sort_cards(&mut cards, SortBy::Atk, SortDirection::Asc);
        assert_eq!(names(&cards), vec!["Zombie Monster", "B Spell", "A Spell", "A Trap"]);
    }

    #[test]
    fn card_type_key_groups_monsters_first() {
        let mut cards = vec![
            card("t", "Mirror Force", |r| r.card_type = CardType::Trap),
            card("x", "Utopia", |r| r.subtype = Some("Xyz".into())),
            card("s", "Raigeki", |r| r.card_type = CardType::Spell),
            card("f", "Fusion Thing", |r| r.subtype = Some("Fusion".into())),
            card("n", "Plain", |r| r.classification = Some("Normal".into())),
        ];
        sort_cards(&mut cards, SortBy::CardType, SortDirection::Asc);
        assert_eq!(
            names(&cards),
            vec!["Fusion Thing", "Utopia", "Plain", "Raigeki", "Mirror Force"]
        );
    }

    #[test]
    fn level_pushes_xyz_and_link_after_leveled_monsters() {
        let mut cards = vec![
            card("l", "Link Guy", |r| {
                r.subtype = Some("Link".into());
                r.link_rating = Some(2);
            }),
            card("x", "Xyz Guy", |r| {
                r.subtype = Some("Xyz".into());
                r.level_rank_link = Some(1);
            }),
            card("8", "Big", |r| r.level_rank_link = Some(8)),
            card("2", "Small", |r| r.level_rank_link = Some(2)),
            card("s", "Spell", |r| r.card_type = CardType::Spell),
        ];
        sort_cards(&mut cards, SortBy::Level, SortDirection::Asc);
        assert_eq!(names(&cards), vec!["Small", "Big", "Link Guy", "Xyz Guy", "Spell"]);
    }

    #[test]
    fn rank_does_not_compare_xyz_against_other_kinds() {
        let mut cards = vec![
            card("x", "Zed Xyz", |r| {
                r.subtype = Some("Xyz".into());
                r.level_rank_link = Some(1);
            }),
            card("m", "Alpha", |r| r.level_rank_link = Some(12)),
        ];
        sort_cards(&mut cards, SortBy::Rank, SortDirection::Asc);
        assert_eq!(names(&cards), vec!["Alpha", "Zed Xyz"]);

        let mut xyzs = vec![
            card("a", "A", |r| {
                r.subtype = Some("Xyz".into());
                r.level_rank_link = Some(8);
            }),
            card("b", "B", |r| {
                r.subtype = Some("Xyz".into());
                r.level_rank_link = Some(4);
            }),
        ];
        sort_cards(&mut xyzs, SortBy::Rank, SortDirection::Asc);
        assert_eq!(names(&xyzs), vec!["B", "A"]);
    }

    #[test]
    fn link_compares_link_rating() {
        let mut cards = vec![
            card("a", "A", |r| {
                r.subtype = Some("Link".into());
                r.link_rating = Some(4);
            }),
            card("b", "B", |r| {
                r.subtype = Some("Link".into());
                r.link_rating = Some(1);
            }),
        ];
        sort_cards(&mut cards, SortBy::Link, SortDirection::Asc);
        assert_eq!(names(&cards), vec!["B", "A"]);
    }

    #[test]
    fn pendulum_cards_first_then_scale() {
        let mut cards = vec![
            card("n", "Aaa", |_| {}),
            card("p8", "Pend Eight", |r| {
                r.subtype = Some("Pendulum".into());
                r.pendulum_scale = Some(8);
            }),
            card("p1", "Pend One", |r| {
                r.subtype = Some("Pendulum".into());
                r.pendulum_scale = Some(1);
            }),
        ];
        sort_cards(&mut cards, SortBy::Pendulum, SortDirection::Asc);
        assert_eq!(names(&cards), vec!["Pend One", "Pend Eight", "Aaa"]);
    }

    #[test]
    fn mixed_rank_input_does_not_panic() {
        let mut cards = vec![
            card("a", "A", |r| {
                r.subtype = Some("Xyz".into());
                r.level_rank_link = Some(8);
            }),
            card("m", "M", |_| {}),
            card("z", "Z", |r| {
                r.subtype = Some("Xyz".into());
                r.level_rank_link = Some(1);
            }),
        ];
        sort_cards(&mut cards, SortBy::Rank, SortDirection::Desc);
        assert_eq!(cards.len(), 3);
    }

    #[test]
    fn select_flips_or_resets_direction() {
        let mut state = SortState::default();
        state.select(SortBy::Name);
        assert_eq!(state.direction, SortDirection::Desc);
        state.select(SortBy::Atk);
        assert_eq!(state, SortState { by: SortBy::Atk, direction: SortDirection::Asc });
    }
}
