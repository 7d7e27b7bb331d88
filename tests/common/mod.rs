//! Shared fixtures for the integration tests.
//!
//! Provides a small sample collection covering every card family and
//! monster kind, and helpers that load it into a fresh store.

#![allow(dead_code)]

use std::cell::RefCell;

use ygo_collection::models::{Card, CardRecord, CardType, Deck, DeckUpdate, NewDeck};
use ygo_collection::{CollectionError, CollectionSdk, Connection, DeckWriter, Result};

pub const OWNER: &str = "duelist";

fn monster(id: &str, name: &str, qty: u32) -> CardRecord {
    CardRecord {
        id: id.into(),
        user_id: OWNER.into(),
        name: name.into(),
        card_type: CardType::Monster,
        quantity: qty,
        ..Default::default()
    }
}

/// Ten cards: leveled, tuner, pendulum, xyz, link, fusion, two spells, a trap.
pub fn sample_cards() -> Vec<Card> {
    let records = vec![
        CardRecord {
            monster_type: Some("Spellcaster".into()),
            attribute: Some("DARK".into()),
            level_rank_link: Some(7),
            atk: Some(2500),
            def: Some(2100),
            classification: Some("Normal".into()),
            rarity: Some("Ultra Rare".into()),
            ..monster("dark-magician", "Dark Magician", 3)
        },
        CardRecord {
            monster_type: Some("Dragon".into()),
            attribute: Some("LIGHT".into()),
            level_rank_link: Some(8),
            atk: Some(3000),
            def: Some(2500),
            classification: Some("Normal".into()),
            rarity: Some("Ultra Rare".into()),
            ..monster("blue-eyes", "Blue-Eyes White Dragon", 2)
        },
        CardRecord {
            monster_type: Some("Zombie".into()),
            attribute: Some("FIRE".into()),
            level_rank_link: Some(3),
            atk: Some(0),
            def: Some(1800),
            subtype: Some("Tuner".into()),
            classification: Some("Effect".into()),
            ..monster("ash", "Ash Blossom & Joyous Spring", 3)
        },
        CardRecord {
            monster_type: Some("Dragon".into()),
            attribute: Some("DARK".into()),
            level_rank_link: Some(7),
            pendulum_scale: Some(4),
            atk: Some(2500),
            def: Some(2000),
            subtype: Some("Pendulum".into()),
            classification: Some("Effect".into()),
            ..monster("odd-eyes", "Odd-Eyes Pendulum Dragon", 1)
        },
        CardRecord {
            monster_type: Some("Warrior".into()),
            attribute: Some("LIGHT".into()),
            level_rank_link: Some(4),
            atk: Some(2500),
            def: Some(2000),
            subtype: Some("Xyz".into()),
            ..monster("utopia", "Number 39: Utopia", 1)
        },
        CardRecord {
            monster_type: Some("Cyberse".into()),
            attribute: Some("LIGHT".into()),
            link_rating: Some(3),
            atk: Some(2300),
            subtype: Some("Link".into()),
            ..monster("decode", "Decode Talker", 2)
        },
        CardRecord {
            monster_type: Some("Dragon".into()),
            attribute: Some("LIGHT".into()),
            level_rank_link: Some(12),
            atk: Some(4500),
            def: Some(3800),
            subtype: Some("Fusion".into()),
            ..monster("ultimate", "Blue-Eyes Ultimate Dragon", 1)
        },
        CardRecord {
            id: "pot".into(),
            user_id: OWNER.into(),
            name: "Pot of Greed".into(),
            card_type: CardType::Spell,
            card_icon: Some("Normal".into()),
            quantity: 3,
            ..Default::default()
        },
        CardRecord {
            id: "mst".into(),
            user_id: OWNER.into(),
            name: "Mystical Space Typhoon".into(),
            card_type: CardType::Spell,
            card_icon: Some("Quick-Play".into()),
            quantity: 2,
            ..Default::default()
        },
        CardRecord {
            id: "mirror-force".into(),
            user_id: OWNER.into(),
            name: "Mirror Force".into(),
            card_type: CardType::Trap,
            card_icon: Some("Normal".into()),
            quantity: 1,
            ..Default::default()
        },
    ];
    records.into_iter().map(Card::from).collect()
}

/// In-memory store loaded with [`sample_cards`].
pub fn setup_store() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    ygo_collection::queries::CardQuery::new(&conn)
        .import(OWNER, &sample_cards())
        .unwrap();
    conn
}

/// SDK rooted in a temp dir with the sample collection imported.
///
/// The caller must keep the `TempDir` alive for the duration of the test.
pub fn setup_sdk() -> (CollectionSdk, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let sdk = CollectionSdk::builder()
        .data_dir(tmp_dir.path())
        .in_memory(true)
        .offline(true)
        .build()
        .unwrap();
    sdk.cards().import(OWNER, &sample_cards()).unwrap();
    (sdk, tmp_dir)
}

/// A writer that refuses every call, to exercise failed saves.
pub struct FailingWriter;

impl DeckWriter for FailingWriter {
    fn create_deck(&self, _owner: &str, _deck: &NewDeck) -> Result<Deck> {
        Err(unavailable())
    }

    fn update_deck(&self, _deck_id: &str, _update: &DeckUpdate) -> Result<Deck> {
        Err(unavailable())
    }

    fn delete_deck(&self, _deck_id: &str) -> Result<()> {
        Err(unavailable())
    }
}

fn unavailable() -> CollectionError {
    CollectionError::Remote {
        status: 503,
        message: "service unavailable".into(),
    }
}

/// A writer that records every update it receives.
#[derive(Default)]
pub struct RecordingWriter {
    pub updates: RefCell<Vec<(String, DeckUpdate)>>,
}

impl DeckWriter for RecordingWriter {
    fn create_deck(&self, owner: &str, deck: &NewDeck) -> Result<Deck> {
        Ok(Deck {
            id: "recorded".into(),
            name: deck.name.clone(),
            description: deck.description.clone(),
            user_id: owner.into(),
            main_deck: deck.main_deck.clone(),
            extra_deck: deck.extra_deck.clone(),
            side_deck: deck.side_deck.clone(),
            is_public: deck.is_public,
            created_at: None,
            updated_at: None,
        })
    }

    fn update_deck(&self, deck_id: &str, update: &DeckUpdate) -> Result<Deck> {
        self.updates
            .borrow_mut()
            .push((deck_id.to_string(), update.clone()));
        Ok(Deck {
            id: deck_id.into(),
            name: update.name.clone(),
            description: update.description.clone(),
            user_id: OWNER.into(),
            main_deck: update.main_deck.clone(),
            extra_deck: update.extra_deck.clone(),
            side_deck: update.side_deck.clone(),
            is_public: false,
            created_at: None,
            updated_at: None,
        })
    }

    fn delete_deck(&self, _deck_id: &str) -> Result<()> {
        Ok(())
    }
}
