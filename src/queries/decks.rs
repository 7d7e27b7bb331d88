//! Deck queries against the local `decks` and `deck_cards` tables.
//!
//! Zones are stored one row per entry with an explicit position so the
//! order cards were added in survives a round trip.

use serde::Deserialize;

use crate::config::{DECKS_TABLE, DECK_CARDS_TABLE};
use crate::connection::Connection;
use crate::error::{CollectionError, Result};
use crate::models::{Deck, DeckCard, DeckUpdate, NewDeck, Zone};
use crate::sql_builder::{IntoParam, SqlBuilder};

#[derive(Debug, Deserialize)]
struct ZoneRow {
    deck_id: String,
    zone: String,
    card_id: String,
    quantity: u32,
}

/// Query interface for decks.
pub struct DeckQuery<'a> {
    conn: &'a Connection,
}

impl<'a> DeckQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All decks of `owner`, most recently updated first.
    pub fn list(&self, owner: &str) -> Result<Vec<Deck>> {
        let (sql, params) = SqlBuilder::new(DECKS_TABLE)
            .where_eq("user_id", owner)
            .order_by(&["updated_at DESC", "name ASC"])
            .build();
        let mut decks: Vec<Deck> = self.conn.execute_into(&sql, &params)?;
        self.attach_zones(&mut decks)?;
        Ok(decks)
    }

    pub fn get(&self, deck_id: &str) -> Result<Option<Deck>> {
        let (sql, params) = SqlBuilder::new(DECKS_TABLE)
            .where_eq("id", deck_id)
            .limit(1)
            .build();
        let mut decks: Vec<Deck> = self.conn.execute_into(&sql, &params)?;
        self.attach_zones(&mut decks)?;
        Ok(decks.into_iter().next())
    }

    pub fn create(&self, owner: &str, deck: &NewDeck) -> Result<Deck> {
        let deck_id = self.conn.transaction(|conn| {
            let id = conn
                .execute_scalar(
                    &format!(
                        "INSERT INTO {} (id, user_id, name, description, is_public, created_at, updated_at) \
                         VALUES (CAST(gen_random_uuid() AS VARCHAR), ?, ?, ?, ?, \
                                 CAST(current_timestamp AS VARCHAR), CAST(current_timestamp AS VARCHAR)) \
                         RETURNING id",
                        DECKS_TABLE
                    ),
                    &[
                        owner.into_param(),
                        deck.name.as_str().into_param(),
                        deck.description.as_deref().into_param(),
                        deck.is_public.into_param(),
                    ],
                )?
                .and_then(|v| v.as_str().map(str::to_string))
                .ok_or_else(|| CollectionError::NotFound("inserted deck id".into()))?;
            for zone in Zone::ALL {
                insert_zone(conn, &id, zone, deck.zone(zone))?;
            }
            Ok(id)
        })?;
        tracing::info!(owner, deck.id = %deck_id, "created deck");
        self.require(&deck_id)
    }

    /// Replace name, description and every zone of a deck.
    pub fn update(&self, deck_id: &str, update: &DeckUpdate) -> Result<Deck> {
        self.conn.transaction(|conn| {
            let changed = conn.execute_update(
                &format!(
                    "UPDATE {} SET name = ?, description = ?, \
                     updated_at = CAST(current_timestamp AS VARCHAR) WHERE id = ?",
                    DECKS_TABLE
                ),
                &[
                    update.name.as_str().into_param(),
                    update.description.as_deref().into_param(),
                    deck_id.into_param(),
                ],
            )?;
            if changed == 0 {
                return Err(CollectionError::NotFound(format!("Deck {}", deck_id)));
            }
            conn.execute_update(
                &format!("DELETE FROM {} WHERE deck_id = ?", DECK_CARDS_TABLE),
                &[deck_id.into_param()],
            )?;
            for zone in Zone::ALL {
                insert_zone(conn, deck_id, zone, update.zone(zone))?;
            }
            Ok(())
        })?;
        self.require(deck_id)
    }

    pub fn delete(&self, deck_id: &str) -> Result<()> {
        self.conn.transaction(|conn| {
            conn.execute_update(
                &format!("DELETE FROM {} WHERE deck_id = ?", DECK_CARDS_TABLE),
                &[deck_id.into_param()],
            )?;
            let changed = conn.execute_update(
                &format!("DELETE FROM {} WHERE id = ?", DECKS_TABLE),
                &[deck_id.into_param()],
            )?;
            if changed == 0 {
                return Err(CollectionError::NotFound(format!("Deck {}", deck_id)));
            }
            Ok(())
        })?;
        tracing::info!(deck.id = %deck_id, "deleted deck");
        Ok(())
    }

    /// Store a deck under its existing id, replacing any local copy.
    ///
    /// Used when mirroring decks saved to the remote backend.
    pub fn upsert(&self, deck: &Deck) -> Result<()> {
        self.conn.transaction(|conn| {
            delete_rows(conn, &deck.id)?;
            insert_full(conn, deck)
        })
    }

    /// Replace every deck `owner` has with `decks`.
    pub fn replace_all(&self, owner: &str, decks: &[Deck]) -> Result<usize> {
        self.conn.transaction(|conn| {
            conn.execute_update(
                &format!(
                    "DELETE FROM {} WHERE deck_id IN (SELECT id FROM {} WHERE user_id = ?)",
                    DECK_CARDS_TABLE, DECKS_TABLE
                ),
                &[owner.into_param()],
            )?;
            conn.execute_update(
                &format!("DELETE FROM {} WHERE user_id = ?", DECKS_TABLE),
                &[owner.into_param()],
            )?;
            for deck in decks {
                delete_rows(conn, &deck.id)?;
                insert_full(conn, deck)?;
            }
            Ok(decks.len())
        })
    }

    fn require(&self, deck_id: &str) -> Result<Deck> {
        self.get(deck_id)?
            .ok_or_else(|| CollectionError::NotFound(format!("Deck {}", deck_id)))
    }

    fn attach_zones(&self, decks: &mut [Deck]) -> Result<()> {
        if decks.is_empty() {
            return Ok(());
        }
        let ids: Vec<&str> = decks.iter().map(|d| d.id.as_str()).collect();
        let (sql, params) = SqlBuilder::new(DECK_CARDS_TABLE)
            .select(&["deck_id", "zone", "card_id", "quantity"])
            .where_in("deck_id", &ids)
            .order_by(&["deck_id", "zone", "position"])
            .build();
        let rows: Vec<ZoneRow> = self.conn.execute_into(&sql, &params)?;

        for row in rows {
            let Some(zone) = Zone::parse(&row.zone) else {
                tracing::warn!(deck.id = %row.deck_id, zone = %row.zone, "skipping unknown zone");
                continue;
            };
            if let Some(deck) = decks.iter_mut().find(|d| d.id == row.deck_id) {
                let entry = DeckCard::new(row.card_id, row.quantity);
                match zone {
                    Zone::Main => deck.main_deck.push(entry),
                    Zone::Extra => deck.extra_deck.push(entry),
                    Zone::Side => deck.side_deck.push(entry),
                }
            }
        }
        Ok(())
    }
}

fn delete_rows(conn: &Connection, deck_id: &str) -> Result<()> {
    conn.execute_update(
        &format!("DELETE FROM {} WHERE deck_id = ?", DECK_CARDS_TABLE),
        &[deck_id.into_param()],
    )?;
    conn.execute_update(
        &format!("DELETE FROM {} WHERE id = ?", DECKS_TABLE),
        &[deck_id.into_param()],
    )?;
    Ok(())
}

/// Insert a deck row with its own id and timestamps, plus its zones.
fn insert_full(conn: &Connection, deck: &Deck) -> Result<()> {
    conn.execute_update(
        &format!(
            "INSERT INTO {} (id, user_id, name, description, is_public, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            DECKS_TABLE
        ),
        &[
            deck.id.as_str().into_param(),
            deck.user_id.as_str().into_param(),
            deck.name.as_str().into_param(),
            deck.description.as_deref().into_param(),
            deck.is_public.into_param(),
            deck.created_at.as_deref().into_param(),
            deck.updated_at.as_deref().into_param(),
        ],
    )?;
    for zone in Zone::ALL {
        insert_zone(conn, &deck.id, zone, deck.zone(zone))?;
    }
    Ok(())
}

fn insert_zone(conn: &Connection, deck_id: &str, zone: Zone, cards: &[DeckCard]) -> Result<()> {
    let sql = format!(
        "INSERT INTO {} (deck_id, zone, position, card_id, quantity) VALUES (?, ?, ?, ?, ?)",
        DECK_CARDS_TABLE
    );
    for (position, entry) in cards.iter().enumerate() {
        conn.execute_update(
            &sql,
            &[
                deck_id.into_param(),
                zone.as_str().into_param(),
                (position as i64).into_param(),
                entry.card_id.as_str().into_param(),
                entry.quantity.into_param(),
            ],
        )?;
    }
    Ok(())
}
