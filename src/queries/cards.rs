//! Card queries against the local `user_cards` table.

use duckdb::types::Value;

use crate::config::{CARDS_PER_PAGE, CARDS_TABLE};
use crate::connection::Connection;
use crate::error::{CollectionError, Result};
use crate::models::{Card, CardRecord};
use crate::sql_builder::{IntoParam, SqlBuilder};

const COLUMNS: [&str; 20] = [
    "user_id",
    "id",
    "name",
    "image_url",
    "card_type",
    "monster_type",
    "attribute",
    "level_rank_link",
    "link_rating",
    "pendulum_scale",
    "atk",
    "def",
    "description",
    "rarity",
    "set_name",
    "set_code",
    "quantity",
    "card_icon",
    "subtype",
    "classification",
];

// ---------------------------------------------------------------------------
// CardQuery
// ---------------------------------------------------------------------------

/// Query interface for the cards one user owns.
pub struct CardQuery<'a> {
    conn: &'a Connection,
}

impl<'a> CardQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // -- Reads -------------------------------------------------------------

    /// Every card `owner` owns, newest first.
    pub fn list(&self, owner: &str) -> Result<Vec<Card>> {
        let (sql, params) = SqlBuilder::new(CARDS_TABLE)
            .where_eq("user_id", owner)
            .order_by(&["created_at DESC", "name ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// One page of `owner`'s cards. Pages are zero-based.
    pub fn page(&self, owner: &str, page: usize) -> Result<Vec<Card>> {
        let (sql, params) = SqlBuilder::new(CARDS_TABLE)
            .where_eq("user_id", owner)
            .order_by(&["created_at DESC", "name ASC"])
            .limit(CARDS_PER_PAGE)
            .offset(page * CARDS_PER_PAGE)
            .build();
        self.conn.execute_into(&sql, &params)
    }

    pub fn get(&self, owner: &str, card_id: &str) -> Result<Option<Card>> {
        let (sql, params) = SqlBuilder::new(CARDS_TABLE)
            .where_eq("user_id", owner)
            .where_eq("id", card_id)
            .limit(1)
            .build();
        Ok(self.conn.execute_into(&sql, &params)?.into_iter().next())
    }

    /// Distinct cards `owner` has.
    pub fn count(&self, owner: &str) -> Result<usize> {
        let (sql, params) = SqlBuilder::new(CARDS_TABLE)
            .select(&["COUNT(*)"])
            .where_eq("user_id", owner)
            .build();
        let value = self.conn.execute_scalar(&sql, &params)?;
        Ok(value.and_then(|v| v.as_u64()).unwrap_or(0) as usize)
    }

    /// Name, description or set name containing `text`, ignoring case.
    pub fn search(&self, owner: &str, text: &str) -> Result<Vec<Card>> {
        let pattern = format!("%{}%", text.trim());
        let (sql, params) = SqlBuilder::new(CARDS_TABLE)
            .where_eq("user_id", owner)
            .where_any_like(&["name", "description", "set_name"], &pattern)
            .order_by(&["name ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    // -- Writes ------------------------------------------------------------

    /// Insert a card, or replace it if `owner` already has one with this id.
    ///
    /// An empty id gets a fresh UUID. The original `created_at` survives a
    /// replace.
    pub fn upsert(&self, owner: &str, card: &Card) -> Result<Card> {
        let record = card.to_record();
        let sql = format!(
            "INSERT INTO {table} ({cols}, created_at, updated_at) \
             VALUES (?, COALESCE(NULLIF(?, ''), CAST(gen_random_uuid() AS VARCHAR)), {placeholders}, \
                     CAST(current_timestamp AS VARCHAR), CAST(current_timestamp AS VARCHAR)) \
             ON CONFLICT (user_id, id) DO UPDATE SET {updates}, updated_at = EXCLUDED.updated_at \
             RETURNING *",
            table = CARDS_TABLE,
            cols = COLUMNS.join(", "),
            placeholders = vec!["?"; COLUMNS.len() - 2].join(", "),
            updates = COLUMNS[2..]
                .iter()
                .map(|c| format!("{c} = EXCLUDED.{c}"))
                .collect::<Vec<_>>()
                .join(", "),
        );
        let rows: Vec<Card> = self.conn.execute_into(&sql, &record_params(owner, &record))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CollectionError::NotFound(format!("Card {}", record.id)))
    }

    /// Upsert many cards in one transaction. Returns how many were written.
    pub fn import(&self, owner: &str, cards: &[Card]) -> Result<usize> {
        let written = self.conn.transaction(|_| {
            for card in cards {
                self.upsert(owner, card)?;
            }
            Ok(cards.len())
        })?;
        tracing::info!(owner, written, "imported cards");
        Ok(written)
    }

    /// Replace every card `owner` has with `cards`.
    pub fn replace_all(&self, owner: &str, cards: &[Card]) -> Result<usize> {
        self.conn.transaction(|conn| {
            conn.execute_update(
                &format!("DELETE FROM {} WHERE user_id = ?", CARDS_TABLE),
                &[owner.into_param()],
            )?;
            for card in cards {
                self.upsert(owner, card)?;
            }
            Ok(cards.len())
        })
    }

    /// Change how many copies of a card `owner` has. Zero is refused; use
    /// [`delete`](Self::delete) instead.
    pub fn set_quantity(&self, owner: &str, card_id: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(CollectionError::InvalidArgument(
                "quantity must be at least 1".into(),
            ));
        }
        let changed = self.conn.execute_update(
            &format!(
                "UPDATE {} SET quantity = ?, updated_at = CAST(current_timestamp AS VARCHAR) \
                 WHERE user_id = ? AND id = ?",
                CARDS_TABLE
            ),
            &[quantity.into_param(), owner.into_param(), card_id.into_param()],
        )?;
        if changed == 0 {
            return Err(CollectionError::NotFound(format!("Card {}", card_id)));
        }
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete(&self, owner: &str, card_id: &str) -> Result<bool> {
        let changed = self.conn.execute_update(
            &format!("DELETE FROM {} WHERE user_id = ? AND id = ?", CARDS_TABLE),
            &[owner.into_param(), card_id.into_param()],
        )?;
        Ok(changed > 0)
    }
}

fn record_params(owner: &str, r: &CardRecord) -> Vec<Value> {
    vec![
        owner.into_param(),
        r.id.as_str().into_param(),
        r.name.as_str().into_param(),
        r.image_url.as_deref().into_param(),
        r.card_type.as_str().into_param(),
        r.monster_type.as_deref().into_param(),
        r.attribute.as_deref().into_param(),
        r.level_rank_link.into_param(),
        r.link_rating.into_param(),
        r.pendulum_scale.into_param(),
        r.atk.map(i64::from).into_param(),
        r.def.map(i64::from).into_param(),
        r.description.as_deref().into_param(),
        r.rarity.as_deref().into_param(),
        r.set_name.as_deref().into_param(),
        r.set_code.as_deref().into_param(),
        r.quantity.into_param(),
        r.card_icon.as_deref().into_param(),
        r.subtype.as_deref().into_param(),
        r.classification.as_deref().into_param(),
    ]
}
