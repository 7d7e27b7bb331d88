//! Blocking client for the hosted PostgREST backend.
//!
//! Ownership lives in `user_cards` (one row per owned card, with the catalog
//! entry embedded from `Cartas`), decks in `decks` with their zones embedded
//! as JSON arrays. Every request carries the
//! project key in `apikey` and a bearer token; writes ask for the stored row
//! back with `Prefer: return=representation`.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config;
use crate::error::{CollectionError, Result};
use crate::models::{Card, CardRecord, CardType, Deck, DeckCard, DeckUpdate, NewDeck};
use crate::store::{CatalogReader, DeckWriter};

// ---------------------------------------------------------------------------
// RemoteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub base_url: String,
    /// Public project key sent as `apikey`.
    pub api_key: String,
    /// User access token. Falls back to the project key when absent.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Read the endpoint from `YGO_COLLECTION_URL`, `YGO_COLLECTION_KEY` and
    /// the optional `YGO_COLLECTION_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let url = read(config::URL_ENV)
            .ok_or_else(|| CollectionError::InvalidArgument(format!("{} is not set", config::URL_ENV)))?;
        let key = read(config::KEY_ENV)
            .ok_or_else(|| CollectionError::InvalidArgument(format!("{} is not set", config::KEY_ENV)))?;
        let mut cfg = Self::new(url, key);
        cfg.access_token = read(config::TOKEN_ENV);
        Ok(cfg)
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

/// Total row count from a `Content-Range` header such as `0-47/120` or `*/0`.
pub fn parse_content_range(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

// ---------------------------------------------------------------------------
// Wire rows
// ---------------------------------------------------------------------------

/// Ownership columns plus the embedded catalog entry.
const USER_CARD_SELECT: &str = "cantidad,created_at,updated_at,Cartas(*)";

/// One `user_cards` row as the backend returns it.
#[derive(Debug, Deserialize)]
struct UserCardRow {
    cantidad: Option<u32>,
    created_at: Option<String>,
    updated_at: Option<String>,
    #[serde(rename = "Cartas")]
    card: Option<CartaRow>,
}

/// Columns of the shared `Cartas` catalog table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CartaRow {
    #[serde(rename = "ID_Carta")]
    card_id: Option<Json>,
    id: Option<Json>,
    #[serde(rename = "Nombre")]
    name: Option<String>,
    #[serde(rename = "Imagen")]
    image_url: Option<String>,
    #[serde(rename = "Marco_Carta")]
    frame: Option<String>,
    #[serde(rename = "Tipo")]
    monster_type: Option<String>,
    #[serde(rename = "Atributo")]
    attribute: Option<String>,
    #[serde(rename = "Nivel_Rank_Link")]
    level_rank_link: Option<u32>,
    #[serde(rename = "ATK")]
    atk: Option<i32>,
    #[serde(rename = "DEF")]
    def: Option<i32>,
    #[serde(rename = "Descripcion")]
    description: Option<String>,
    #[serde(rename = "Rareza")]
    rarity: Option<String>,
    #[serde(rename = "Set_Expansion")]
    set_name: Option<String>,
    set_code: Option<String>,
    #[serde(rename = "Icono Carta")]
    card_icon: Option<String>,
    #[serde(rename = "Subtipo")]
    subtype: Option<String>,
    #[serde(rename = "Clasificacion")]
    classification: Option<String>,
    escala_pendulo: Option<u32>,
}

/// Catalog ids arrive as numbers or strings.
fn id_text(value: Option<&Json>) -> Option<String> {
    let text = match value? {
        Json::String(s) => s.clone(),
        Json::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

impl UserCardRow {
    /// Flatten into a card record owned by `owner`.
    ///
    /// Rows whose catalog entry did not embed yield `None`.
    fn into_record(self, owner: &str) -> Option<CardRecord> {
        let card = self.card?;
        let id = id_text(card.card_id.as_ref())
            .or_else(|| id_text(card.id.as_ref()))
            .unwrap_or_default();
        Some(CardRecord {
            id,
            user_id: owner.to_string(),
            name: card.name.unwrap_or_default(),
            image_url: card.image_url,
            card_type: card
                .frame
                .as_deref()
                .and_then(CardType::parse)
                .unwrap_or_default(),
            monster_type: card.monster_type,
            attribute: card.attribute,
            level_rank_link: card.level_rank_link,
            link_rating: None,
            pendulum_scale: card.escala_pendulo,
            atk: card.atk,
            def: card.def,
            description: card.description,
            rarity: card.rarity,
            set_name: card.set_name,
            set_code: card.set_code,
            quantity: self.cantidad.filter(|&q| q > 0).unwrap_or(1),
            card_icon: card.card_icon,
            subtype: card.subtype,
            classification: card.classification,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_cards(rows: Vec<UserCardRow>, owner: &str) -> Vec<Card> {
    let total = rows.len();
    let cards: Vec<Card> = rows
        .into_iter()
        .filter_map(|row| row.into_record(owner))
        .map(Card::from)
        .collect();
    if cards.len() < total {
        tracing::debug!(owner, skipped = total - cards.len(), "user_cards rows without a catalog entry");
    }
    cards
}

// ---------------------------------------------------------------------------
// RestClient
// ---------------------------------------------------------------------------

/// Row shape for creating a deck: the new deck plus its owner.
#[derive(Serialize)]
struct DeckInsert<'a> {
    user_id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    main_deck: &'a [DeckCard],
    extra_deck: &'a [DeckCard],
    side_deck: &'a [DeckCard],
    is_public: bool,
}

pub struct RestClient {
    config: RemoteConfig,
    client: Client,
}

impl RestClient {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&config.api_key)?);
        let token = config.access_token.as_deref().unwrap_or(&config.api_key);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn get(&self, table: &str) -> RequestBuilder {
        self.client.get(self.config.table_url(table))
    }

    /// One page of `owner`'s cards, newest first. Pages are zero-based.
    pub fn cards_page(&self, owner: &str, page: usize) -> Result<Vec<Card>> {
        let offset = page * config::CARDS_PER_PAGE;
        let req = self.get(config::CARDS_TABLE).query(&[
            ("select", USER_CARD_SELECT.to_string()),
            ("user_id", format!("eq.{}", owner)),
            ("order", "created_at.desc".to_string()),
            ("offset", offset.to_string()),
            ("limit", config::CARDS_PER_PAGE.to_string()),
        ]);
        Ok(into_cards(fetch_json(req)?, owner))
    }

    /// Distinct cards `owner` has, from the exact count the backend reports.
    pub fn count_cards(&self, owner: &str) -> Result<usize> {
        let resp = send(
            self.get(config::CARDS_TABLE)
                .header("Prefer", "count=exact")
                .query(&[
                    ("select", "id".to_string()),
                    ("user_id", format!("eq.{}", owner)),
                    ("limit", "1".to_string()),
                ]),
        )?;
        resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| CollectionError::Remote {
                status: resp.status().as_u16(),
                message: "missing Content-Range count".into(),
            })
    }
}

impl CatalogReader for RestClient {
    fn owned_cards(&self, owner: &str) -> Result<Vec<Card>> {
        let req = self.get(config::CARDS_TABLE).query(&[
            ("select", USER_CARD_SELECT.to_string()),
            ("user_id", format!("eq.{}", owner)),
            ("order", "created_at.desc".to_string()),
        ]);
        let cards = into_cards(fetch_json(req)?, owner);
        tracing::debug!(owner, cards = cards.len(), "fetched remote cards");
        Ok(cards)
    }

    fn deck(&self, deck_id: &str) -> Result<Option<Deck>> {
        let req = self.get(config::DECKS_TABLE).query(&[
            ("select", "*".to_string()),
            ("id", format!("eq.{}", deck_id)),
        ]);
        let decks: Vec<Deck> = fetch_json(req)?;
        Ok(decks.into_iter().next())
    }

    fn decks(&self, owner: &str) -> Result<Vec<Deck>> {
        let req = self.get(config::DECKS_TABLE).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", owner)),
            ("order", "updated_at.desc".to_string()),
        ]);
        fetch_json(req)
    }
}

impl DeckWriter for RestClient {
    fn create_deck(&self, owner: &str, deck: &NewDeck) -> Result<Deck> {
        let body = DeckInsert {
            user_id: owner,
            name: &deck.name,
            description: deck.description.as_deref(),
            main_deck: &deck.main_deck,
            extra_deck: &deck.extra_deck,
            side_deck: &deck.side_deck,
            is_public: deck.is_public,
        };
        let req = self
            .client
            .post(self.config.table_url(config::DECKS_TABLE))
            .header("Prefer", "return=representation")
            .json(&body);
        let created: Vec<Deck> = fetch_json(req)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::Remote {
                status: 201,
                message: "insert returned no rows".into(),
            })
    }

    fn update_deck(&self, deck_id: &str, update: &DeckUpdate) -> Result<Deck> {
        let req = self
            .client
            .patch(self.config.table_url(config::DECKS_TABLE))
            .query(&[("id", format!("eq.{}", deck_id))])
            .header("Prefer", "return=representation")
            .json(update);
        let updated: Vec<Deck> = fetch_json(req)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::NotFound(format!("Deck {}", deck_id)))
    }

    fn delete_deck(&self, deck_id: &str) -> Result<()> {
        send(
            self.client
                .delete(self.config.table_url(config::DECKS_TABLE))
                .query(&[("id", format!("eq.{}", deck_id))]),
        )?;
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| CollectionError::InvalidArgument(format!("invalid header value: {}", e)))
}

/// Send and turn non-2xx responses into [`CollectionError::Remote`].
fn send(req: RequestBuilder) -> Result<Response> {
    let resp = req.send()?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %message, "remote request failed");
    Err(CollectionError::Remote {
        status: status.as_u16(),
        message,
    })
}

fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    Ok(send(req)?.json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range("0-47/120"), Some(120));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-0/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn table_url_strips_trailing_slash() {
        let cfg = RemoteConfig::new("https://example.test/", "key");
        assert_eq!(cfg.table_url("decks"), "https://example.test/rest/v1/decks");
        assert!(cfg.access_token.is_none());
        assert_eq!(cfg.with_token("t").access_token.as_deref(), Some("t"));
    }

    #[test]
    fn user_card_rows_flatten_embedded_catalog_entry() {
        let rows: Vec<UserCardRow> = serde_json::from_value(serde_json::json!([
            {
                "cantidad": 2,
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-02T10:00:00Z",
                "Cartas": {
                    "ID_Carta": 89631139,
                    "Nombre": "Blue-Eyes White Dragon",
                    "Imagen": "https://img.test/89631139.jpg",
                    "Marco_Carta": "Monster",
                    "Tipo": "Dragon",
                    "Atributo": "LIGHT",
                    "Nivel_Rank_Link": 8,
                    "ATK": 3000,
                    "DEF": 2500,
                    "Rareza": "Ultra Rare",
                    "Set_Expansion": "Legend of Blue Eyes",
                    "set_code": "LOB-001",
                    "Subtipo": null,
                    "Clasificacion": "Normal",
                    "escala_pendulo": null,
                    "price": 12.5
                }
            },
            {
                "cantidad": null,
                "created_at": null,
                "updated_at": null,
                "Cartas": {
                    "id": "mst",
                    "Nombre": "Mystical Space Typhoon",
                    "Marco_Carta": "Spell",
                    "Icono Carta": "Quick-Play"
                }
            },
            {
                "cantidad": 1,
                "Cartas": { "ID_Carta": "", "id": 16178681, "Nombre": "Odd-Eyes", "Subtipo": "Pendulum", "escala_pendulo": 4 }
            },
            { "cantidad": 1, "Cartas": null }
        ]))
        .unwrap();

        let cards = into_cards(rows, "u1");
        assert_eq!(cards.len(), 3);

        let blue = &cards[0];
        assert_eq!(blue.id, "89631139");
        assert_eq!(blue.user_id, "u1");
        assert_eq!(blue.quantity, 2);
        assert_eq!(blue.atk(), Some(3000));
        assert_eq!(blue.monster().unwrap().level(), Some(8));
        assert_eq!(blue.set_code.as_deref(), Some("LOB-001"));
        assert_eq!(blue.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));

        let mst = &cards[1];
        assert_eq!(mst.id, "mst");
        assert_eq!(mst.quantity, 1);
        assert_eq!(mst.card_type(), CardType::Spell);
        assert_eq!(mst.icon(), Some("Quick-Play"));

        // Missing frame falls back to Monster; empty ID_Carta falls back to id.
        let odd = &cards[2];
        assert_eq!(odd.id, "16178681");
        assert!(odd.is_pendulum());
        assert_eq!(odd.monster().unwrap().pendulum_scale, Some(4));
    }

    #[test]
    fn client_builds_without_network() {
        let client = RestClient::new(RemoteConfig::new("http://localhost:1", "anon")).unwrap();
        assert_eq!(client.config().api_key, "anon");
    }

    #[test]
    fn deck_insert_carries_owner_and_zones() {
        let deck = NewDeck {
            main_deck: vec![DeckCard::new("a", 2)],
            ..NewDeck::named("Blue")
        };
        let body = DeckInsert {
            user_id: "u1",
            name: &deck.name,
            description: None,
            main_deck: &deck.main_deck,
            extra_deck: &deck.extra_deck,
            side_deck: &deck.side_deck,
            is_public: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["main_deck"][0]["quantity"], 2);
        assert!(json.get("description").is_none());
    }
}
