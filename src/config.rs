use std::path::PathBuf;

/// Format rule: at most this many copies of one card across all zones.
pub const COPY_LIMIT: u32 = 3;

/// Cards fetched per page when paging through a collection.
pub const CARDS_PER_PAGE: usize = 48;

pub const MAIN_MIN: u32 = 40;
pub const MAIN_MAX: u32 = 60;
pub const EXTRA_MAX: u32 = 15;
pub const SIDE_MAX: u32 = 15;

pub const DATABASE_FILE: &str = "collection.duckdb";
pub const SNAPSHOT_DIR: &str = "snapshots";

pub const URL_ENV: &str = "YGO_COLLECTION_URL";
pub const KEY_ENV: &str = "YGO_COLLECTION_KEY";
pub const TOKEN_ENV: &str = "YGO_COLLECTION_TOKEN";

/// Remote table names, shared by the local store.
pub const CARDS_TABLE: &str = "user_cards";
pub const DECKS_TABLE: &str = "decks";
pub const DECK_CARDS_TABLE: &str = "deck_cards";

pub fn schema_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {cards} (
            user_id VARCHAR NOT NULL,
            id VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            image_url VARCHAR,
            card_type VARCHAR NOT NULL,
            monster_type VARCHAR,
            attribute VARCHAR,
            level_rank_link INTEGER,
            link_rating INTEGER,
            pendulum_scale INTEGER,
            atk INTEGER,
            def INTEGER,
            description VARCHAR,
            rarity VARCHAR,
            set_name VARCHAR,
            set_code VARCHAR,
            quantity INTEGER NOT NULL DEFAULT 1,
            card_icon VARCHAR,
            subtype VARCHAR,
            classification VARCHAR,
            created_at VARCHAR,
            updated_at VARCHAR,
            PRIMARY KEY (user_id, id)
        );
        CREATE TABLE IF NOT EXISTS {decks} (
            id VARCHAR PRIMARY KEY,
            user_id VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            description VARCHAR,
            is_public BOOLEAN NOT NULL DEFAULT FALSE,
            created_at VARCHAR,
            updated_at VARCHAR
        );
        CREATE TABLE IF NOT EXISTS {deck_cards} (
            deck_id VARCHAR NOT NULL,
            zone VARCHAR NOT NULL,
            position INTEGER NOT NULL,
            card_id VARCHAR NOT NULL,
            quantity INTEGER NOT NULL
        );",
        cards = CARDS_TABLE,
        decks = DECKS_TABLE,
        deck_cards = DECK_CARDS_TABLE,
    )
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("ygo-collection")
    } else {
        PathBuf::from(".ygo-collection")
    }
}
