//! Trading-card collection SDK for Rust.
//!
//! Keeps a user's owned cards and decks in a local DuckDB database,
//! filters and sorts the catalog in memory, and edits decks against the
//! format's composition rules. A hosted PostgREST backend can be attached
//! as the source of truth; its data is mirrored locally and snapshotted to
//! disk for offline use.
//!
//! # Quick start
//!
//! ```no_run
//! use ygo_collection::catalog::{CardFilters, SortBy, SortDirection};
//! use ygo_collection::models::{NewDeck, Zone};
//! use ygo_collection::CollectionSdk;
//!
//! let sdk = CollectionSdk::builder().build().unwrap();
//!
//! // Browse the collection
//! let dragons = sdk
//!     .view("user-1", &CardFilters::new().search("dragon"), SortBy::Atk, SortDirection::Desc)
//!     .unwrap();
//!
//! // Build a deck
//! let deck = sdk.create_deck("user-1", &NewDeck::named("Dragons")).unwrap();
//! let mut session = sdk.open_builder(&deck.id).unwrap();
//! session.add(&dragons[0].id, Zone::Main).unwrap();
//! sdk.save(&mut session).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod deck;
pub mod error;
pub mod models;
pub mod queries;
pub mod remote;
pub mod sql_builder;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncCollectionSdk;
pub use cache::{Snapshot, SnapshotCache};
pub use connection::Connection;
pub use deck::{DeckSession, Rejection};
pub use error::{CollectionError, Result};
pub use remote::{RemoteConfig, RestClient};
pub use sql_builder::SqlBuilder;
pub use store::{CatalogReader, DeckWriter};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog::{CardFilters, CollectionStats, SortBy, SortDirection};
use models::{Card, Deck, NewDeck};

// ---------------------------------------------------------------------------
// CollectionSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CollectionSdk`] instance.
pub struct CollectionSdkBuilder {
    data_dir: Option<PathBuf>,
    in_memory: bool,
    offline: bool,
    timeout: Duration,
    remote: Option<RemoteConfig>,
}

impl Default for CollectionSdkBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            in_memory: false,
            offline: false,
            timeout: Duration::from_secs(30),
            remote: None,
        }
    }
}

impl CollectionSdkBuilder {
    /// Set the directory holding the database and snapshots.
    ///
    /// Defaults to the platform data directory (e.g.
    /// `~/.local/share/ygo-collection` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep the database in memory. Snapshots are still written to the data dir.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Never contact the remote backend, even if one is configured.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for remote requests. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn remote(mut self, config: RemoteConfig) -> Self {
        self.remote = Some(config);
        self
    }

    /// Attach the remote backend described by the environment.
    ///
    /// See [`RemoteConfig::from_env`].
    pub fn remote_from_env(self) -> Result<Self> {
        Ok(self.remote(RemoteConfig::from_env()?))
    }

    pub fn build(self) -> Result<CollectionSdk> {
        let dir = self.data_dir.unwrap_or_else(config::default_data_dir);
        let conn = if self.in_memory {
            Connection::open_in_memory()?
        } else {
            Connection::open(&dir.join(config::DATABASE_FILE))?
        };
        let snapshots = SnapshotCache::new(dir.join(config::SNAPSHOT_DIR))?;

        let remote = match self.remote {
            Some(mut cfg) if !self.offline => {
                cfg.timeout = self.timeout;
                Some(RestClient::new(cfg)?)
            }
            _ => None,
        };

        Ok(CollectionSdk {
            conn,
            snapshots,
            remote,
            offline: self.offline,
        })
    }
}

// ---------------------------------------------------------------------------
// CollectionSdk
// ---------------------------------------------------------------------------

/// Where a [`CollectionSdk::sync`] got its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    Remote,
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub source: SyncSource,
    pub cards: usize,
    pub decks: usize,
}

/// The main entry point.
///
/// Owns the local [`Connection`], the [`SnapshotCache`] and, when configured
/// and not offline, a [`RestClient`]. Query interfaces are lightweight
/// wrappers borrowing the connection.
pub struct CollectionSdk {
    conn: Connection,
    snapshots: SnapshotCache,
    remote: Option<RestClient>,
    offline: bool,
}

impl CollectionSdk {
    pub fn builder() -> CollectionSdkBuilder {
        CollectionSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    pub fn cards(&self) -> queries::CardQuery<'_> {
        queries::CardQuery::new(&self.conn)
    }

    pub fn decks(&self) -> queries::DeckQuery<'_> {
        queries::DeckQuery::new(&self.conn)
    }

    pub fn snapshots(&self) -> &SnapshotCache {
        &self.snapshots
    }

    pub fn remote(&self) -> Option<&RestClient> {
        self.remote.as_ref()
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    // -- Catalog -----------------------------------------------------------

    /// Every card `owner` owns in the local store.
    pub fn catalog(&self, owner: &str) -> Result<Vec<Card>> {
        self.conn.owned_cards(owner)
    }

    /// The card list view: `owner`'s cards filtered and sorted.
    pub fn view(
        &self,
        owner: &str,
        filters: &CardFilters,
        by: SortBy,
        direction: SortDirection,
    ) -> Result<Vec<Card>> {
        Ok(catalog::view(&self.catalog(owner)?, filters, by, direction))
    }

    pub fn stats(&self, owner: &str) -> Result<CollectionStats> {
        Ok(CollectionStats::from_cards(&self.catalog(owner)?))
    }

    // -- Decks -------------------------------------------------------------

    /// Create a deck, remotely first when a backend is attached.
    pub fn create_deck(&self, owner: &str, deck: &NewDeck) -> Result<Deck> {
        match &self.remote {
            Some(remote) => {
                let created = remote.create_deck(owner, deck)?;
                self.decks().upsert(&created)?;
                Ok(created)
            }
            None => self.conn.create_deck(owner, deck),
        }
    }

    pub fn delete_deck(&self, deck_id: &str) -> Result<()> {
        if let Some(remote) = &self.remote {
            remote.delete_deck(deck_id)?;
        }
        self.conn.delete_deck(deck_id)
    }

    /// Open the deck builder on a locally stored deck.
    pub fn open_builder(&self, deck_id: &str) -> Result<DeckSession> {
        DeckSession::load(&self.conn, deck_id)
    }

    /// Save a deck builder session.
    ///
    /// With a backend attached the remote copy is written first and the
    /// stored result mirrored locally. On failure the session keeps its edits.
    ///
    /// Once the remote write succeeds the save counts as done: a failed local
    /// mirror is only logged, and the next [`sync`](Self::sync) repairs it.
    pub fn save(&self, session: &mut DeckSession) -> Result<Deck> {
        match &self.remote {
            Some(remote) => self.save_mirrored(session, remote),
            None => session.save(&self.conn),
        }
    }

    fn save_mirrored<W: DeckWriter + ?Sized>(&self, session: &mut DeckSession, writer: &W) -> Result<Deck> {
        let deck = session.save(writer)?;
        if let Err(e) = self.decks().upsert(&deck) {
            tracing::warn!(deck.id = %deck.id, error = %e, "deck saved remotely but local mirror failed");
        }
        Ok(deck)
    }

    // -- Sync --------------------------------------------------------------

    /// Refresh the local store for `owner`.
    ///
    /// Online, the remote cards and decks replace the local ones and a
    /// snapshot is written. Offline or without a backend, the last snapshot
    /// is restored instead.
    pub fn sync(&self, owner: &str) -> Result<SyncReport> {
        let (snapshot, source) = match &self.remote {
            Some(remote) => {
                let snapshot = Snapshot::new(owner, remote.owned_cards(owner)?, remote.decks(owner)?);
                self.snapshots.store(&snapshot)?;
                (snapshot, SyncSource::Remote)
            }
            None => {
                let snapshot = self.snapshots.load(owner)?.ok_or_else(|| {
                    CollectionError::NotFound(format!("No snapshot for '{}' and no remote backend", owner))
                })?;
                (snapshot, SyncSource::Snapshot)
            }
        };

        let cards = self.cards().replace_all(owner, &snapshot.cards)?;
        let decks = self.decks().replace_all(owner, &snapshot.decks)?;
        tracing::info!(owner, ?source, cards, decks, "synced collection");
        Ok(SyncReport {
            source,
            cards,
            decks,
        })
    }

    /// Write a snapshot of the local store for `owner`.
    pub fn snapshot(&self, owner: &str) -> Result<PathBuf> {
        let snapshot = Snapshot::new(owner, self.catalog(owner)?, self.conn.decks(owner)?);
        self.snapshots.store(&snapshot)
    }

    // -- Utility -----------------------------------------------------------

    /// Execute a raw SQL query against the local database.
    pub fn sql(
        &self,
        query: &str,
        params: &[duckdb::types::Value],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CollectionSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let db = self
            .conn
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        let remote = self
            .remote
            .as_ref()
            .map(|r| r.config().base_url.as_str())
            .unwrap_or("none");
        write!(
            f,
            "CollectionSdk(db={}, snapshots={}, remote={}, offline={})",
            db,
            self.snapshots.dir.display(),
            remote,
            self.offline
        )
    }
}
