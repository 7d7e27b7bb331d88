//! Async wrapper around [`CollectionSdk`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use ygo_collection::models::Zone;
//! use ygo_collection::AsyncCollectionSdk;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sdk = AsyncCollectionSdk::builder().build().await.unwrap();
//!
//!     let mut session = sdk.load("deck-id").await.unwrap();
//!     session.add("card-id", Zone::Main).unwrap();
//!     let (session, saved) = sdk.save(session).await.unwrap();
//!     saved.unwrap();
//!     assert!(!session.is_dirty());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::CollectionStats;
use crate::deck::DeckSession;
use crate::error::{CollectionError, Result};
use crate::models::{Card, Deck};
use crate::remote::RemoteConfig;
use crate::{CollectionSdk, SyncReport};

fn join_error(e: tokio::task::JoinError) -> CollectionError {
    CollectionError::InvalidArgument(format!("Task join error: {e}"))
}

// ---------------------------------------------------------------------------
// AsyncCollectionSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCollectionSdk`] instance.
#[derive(Default)]
pub struct AsyncCollectionSdkBuilder {
    data_dir: Option<PathBuf>,
    in_memory: bool,
    offline: bool,
    timeout: Option<Duration>,
    remote: Option<RemoteConfig>,
}

impl AsyncCollectionSdkBuilder {
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn remote(mut self, config: RemoteConfig) -> Self {
        self.remote = Some(config);
        self
    }

    /// Build the async SDK on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncCollectionSdk> {
        tokio::task::spawn_blocking(move || {
            let mut builder = CollectionSdk::builder()
                .in_memory(self.in_memory)
                .offline(self.offline);
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(remote) = self.remote {
                builder = builder.remote(remote);
            }
            Ok(AsyncCollectionSdk {
                inner: Arc::new(Mutex::new(builder.build()?)),
            })
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncCollectionSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`CollectionSdk`].
///
/// The underlying SDK is protected by a [`Mutex`]; concurrent calls are
/// serialized, so of two overlapping saves of one deck the later one wins.
#[derive(Clone)]
pub struct AsyncCollectionSdk {
    inner: Arc<Mutex<CollectionSdk>>,
}

impl AsyncCollectionSdk {
    pub fn builder() -> AsyncCollectionSdkBuilder {
        AsyncCollectionSdkBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CollectionSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = sdk
                .lock()
                .map_err(|_| CollectionError::InvalidArgument("SDK lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(join_error)?
    }

    pub async fn catalog(&self, owner: &str) -> Result<Vec<Card>> {
        let owner = owner.to_string();
        self.run(move |s| s.catalog(&owner)).await
    }

    pub async fn stats(&self, owner: &str) -> Result<CollectionStats> {
        let owner = owner.to_string();
        self.run(move |s| s.stats(&owner)).await
    }

    /// Open the deck builder on a stored deck.
    pub async fn load(&self, deck_id: &str) -> Result<DeckSession> {
        let deck_id = deck_id.to_string();
        self.run(move |s| s.open_builder(&deck_id)).await
    }

    /// Save a session and hand it back along with the save result, so a
    /// failed save keeps its unsaved edits.
    ///
    /// The outer error reports a failed blocking task. If that task panicked
    /// the session went down with it and its edits are gone.
    pub async fn save(&self, mut session: DeckSession) -> Result<(DeckSession, Result<Deck>)> {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let result = match sdk.lock() {
                Ok(guard) => guard.save(&mut session),
                Err(_) => Err(CollectionError::InvalidArgument("SDK lock poisoned".into())),
            };
            (session, result)
        })
        .await
        .map_err(join_error)
    }

    pub async fn sync(&self, owner: &str) -> Result<SyncReport> {
        let owner = owner.to_string();
        self.run(move |s| s.sync(&owner)).await
    }

    /// Drop the SDK on the blocking pool, releasing the database and any
    /// HTTP client outside the async context.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || drop(self.inner))
            .await
            .map_err(join_error)
    }
}
