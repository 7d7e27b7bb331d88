//! Integration tests for the CollectionSdk facade.

mod common;

use common::{sample_cards, setup_sdk, OWNER};
use ygo_collection::catalog::{CardFilters, Facet, SortBy, SortDirection};
use ygo_collection::models::{DeckCard, NewDeck, Zone};
use ygo_collection::remote::RemoteConfig;
use ygo_collection::{CollectionError, CollectionSdk};
use ygo_collection::SyncSource;

#[test]
fn builder_creates_database_and_snapshot_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let sdk = CollectionSdk::builder().data_dir(tmp.path()).build().unwrap();

    assert!(tmp.path().join("snapshots").is_dir());
    assert!(sdk.connection().path().is_some());
    assert!(sdk.remote().is_none());
    assert!(sdk.to_string().contains("remote=none"));
}

#[test]
fn offline_ignores_configured_remote() {
    let tmp = tempfile::tempdir().unwrap();
    let sdk = CollectionSdk::builder()
        .data_dir(tmp.path())
        .in_memory(true)
        .offline(true)
        .remote(RemoteConfig::new("http://localhost:1", "anon"))
        .build()
        .unwrap();
    assert!(sdk.remote().is_none());
    assert!(sdk.is_offline());
    let shown = sdk.to_string();
    assert!(shown.contains("db=:memory:"));
    assert!(shown.contains("offline=true"));
}

#[test]
fn view_filters_and_sorts_owned_cards() {
    let (sdk, _tmp) = setup_sdk();
    let mut filters = CardFilters::new();
    filters.toggle(Facet::Attribute, "LIGHT");
    let cards = sdk
        .view(OWNER, &filters, SortBy::Atk, SortDirection::Desc)
        .unwrap();
    let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["ultimate", "blue-eyes", "utopia", "decode"]);
}

#[test]
fn build_and_save_a_deck() {
    let (sdk, _tmp) = setup_sdk();
    let deck = sdk.create_deck(OWNER, &NewDeck::named("Blue-Eyes")).unwrap();

    let mut session = sdk.open_builder(&deck.id).unwrap();
    session.add("blue-eyes", Zone::Main).unwrap();
    session.add("blue-eyes", Zone::Main).unwrap();
    session.add("ultimate", Zone::Main).unwrap();
    session.add("ash", Zone::Side).unwrap();
    let saved = sdk.save(&mut session).unwrap();
    assert!(!session.is_dirty());

    assert_eq!(saved.main_deck, vec![DeckCard::new("blue-eyes", 2)]);
    assert_eq!(saved.extra_deck, vec![DeckCard::new("ultimate", 1)]);

    let reopened = sdk.open_builder(&deck.id).unwrap();
    assert_eq!(reopened.counts()[0], (Zone::Main, 2, 60));
    assert_eq!(reopened.zones(), session.zones());
}

#[test]
fn delete_deck_removes_it_locally() {
    let (sdk, _tmp) = setup_sdk();
    let deck = sdk.create_deck(OWNER, &NewDeck::named("Gone")).unwrap();
    sdk.delete_deck(&deck.id).unwrap();
    assert!(matches!(
        sdk.open_builder(&deck.id),
        Err(CollectionError::NotFound(_))
    ));
}

#[test]
fn sync_without_snapshot_or_remote_fails() {
    let (sdk, _tmp) = setup_sdk();
    assert!(matches!(sdk.sync(OWNER), Err(CollectionError::NotFound(_))));
    // The local store is left alone.
    assert_eq!(sdk.catalog(OWNER).unwrap().len(), 10);
}

#[test]
fn snapshot_restores_into_a_fresh_store() {
    let (sdk, tmp) = setup_sdk();
    let deck = sdk
        .create_deck(
            OWNER,
            &NewDeck {
                main_deck: vec![DeckCard::new("pot", 1)],
                ..NewDeck::named("Snapshotted")
            },
        )
        .unwrap();
    let path = sdk.snapshot(OWNER).unwrap();
    assert!(path.starts_with(tmp.path()));

    let fresh = CollectionSdk::builder()
        .data_dir(tmp.path())
        .in_memory(true)
        .offline(true)
        .build()
        .unwrap();
    assert!(fresh.catalog(OWNER).unwrap().is_empty());

    let report = fresh.sync(OWNER).unwrap();
    assert_eq!(report.source, SyncSource::Snapshot);
    assert_eq!(report.cards, sample_cards().len());
    assert_eq!(report.decks, 1);

    let restored = fresh.decks().get(&deck.id).unwrap().unwrap();
    assert_eq!(restored.main_deck, vec![DeckCard::new("pot", 1)]);
    assert_eq!(fresh.stats(OWNER).unwrap(), sdk.stats(OWNER).unwrap());
}

#[test]
fn sql_runs_raw_queries() {
    let (sdk, _tmp) = setup_sdk();
    let rows = sdk
        .sql(
            "SELECT CAST(SUM(quantity) AS BIGINT) AS owned FROM user_cards WHERE user_id = ?",
            &[duckdb::types::Value::Text(OWNER.into())],
        )
        .unwrap();
    assert_eq!(rows[0]["owned"], serde_json::json!(19));
}

#[cfg(feature = "async")]
mod async_sdk {
    use super::*;
    use ygo_collection::AsyncCollectionSdk;

    #[tokio::test]
    async fn async_session_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let sdk = AsyncCollectionSdk::builder()
            .data_dir(tmp.path())
            .in_memory(true)
            .offline(true)
            .build()
            .await
            .unwrap();

        let deck = sdk
            .run(|s| {
                s.cards().import(OWNER, &sample_cards())?;
                s.create_deck(OWNER, &NewDeck::named("Async"))
            })
            .await
            .unwrap();

        let mut session = sdk.load(&deck.id).await.unwrap();
        session.add("mirror-force", Zone::Main).unwrap();
        let (session, saved) = sdk.save(session).await.unwrap();
        assert!(!session.is_dirty());
        assert_eq!(saved.unwrap().main_deck, vec![DeckCard::new("mirror-force", 1)]);

        assert_eq!(sdk.stats(OWNER).await.unwrap().traps, 1);
        sdk.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_async_save_returns_the_edited_session() {
        let tmp = tempfile::tempdir().unwrap();
        let sdk = AsyncCollectionSdk::builder()
            .data_dir(tmp.path())
            .in_memory(true)
            .offline(true)
            .build()
            .await
            .unwrap();
        let deck = sdk
            .run(|s| {
                s.cards().import(OWNER, &sample_cards())?;
                s.create_deck(OWNER, &NewDeck::named("Doomed"))
            })
            .await
            .unwrap();

        let mut session = sdk.load(&deck.id).await.unwrap();
        session.add("pot", Zone::Main).unwrap();
        let id = deck.id.clone();
        sdk.run(move |s| s.delete_deck(&id)).await.unwrap();

        let (session, saved) = sdk.save(session).await.unwrap();
        assert!(saved.is_err());
        assert!(session.is_dirty());
        assert_eq!(session.counts()[0].1, 1);
    }
}
