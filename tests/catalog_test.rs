mod common;

use std::collections::HashSet;

use common::FakeApi;
use songset::{
    Error,
    catalog::{self, CatalogWalker, DedupScope, PERSONAL_CATEGORY, WalkerConfig},
    types::{Category, PlaylistTracks},
};

fn config(limit: usize, dedup: DedupScope) -> WalkerConfig {
    WalkerConfig {
        country: "TW".to_string(),
        market: Some("TW".to_string()),
        limit,
        dedup,
    }
}

#[tokio::test]
async fn test_single_category_walk() {
    let api = FakeApi::default()
        .with_category("abc123", &["pl1", "pl2"])
        .with_playlist("pl1", &[Some("t1"), None, Some("t2")]);

    let walker = CatalogWalker::new(&api, config(1, DedupScope::Playlist)).unwrap();
    let resolved = walker
        .resolve_playlists(&[Category::new("pop", "abc123")])
        .await;

    // One category with exactly one playlist reference
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].category, "pop");
    assert_eq!(resolved[0].playlists.len(), 1);
    assert_eq!(resolved[0].playlists[0].id, "pl1");

    // The null track is dropped
    let collected = walker.collect_track_ids(&resolved).await;
    assert_eq!(
        collected,
        vec![PlaylistTracks {
            category: "pop".to_string(),
            playlist_id: "pl1".to_string(),
            track_ids: vec!["t1".to_string(), "t2".to_string()],
        }]
    );

    // Country and limit are passed through
    let calls = api.calls();
    assert!(calls.contains(&"category abc123 TW 1".to_string()));
    assert!(calls.contains(&"playlist pl1 TW".to_string()));
}

#[tokio::test]
async fn test_failed_category_is_skipped() {
    let api = FakeApi::default()
        .with_category("ok", &["pl1"])
        .with_playlist("pl1", &[Some("t1")]);

    let walker = CatalogWalker::new(&api, config(5, DedupScope::Playlist)).unwrap();
    let resolved = walker
        .resolve_playlists(&[
            Category::new("broken", "missing"),
            Category::new("jazz", "ok"),
        ])
        .await;

    // Only the working category remains, the run goes on
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].category, "jazz");
}

#[tokio::test]
async fn test_empty_category_is_kept() {
    let api = FakeApi::default().with_category("empty", &[]);

    let walker = CatalogWalker::new(&api, WalkerConfig::default()).unwrap();
    let resolved = walker
        .resolve_playlists(&[Category::new("classical", "empty")])
        .await;

    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].playlists.is_empty());
    assert!(walker.collect_track_ids(&resolved).await.is_empty());
}

#[tokio::test]
async fn test_failed_playlist_is_skipped() {
    let api = FakeApi::default()
        .with_category("c1", &["gone", "pl2"])
        .with_playlist("pl2", &[Some("t9")]);

    let walker = CatalogWalker::new(&api, config(5, DedupScope::Playlist)).unwrap();
    let resolved = walker.resolve_playlists(&[Category::new("mood", "c1")]).await;
    let collected = walker.collect_track_ids(&resolved).await;

    // The failing playlist contributes nothing, not even the previous one's tracks
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].playlist_id, "pl2");
    assert_eq!(collected[0].track_ids, vec!["t9".to_string()]);
}

#[tokio::test]
async fn test_dedup_scope() {
    let api = FakeApi::default()
        .with_category("c1", &["pl1", "pl2"])
        .with_playlist("pl1", &[Some("a"), Some("b"), Some("a")])
        .with_playlist("pl2", &[Some("b"), Some("c")]);
    let categories = [Category::new("pop", "c1")];

    // Per playlist: duplicates inside a playlist go, shared tracks stay
    let walker = CatalogWalker::new(&api, config(5, DedupScope::Playlist)).unwrap();
    let resolved = walker.resolve_playlists(&categories).await;
    let collected = walker.collect_track_ids(&resolved).await;
    assert_eq!(collected[0].track_ids, vec!["a", "b"]);
    assert_eq!(collected[1].track_ids, vec!["b", "c"]);
    assert_eq!(catalog::count_tracks(&collected), 4);

    // Per run: a track is kept under the first playlist listing it
    let walker = CatalogWalker::new(&api, config(5, DedupScope::Run)).unwrap();
    let collected = walker.collect_track_ids(&resolved).await;
    assert_eq!(collected[0].track_ids, vec!["a", "b"]);
    assert_eq!(collected[1].track_ids, vec!["c"]);
    assert_eq!(catalog::count_tracks(&collected), 3);
}

#[tokio::test]
async fn test_resolve_user_playlists() {
    let mut api = FakeApi::default().with_playlist("mine", &[Some("t1")]);
    api.user_playlists = vec![Some(common::playlist("mine")), None];

    let config = WalkerConfig {
        market: None,
        ..WalkerConfig::default()
    };
    let walker = CatalogWalker::new(&api, config).unwrap();
    let resolved = walker.resolve_user_playlists().await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].category, PERSONAL_CATEGORY);
    assert_eq!(resolved[0].playlists.len(), 1);
    assert_eq!(resolved[0].playlists[0].category, PERSONAL_CATEGORY);

    // Own playlists are listed without a market
    let collected = walker.collect_track_ids(&resolved).await;
    assert_eq!(collected[0].track_ids, vec!["t1"]);
    assert!(api.calls().contains(&"playlist mine -".to_string()));
}

#[test]
fn test_invalid_walker_config() {
    let api = FakeApi::default();

    let zero_limit = CatalogWalker::new(&api, config(0, DedupScope::Playlist));
    assert!(matches!(zero_limit, Err(Error::InvalidConfig(_))));

    let mut no_country = WalkerConfig::default();
    no_country.country = " ".to_string();
    assert!(matches!(
        CatalogWalker::new(&api, no_country),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_dedupe_in_order() {
    let ids = vec![
        Some("x".to_string()),
        None,
        Some("y".to_string()),
        Some(String::new()),
        Some("x".to_string()),
    ];

    let mut seen = HashSet::new();
    assert_eq!(catalog::dedupe_in_order(ids, &mut seen), vec!["x", "y"]);
    assert_eq!(seen.len(), 2);
}

#[test]
fn test_flatten_keeps_provenance() {
    let collected = vec![
        PlaylistTracks {
            category: "pop".to_string(),
            playlist_id: "pl1".to_string(),
            track_ids: vec!["t1".to_string(), "t2".to_string()],
        },
        PlaylistTracks {
            category: "jazz".to_string(),
            playlist_id: "pl2".to_string(),
            track_ids: vec!["t3".to_string()],
        },
    ];

    let sources = catalog::flatten(&collected);
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0].id, "t1");
    assert_eq!(sources[2].category.as_deref(), Some("jazz"));
    assert_eq!(sources[2].playlist_id.as_deref(), Some("pl2"));
}
