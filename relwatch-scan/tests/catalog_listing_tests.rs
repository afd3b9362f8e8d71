//! Catalog Listing Tests
//!
//! Followed-artist pagination and bounded release windows.

mod helpers;

use helpers::{album, artist, date, single, tracks, FakeCatalog, FakeClock};
use relwatch_scan::config::ReleaseWindow;
use relwatch_scan::services::{EntityLister, RateLimitExecutor, ReleaseResolver};
use relwatch_scan::CatalogError;
use std::sync::Arc;
use std::time::Duration;

fn executor(clock: &Arc<FakeClock>, max_retries: Option<u32>) -> RateLimitExecutor {
    RateLimitExecutor::new(clock.clone(), Duration::from_secs(5), max_retries)
}

#[tokio::test]
async fn test_lister_follows_cursor_across_pages() {
    let ids: Vec<String> = (0..7).map(|i| format!("A{i}")).collect();
    let catalog = FakeCatalog::with_entities(ids.iter().map(|id| artist(id)).collect());
    let clock = Arc::new(FakeClock::at(10, 9));
    let exec = executor(&clock, None);

    let entities = EntityLister::new(&catalog, &exec, 3).list_followed().await.unwrap();

    let listed: Vec<String> = entities.into_iter().map(|e| e.id).collect();
    assert_eq!(listed, ids);
    assert_eq!(catalog.calls().list_followed, 3);
}

#[tokio::test]
async fn test_lister_stops_on_repeated_cursor() {
    let catalog = FakeCatalog::with_entities(vec![artist("A1"), artist("A2")]);
    catalog.set_stuck_cursor("same");
    let clock = Arc::new(FakeClock::at(10, 9));
    let exec = executor(&clock, None);

    let entities = EntityLister::new(&catalog, &exec, 50).list_followed().await.unwrap();

    assert_eq!(entities.len(), 4);
    assert_eq!(catalog.calls().list_followed, 2);
}

#[tokio::test]
async fn test_lister_gives_up_after_retry_cap() {
    let catalog = FakeCatalog::with_entities(vec![artist("A1")]);
    for _ in 0..3 {
        catalog.push_listing_error(CatalogError::RateLimited {
            retry_after: Duration::from_secs(1),
        });
    }
    let clock = Arc::new(FakeClock::at(10, 9));
    let exec = executor(&clock, Some(2));

    let result = EntityLister::new(&catalog, &exec, 50).list_followed().await;

    assert!(matches!(result, Err(CatalogError::RateLimited { .. })));
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(6); 2]);
}

#[tokio::test]
async fn test_resolver_window_excludes_releases_past_last_page() {
    // Given: five albums, but only one page of two per kind is fetched
    let catalog = FakeCatalog::new();
    for (i, day) in ["01", "02", "03", "04", "05"].iter().enumerate() {
        let id = format!("alb{i}");
        catalog.add_release("A1", album(&id, &format!("2024-01-{day}"), 1), tracks(&id, 1));
    }
    let clock = Arc::new(FakeClock::at(10, 9));
    let exec = executor(&clock, None);
    let window = ReleaseWindow {
        page_size: 2,
        pages_per_kind: 1,
    };

    // When: the latest release is resolved
    let latest = ReleaseResolver::new(&catalog, &exec, window)
        .latest_release(&artist("A1"))
        .await
        .unwrap();

    // Then: only the first page was seen
    assert_eq!(latest.map(|r| r.id), Some("alb1".to_string()));
}

#[tokio::test]
async fn test_resolver_reads_albums_then_singles() {
    let catalog = FakeCatalog::new();
    catalog.add_release("A1", single("s", "2024-02-01"), tracks("s", 1));
    catalog.add_release("A1", album("a", "2024-01-01", 1), tracks("a", 1));
    let clock = Arc::new(FakeClock::at(10, 9));
    let exec = executor(&clock, None);

    let releases = ReleaseResolver::new(&catalog, &exec, ReleaseWindow::default())
        .releases_since(&artist("A1"), date("2000-01-01"))
        .await
        .unwrap();

    let ids: Vec<&str> = releases.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "s"]);
    // one page per kind
    assert_eq!(catalog.calls().list_releases, 2);
}
