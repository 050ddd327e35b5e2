/// Integration tests for the recent-caption store
///
/// Validates the bounded upsert-by-id semantics consumed by late-joining
/// UI clients.
use livecap::captions::{Caption, RECENT_CAPACITY, RecentCaptions};
use livecap::network::CaptionUpdate;

#[test]
fn test_capacity_bound_holds_under_load() {
    println!("\n=== Capacity Bound Test ===");

    let mut store = RecentCaptions::new();

    for i in 0..100 {
        store.insert(Caption::new(format!("c{}", i), format!("caption {}", i)));
        assert!(store.len() <= RECENT_CAPACITY);
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), RECENT_CAPACITY);

    // Most-recent-first, oldest evicted
    assert_eq!(snapshot[0].id, "c99");
    assert_eq!(snapshot[RECENT_CAPACITY - 1].id, "c95");

    println!("✓ len ≤ {} after 100 inserts, oldest evicted first", RECENT_CAPACITY);
}

#[test]
fn test_result_then_update_yields_one_merged_record() {
    println!("\n=== Result + Update Test ===");

    let mut store = RecentCaptions::new();

    let mut caption = Caption::new("42", "good morning");
    caption.confidence = Some(0.95);
    store.insert(caption);

    let merged = store
        .apply_update(&CaptionUpdate::new("42").with_translated("सुप्रभात"))
        .expect("update for known id");

    // Exactly one record with that id, fields merged
    let matching: Vec<_> = store.snapshot().into_iter().filter(|c| c.id == "42").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], merged);
    assert_eq!(matching[0].original, "good morning");
    assert_eq!(matching[0].translated.as_deref(), Some("सुप्रभात"));
    assert_eq!(matching[0].confidence, Some(0.95));

    println!("✓ One merged record: {:?}", matching[0].translated);
}

#[test]
fn test_update_for_evicted_caption_is_ignored() {
    println!("\n=== Late Update Test ===");

    let mut store = RecentCaptions::new();
    store.insert(Caption::new("old", "will be evicted"));

    for i in 0..RECENT_CAPACITY {
        store.insert(Caption::new(format!("new{}", i), "fresh"));
    }

    // "old" has been evicted; its late translation must not resurrect it
    let result = store.apply_update(&CaptionUpdate::new("old").with_translated("late"));

    assert!(result.is_none());
    assert_eq!(store.len(), RECENT_CAPACITY);
    assert!(store.snapshot().iter().all(|c| c.id != "old"));

    println!("✓ Late update for evicted caption ignored");
}

#[test]
fn test_ordering_is_most_recent_first() {
    println!("\n=== Ordering Test ===");

    let mut store = RecentCaptions::new();
    for id in ["a", "b", "c"] {
        store.insert(Caption::new(id, id));
    }

    let ids: Vec<_> = store.snapshot().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);

    // Updating "a" merges in place without reordering
    store
        .apply_update(&CaptionUpdate::new("a").with_simplified("A"))
        .unwrap();
    let ids: Vec<_> = store.snapshot().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);

    println!("✓ Most-recent-first, updates keep position");
}
