// crates/utilmat-build/tests/pipeline.rs
//
// End-to-end tests of the utility matrix pipeline through the public API.
//
// Covers the scenarios and properties the pipeline guarantees: column set
// equals the catalog's names, one row per resolved user, chunk-size
// independence, cross-chunk merging, first-seen intra-batch dedup, and
// unknown-item exclusion.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use utilmat_build::{
    build_utility_matrix, BuildRequest, ConflictPolicy, MatrixBuilder, MemoryEventSource,
};
use utilmat_core::{Catalog, RatingEvent, UtilityMatrix, UtilmatError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ev(user: &str, item: &str, rating: f64) -> RatingEvent {
    RatingEvent::new(user, item, rating)
}

/// Build by streaming `events` through a memory source in `chunk_size` batches.
fn stream(catalog: &Catalog, events: Vec<RatingEvent>, chunk_size: usize) -> UtilityMatrix {
    let source = MemoryEventSource::new(events);
    build_utility_matrix(catalog, BuildRequest::streaming(&source, "memory", chunk_size))
        .expect("streaming build should succeed")
        .matrix
}

/// A catalog of `n` items ("Item 0".."Item n-1") plus one name shared by two ids.
fn generated_catalog(n: usize) -> Catalog {
    let mut pairs: Vec<(String, String)> =
        (0..n).map(|i| (i.to_string(), format!("Item {}", i))).collect();
    pairs.push((n.to_string(), "Item 0".to_string()));
    Catalog::from_pairs(pairs)
}

/// Events without any (user, item) repeats, so every chunking agrees.
fn generated_events(seed: u64, users: usize, items: usize, count: usize) -> Vec<RatingEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(count);
    while events.len() < count {
        let user = rng.gen_range(0..users);
        // items + 5 leaves room for unknown ids
        let item = rng.gen_range(0..items + 5);
        // id `items` shares the name of id 0
        let column = if item == items { 0 } else { item };
        if !seen.insert((user, column)) {
            continue;
        }
        let rating = f64::from(rng.gen_range(1..=10u8)) / 2.0;
        events.push(ev(&user.to_string(), &item.to_string(), rating));
    }
    events
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn two_chunks_merge_into_one_row_per_user() {
    let catalog = Catalog::from_pairs([("1", "Alpha"), ("2", "Beta")]);
    let events = vec![ev("U1", "1", 5.0), ev("U2", "2", 3.0), ev("U1", "2", 4.0)];

    let matrix = stream(&catalog, events, 2);

    assert_eq!(matrix.columns().names(), &["Alpha", "Beta"]);
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.row("User_U1"), Some(&[Some(5.0), Some(4.0)][..]));
    assert_eq!(matrix.row("User_U2"), Some(&[None, Some(3.0)][..]));
}

#[test]
fn first_rating_wins_within_one_batch() {
    let catalog = Catalog::from_pairs([("1", "Alpha")]);
    let matrix = build_utility_matrix(
        &catalog,
        BuildRequest::in_memory(vec![ev("U1", "1", 5.0), ev("U1", "1", 2.0)]),
    )
    .expect("build")
    .matrix;

    assert_eq!(matrix.row("User_U1"), Some(&[Some(5.0)][..]));
}

#[test]
fn unknown_item_creates_no_column_and_no_row() {
    let catalog = Catalog::from_pairs([("1", "Alpha")]);
    let built = build_utility_matrix(
        &catalog,
        BuildRequest::in_memory(vec![ev("U1", "1", 4.0), ev("U2", "9", 5.0)]),
    )
    .expect("build");

    assert_eq!(built.matrix.columns().names(), &["Alpha"]);
    assert_eq!(built.matrix.columns().index_of("9"), None);
    assert_eq!(built.matrix.users(), &["User_U1"]);
    assert_eq!(built.report.unknown_item_events, 1);
}

#[test]
fn no_input_aborts_with_usage_error() {
    let catalog = Catalog::from_pairs([("1", "Alpha")]);
    let result = build_utility_matrix(&catalog, BuildRequest::default());
    assert!(matches!(result, Err(UtilmatError::Usage(_))));
}

#[test]
fn later_chunk_wins_conflicting_rating() {
    let catalog = Catalog::from_pairs([("1", "Alpha"), ("2", "Beta")]);
    let events = vec![ev("U1", "1", 1.0), ev("U1", "1", 5.0)];

    let matrix = stream(&catalog, events, 1);

    assert_eq!(matrix.get("User_U1", "Alpha"), Some(5.0));
}

#[test]
fn reject_policy_fails_the_whole_build() {
    let catalog = Catalog::from_pairs([("1", "Alpha")]);
    let source = MemoryEventSource::new(vec![ev("U1", "1", 1.0), ev("U1", "1", 5.0)]);

    let result = MatrixBuilder::new(&catalog)
        .with_conflict_policy(ConflictPolicy::Reject)
        .build(BuildRequest::streaming(&source, "memory", 1));

    assert!(matches!(result, Err(UtilmatError::Conflict { .. })));
}

#[test]
fn shared_item_names_share_a_column() {
    let catalog = Catalog::from_pairs([("1", "Heat"), ("2", "Heat")]);
    let matrix = build_utility_matrix(
        &catalog,
        BuildRequest::in_memory(vec![ev("U1", "2", 3.0), ev("U1", "1", 4.0)]),
    )
    .expect("build")
    .matrix;

    assert_eq!(matrix.width(), 1);
    // Both ids resolve to "Heat"; the first event in batch order wins.
    assert_eq!(matrix.get("User_U1", "Heat"), Some(3.0));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn columns_equal_catalog_names_for_every_chunk_size() {
    let catalog = generated_catalog(12);
    let events = generated_events(7, 9, 12, 60);
    let expected: Vec<String> = (0..12).map(|i| format!("Item {}", i)).collect();

    for chunk_size in [1, 2, 5, 17, 60, 1000] {
        let matrix = stream(&catalog, events.clone(), chunk_size);
        assert_eq!(
            matrix.columns().names(),
            expected.as_slice(),
            "chunk size {} changed the column set",
            chunk_size
        );
    }
}

#[test]
fn one_row_per_resolved_user() {
    let catalog = generated_catalog(10);
    let events = generated_events(11, 15, 10, 80);
    let expected_users: HashSet<String> = events
        .iter()
        .filter(|e| catalog.name_of(&e.item_id).is_some())
        .map(|e| format!("User_{}", e.user_id))
        .collect();

    let matrix = stream(&catalog, events, 7);
    let users: HashSet<String> = matrix.users().iter().cloned().collect();

    assert_eq!(matrix.len(), users.len(), "row keys must be unique");
    assert_eq!(users, expected_users);
}

#[test]
fn chunk_size_does_not_change_the_result() {
    let catalog = generated_catalog(20);
    let events = generated_events(42, 25, 20, 200);

    let whole = stream(&catalog, events.clone(), events.len());
    let in_memory = build_utility_matrix(&catalog, BuildRequest::in_memory(events.clone()))
        .expect("in-memory build")
        .matrix;
    assert!(whole.equivalent_to(&in_memory));

    for chunk_size in [1, 3, 8, 33, 199] {
        let chunked = stream(&catalog, events.clone(), chunk_size);
        assert!(
            chunked.equivalent_to(&whole),
            "chunk size {} differs from a single chunk",
            chunk_size
        );
    }
}

#[test]
fn every_resolved_event_lands_in_its_cell() {
    let catalog = generated_catalog(8);
    let events = generated_events(3, 6, 8, 40);

    let matrix = stream(&catalog, events.clone(), 4);

    for e in &events {
        if let Some(name) = catalog.name_of(&e.item_id) {
            let user = format!("User_{}", e.user_id);
            // "Item 0" is shared by two ids; only check unshared columns.
            if name != "Item 0" {
                assert_eq!(matrix.get(&user, name), Some(e.rating));
            }
        }
    }
}
