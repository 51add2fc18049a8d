mod common;

use std::sync::atomic::{ AtomicU32, Ordering };
use std::sync::Arc;
use std::time::Duration;

use swapper::ledger::MockLedgerReader;
use swapper::models::pool::PoolCandidate;
use swapper::{ LedgerError, PoolResolver, ResolverConfig, SwapError };

use common::{ enumerator, mint, pool_for, reader_with_pools };

fn candidates(config_bytes: &[u8]) -> Vec<PoolCandidate> {
    enumerator(config_bytes).candidates(&mint(1), &mint(2)).collect()
}

fn resolver(reader: MockLedgerReader, config_bytes: &[u8]) -> PoolResolver {
    PoolResolver::new(Arc::new(reader), enumerator(config_bytes), ResolverConfig::default())
}

// Test that nothing live means no pool, not an error
#[tokio::test]
async fn test_no_live_pool() {
    let resolver = resolver(reader_with_pools(vec![]), &[10, 11, 12]);

    assert_eq!(resolver.resolve_best(&mint(1), &mint(2)).await.unwrap(), None);
    assert!(resolver.resolve(&mint(2), &mint(1)).await.unwrap().is_empty());
}

// Test that the single live pool is found among empty candidates
#[tokio::test]
async fn test_single_live_pool_among_empty_candidates() {
    let all = candidates(&[10, 11, 12]);
    // Created under the second config with the mints in reverse order
    let live = pool_for(&all[3], 500, 700);
    let resolver = resolver(reader_with_pools(vec![live.clone()]), &[10, 11, 12]);

    assert_eq!(resolver.resolve_best(&mint(1), &mint(2)).await.unwrap(), Some(live.clone()));
    assert_eq!(resolver.resolve_best(&mint(2), &mint(1)).await.unwrap(), Some(live));
}

// Test that the deepest pool wins when several are live, in either layout
#[tokio::test]
async fn test_largest_base_reserve_wins() {
    let all = candidates(&[10, 11, 12]);
    let shallow = pool_for(&all[0], 1_000, 9_000_000);
    let deep = pool_for(&all[4], 50_000, 10);
    // Stores mint(2) as token0, so its mint(1) depth is the quote side
    let middle = pool_for(&all[3], 10, 20_000);
    let resolver = resolver(
        reader_with_pools(vec![shallow.clone(), deep.clone(), middle.clone()]),
        &[10, 11, 12]
    );

    let found = resolver.resolve(&mint(1), &mint(2)).await.unwrap();
    assert_eq!(found, vec![deep.clone(), middle, shallow]);
    assert_eq!(resolver.resolve_best(&mint(1), &mint(2)).await.unwrap(), Some(deep));
}

// Test that depth is measured on the same mint for both pool layouts
#[tokio::test]
async fn test_ranking_uses_the_same_mint_across_layouts() {
    let all = candidates(&[10, 11]);
    // Large token0 reserve, but token0 is mint(2)
    let reversed = pool_for(&all[1], 900_000, 100);
    let canonical = pool_for(&all[2], 5_000, 5_000);
    let resolver = resolver(reader_with_pools(vec![reversed.clone(), canonical.clone()]), &[10, 11]);

    let found = resolver.resolve(&mint(2), &mint(1)).await.unwrap();
    assert_eq!(found, vec![canonical, reversed]);
}

// Test that equal reserves keep config list order
#[tokio::test]
async fn test_ties_keep_config_order() {
    let all = candidates(&[10, 11, 12]);
    let later = pool_for(&all[5], 1, 1_000);
    let earlier = pool_for(&all[1], 2, 1_000);
    let resolver = resolver(reader_with_pools(vec![later, earlier.clone()]), &[10, 11, 12]);

    assert_eq!(resolver.resolve_best(&mint(1), &mint(2)).await.unwrap(), Some(earlier));
}

// Test that state not matching its derivation seeds is ignored
#[tokio::test]
async fn test_rejects_state_that_does_not_match_seeds() {
    let all = candidates(&[10, 11]);
    let mut impostor = pool_for(&all[0], 1_000_000, 1_000_000);
    impostor.keys.token_0_mint = mint(9);
    let genuine = pool_for(&all[2], 10, 10);
    let resolver = resolver(reader_with_pools(vec![impostor, genuine.clone()]), &[10, 11]);

    assert_eq!(resolver.resolve_best(&mint(1), &mint(2)).await.unwrap(), Some(genuine));
}

// Test that a failing candidate does not stop discovery
#[tokio::test]
async fn test_read_errors_skip_the_candidate() {
    let all = candidates(&[10, 11]);
    let broken = all[0].address;
    let live = pool_for(&all[2], 10, 10);
    let live_address = live.address;

    let mut reader = MockLedgerReader::new();
    reader.expect_get_pool_state().returning(move |address| {
        if *address == broken {
            Err(LedgerError::Read("connection reset".to_string()))
        } else if *address == live_address {
            Ok(Some(live.clone()))
        } else {
            Ok(None)
        }
    });
    let resolver = resolver(reader, &[10, 11]);

    let best = resolver.resolve_best(&mint(1), &mint(2)).await.unwrap();
    assert_eq!(best.map(|pool| pool.address), Some(live_address));
}

// Test that throttled probes back off and try again
#[tokio::test(start_paused = true)]
async fn test_rate_limited_probe_is_retried() {
    let all = candidates(&[10]);
    let live = pool_for(&all[0], 10, 10);
    let live_address = live.address;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let mut reader = MockLedgerReader::new();
    reader.expect_get_pool_state().returning(move |address| {
        if *address != live_address {
            return Ok(None);
        }
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(LedgerError::RateLimited)
        } else {
            Ok(Some(live.clone()))
        }
    });
    let resolver = resolver(reader, &[10]);

    let started = tokio::time::Instant::now();
    let best = resolver.resolve_best(&mint(1), &mint(2)).await.unwrap();

    assert_eq!(best.map(|pool| pool.address), Some(live_address));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(4));
}

// Test that a candidate throttled past the retry limit is skipped
#[tokio::test(start_paused = true)]
async fn test_persistent_throttling_gives_up() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut reader = MockLedgerReader::new();
    reader.expect_get_pool_state().returning(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(LedgerError::RateLimited)
    });
    let resolver = resolver(reader, &[10]);

    assert_eq!(resolver.resolve_best(&mint(1), &mint(2)).await.unwrap(), None);
    // Two candidates, each read once plus five retries
    assert_eq!(calls.load(Ordering::SeqCst), 12);
}

// Test that a pair of identical mints is refused
#[tokio::test]
async fn test_identical_mints_rejected() {
    let mut reader = MockLedgerReader::new();
    reader.expect_get_pool_state().times(0);
    let resolver = resolver(reader, &[10]);

    assert!(matches!(
        resolver.resolve_best(&mint(1), &mint(1)).await,
        Err(SwapError::InvalidInput(_))
    ));
}
