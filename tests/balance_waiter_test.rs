mod common;

use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::{ AtomicU32, Ordering };
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use swapper::balance_waiter::TokenWait;
use swapper::ledger::{ MockLedgerReader, OwnedTokenAccount };
use swapper::models::spl::NATIVE_MINT;
use swapper::utils::deadline::Deadline;
use swapper::{ BalanceWait, BalanceWaiter, LedgerError, SwapError, WaiterConfig };

use common::mint;

fn waiter(reader: MockLedgerReader) -> BalanceWaiter {
    BalanceWaiter::new(Arc::new(reader), WaiterConfig::default())
}

/// Reader whose balance reads are answered in order by `script`, repeating the last answer
fn scripted_balances(
    script: Vec<Result<Option<u64>, LedgerError>>
) -> (MockLedgerReader, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut reader = MockLedgerReader::new();
    reader.expect_get_account_balance().returning(move |_| {
        let call = counter.fetch_add(1, Ordering::SeqCst) as usize;
        script[call.min(script.len() - 1)].clone()
    });
    (reader, calls)
}

fn token(mint: Pubkey, amount: u64) -> OwnedTokenAccount {
    OwnedTokenAccount { account: Pubkey::new_unique(), mint, amount }
}

// Test that funds arriving mid-wait are reported within one poll interval
#[tokio::test(start_paused = true)]
async fn test_funded_after_several_polls() {
    let (reader, calls) = scripted_balances(
        vec![Ok(Some(0)), Ok(None), Ok(Some(0)), Ok(Some(500))]
    );
    let waiter = waiter(reader);

    let started = Instant::now();
    let result = waiter
        .wait_for_non_zero_balance(&Pubkey::new_unique(), Deadline::after(Duration::from_secs(60)))
        .await
        .unwrap();

    assert_eq!(result, BalanceWait::Funded(500));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

// Test that an already funded account returns without waiting
#[tokio::test(start_paused = true)]
async fn test_already_funded() {
    let (reader, _) = scripted_balances(vec![Ok(Some(1))]);
    let started = Instant::now();

    let result = waiter(reader)
        .wait_for_non_zero_balance(&Pubkey::new_unique(), Deadline::after(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(result, BalanceWait::Funded(1));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

// Test that an account that never fills gives up at the deadline
#[tokio::test(start_paused = true)]
async fn test_deadline_exceeded() {
    let (reader, calls) = scripted_balances(vec![Ok(Some(0))]);

    let started = Instant::now();
    let result = waiter(reader)
        .wait_for_non_zero_balance(&Pubkey::new_unique(), Deadline::after(Duration::from_millis(10_500)))
        .await
        .unwrap();

    assert_eq!(result, BalanceWait::DeadlineExceeded);
    assert_eq!(started.elapsed(), Duration::from_millis(10_500));
    assert_eq!(calls.load(Ordering::SeqCst), 12);
}

// Test that throttled reads wait the longer backoff before the next poll
#[tokio::test(start_paused = true)]
async fn test_rate_limited_reads_back_off() {
    let (reader, calls) = scripted_balances(
        vec![Err(LedgerError::RateLimited), Err(LedgerError::RateLimited), Ok(Some(7))]
    );

    let started = Instant::now();
    let result = waiter(reader)
        .wait_for_non_zero_balance(&Pubkey::new_unique(), Deadline::after(Duration::from_secs(60)))
        .await
        .unwrap();

    assert_eq!(result, BalanceWait::Funded(7));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(4));
}

// Test that throttling cannot push a wait past its deadline
#[tokio::test(start_paused = true)]
async fn test_rate_limited_until_deadline() {
    let (reader, _) = scripted_balances(vec![Err(LedgerError::RateLimited)]);

    let started = Instant::now();
    let result = waiter(reader)
        .wait_for_non_zero_balance(&Pubkey::new_unique(), Deadline::after(Duration::from_secs(3)))
        .await
        .unwrap();

    assert_eq!(result, BalanceWait::DeadlineExceeded);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

// Test that other read failures are surfaced to the caller
#[tokio::test(start_paused = true)]
async fn test_other_errors_are_transient_reads() {
    let (reader, calls) = scripted_balances(vec![Err(LedgerError::Read("node is behind".to_string()))]);

    let result = waiter(reader).wait_for_non_zero_balance(
        &Pubkey::new_unique(),
        Deadline::after(Duration::from_secs(60))
    ).await;

    assert!(matches!(result, Err(SwapError::TransientRead(LedgerError::Read(_)))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// Test detecting the one token that lands in a wallet
#[tokio::test(start_paused = true)]
async fn test_single_token_detected() {
    let arrived = token(mint(5), 1_000);
    let expected = arrived.clone();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let mut reader = MockLedgerReader::new();
    reader.expect_get_owned_tokens().returning(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Ok(vec![token(NATIVE_MINT, 10)])
        } else {
            Ok(vec![token(NATIVE_MINT, 10), arrived.clone()])
        }
    });

    let started = Instant::now();
    let result = waiter(reader)
        .wait_for_single_token(&Pubkey::new_unique(), &NATIVE_MINT, Deadline::after(Duration::from_secs(60)))
        .await
        .unwrap();

    assert_eq!(result, TokenWait::Found(expected));
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

// Test that an ambiguous wallet is never guessed at
#[tokio::test(start_paused = true)]
async fn test_two_tokens_are_ambiguous() {
    let mut reader = MockLedgerReader::new();
    reader
        .expect_get_owned_tokens()
        .returning(|_| Ok(vec![token(mint(5), 1), token(mint(6), 1)]));

    let result = waiter(reader)
        .wait_for_single_token(&Pubkey::new_unique(), &NATIVE_MINT, Deadline::after(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(result, TokenWait::DeadlineExceeded);
}
