#![allow(dead_code)]

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::HashMap;

use swapper::ledger::{ MockLedgerReader, MockTransactionSubmitter };
use swapper::models::pool::{ PoolCandidate, PoolConfigCandidate, PoolKeys, PoolState };
use swapper::models::raydium::CPMM_PROGRAM_ID;
use swapper::models::spl::TOKEN_PROGRAM_ID;
use swapper::PoolCandidateEnumerator;

pub fn mint(byte: u8) -> Pubkey {
    Pubkey::new_from_array([byte; 32])
}

pub fn config(byte: u8, label: &str) -> PoolConfigCandidate {
    PoolConfigCandidate::new(Pubkey::new_from_array([byte; 32]), label)
}

/// Enumerator over configs built from the given bytes, labelled cfg0, cfg1, ...
pub fn enumerator(config_bytes: &[u8]) -> PoolCandidateEnumerator {
    let configs = config_bytes
        .iter()
        .enumerate()
        .map(|(index, byte)| config(*byte, &format!("cfg{}", index)))
        .collect();
    PoolCandidateEnumerator::new(CPMM_PROGRAM_ID, configs)
}

/// Live pool state consistent with the seeds of `candidate`
pub fn pool_for(candidate: &PoolCandidate, base_reserve: u64, quote_reserve: u64) -> PoolState {
    PoolState {
        address: candidate.address,
        amm_config: candidate.config.address,
        base_reserve,
        quote_reserve,
        fee_rate_bps: 25,
        keys: PoolKeys {
            token_0_mint: candidate.mint_x,
            token_1_mint: candidate.mint_y,
            token_0_vault: Pubkey::new_unique(),
            token_1_vault: Pubkey::new_unique(),
            token_0_program: TOKEN_PROGRAM_ID,
            token_1_program: TOKEN_PROGRAM_ID,
            observation_key: Pubkey::new_unique(),
        },
    }
}

/// Reader that serves the given pools by address and reports nothing elsewhere
pub fn reader_with_pools(pools: Vec<PoolState>) -> MockLedgerReader {
    let by_address: HashMap<Pubkey, PoolState> = pools
        .into_iter()
        .map(|pool| (pool.address, pool))
        .collect();

    let mut reader = MockLedgerReader::new();
    reader
        .expect_get_pool_state()
        .returning(move |address| Ok(by_address.get(address).cloned()));
    reader
}

pub fn submitter_for(owner: Pubkey) -> MockTransactionSubmitter {
    let mut submitter = MockTransactionSubmitter::new();
    submitter.expect_payer().return_const(owner);
    submitter
}

pub fn signature(byte: u8) -> Signature {
    Signature::from([byte; 64])
}
