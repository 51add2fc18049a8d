use solana_sdk::pubkey::Pubkey;

use swapper::models::raydium::{
    token_account_amount,
    AmmConfigAccount,
    CpmmPoolAccount,
    SwapBaseInputArgs,
    AMM_CONFIG_DISCRIMINATOR,
    POOL_STATE_DISCRIMINATOR,
    POOL_STATE_LEN,
    SWAP_BASE_INPUT_DISCRIMINATOR,
};

fn key(index: u8) -> Pubkey {
    Pubkey::new_from_array([index + 1; 32])
}

// Pool account bytes with pubkey i filled with i+1 and the given fee counters
fn pool_account_bytes(fees: [u64; 4]) -> Vec<u8> {
    let mut data = vec![0u8; POOL_STATE_LEN];
    data[..8].copy_from_slice(&POOL_STATE_DISCRIMINATOR);
    for index in 0..10u8 {
        let start = 8 + (index as usize) * 32;
        data[start..start + 32].copy_from_slice(key(index).as_ref());
    }
    data[328..333].copy_from_slice(&[254, 0, 9, 6, 9]);

    let words = [1_000_000u64, fees[0], fees[1], fees[2], fees[3], 1_700_000_000, 600];
    for (index, word) in words.iter().enumerate() {
        let start = 333 + index * 8;
        data[start..start + 8].copy_from_slice(&word.to_le_bytes());
    }
    data
}

// Test decoding every field of a pool account
#[test]
fn test_decode_pool_account() {
    let pool = CpmmPoolAccount::decode(&pool_account_bytes([10, 20, 30, 40])).unwrap();

    assert_eq!(pool.amm_config, key(0));
    assert_eq!(pool.pool_creator, key(1));
    assert_eq!(pool.token_0_vault, key(2));
    assert_eq!(pool.token_1_vault, key(3));
    assert_eq!(pool.lp_mint, key(4));
    assert_eq!(pool.token_0_mint, key(5));
    assert_eq!(pool.token_1_mint, key(6));
    assert_eq!(pool.token_0_program, key(7));
    assert_eq!(pool.token_1_program, key(8));
    assert_eq!(pool.observation_key, key(9));
    assert_eq!(pool.auth_bump, 254);
    assert_eq!(pool.mint_0_decimals, 6);
    assert_eq!(pool.mint_1_decimals, 9);
    assert_eq!(pool.lp_supply, 1_000_000);
    assert_eq!(pool.protocol_fees_token_0, 10);
    assert_eq!(pool.protocol_fees_token_1, 20);
    assert_eq!(pool.fund_fees_token_0, 30);
    assert_eq!(pool.fund_fees_token_1, 40);
    assert_eq!(pool.open_time, 1_700_000_000);
    assert_eq!(pool.recent_epoch, 600);
}

// Test that accrued fees are not counted as tradable reserves
#[test]
fn test_pool_reserves_exclude_fees() {
    let pool = CpmmPoolAccount::decode(&pool_account_bytes([10, 20, 30, 40])).unwrap();

    assert_eq!(pool.reserves(1_000, 2_000), (960, 1_940));
    assert_eq!(pool.reserves(5, 5), (0, 0));
}

// Test that foreign or truncated accounts are not mistaken for pools
#[test]
fn test_decode_rejects_other_accounts() {
    let mut wrong_discriminator = pool_account_bytes([0; 4]);
    wrong_discriminator[0] ^= 0xff;
    assert!(CpmmPoolAccount::decode(&wrong_discriminator).is_none());

    let truncated = pool_account_bytes([0; 4])[..300].to_vec();
    assert!(CpmmPoolAccount::decode(&truncated).is_none());
    assert!(CpmmPoolAccount::decode(&[]).is_none());
}

// Test decoding the config account and converting its fee rate
#[test]
fn test_decode_amm_config() {
    let mut data = AMM_CONFIG_DISCRIMINATOR.to_vec();
    data.push(255); // bump
    data.push(0); // disable_create_pool
    data.extend_from_slice(&3u16.to_le_bytes());
    for value in [2_500u64, 120_000, 40_000, 150_000_000] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    // Trailing fields of the real account are ignored
    data.extend_from_slice(&[0u8; 64]);

    let config = AmmConfigAccount::decode(&data).unwrap();
    assert_eq!(config.index, 3);
    assert_eq!(config.trade_fee_rate, 2_500);
    assert_eq!(config.fee_rate_bps(), 25);
    assert!(!config.disable_create_pool);

    assert!(AmmConfigAccount::decode(&data[8..]).is_none());
}

// Test the amount field of a token account
#[test]
fn test_token_account_amount() {
    let mut data = vec![0u8; 165];
    data[64..72].copy_from_slice(&42_000u64.to_le_bytes());

    assert_eq!(token_account_amount(&data), Some(42_000));
    assert_eq!(token_account_amount(&data[..70]), None);
}

// Test the swap instruction payload layout
#[test]
fn test_swap_instruction_data() {
    let data = (SwapBaseInputArgs { amount_in: 10_000, minimum_amount_out: 19_654 })
        .instruction_data()
        .unwrap();

    assert_eq!(data.len(), 24);
    assert_eq!(data[..8], SWAP_BASE_INPUT_DISCRIMINATOR);
    assert_eq!(data[8..16], 10_000u64.to_le_bytes());
    assert_eq!(data[16..24], 19_654u64.to_le_bytes());
}
