use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;

use crate::error::SwapResult;
use crate::models::pool::{ parse_pubkey, PoolCandidate, PoolConfigCandidate };
use crate::pool::address::derive_pool_address;

/// Known CPMM AMM configs, in probe order: (address, label)
pub const DEFAULT_AMM_CONFIGS: &[(&str, &str)] = &[
    ("D4FPEruKEHrG5TenZ2mpDGEfu1iUvTiqBxvpU8HLBvC2", "standard-25bps"),
    ("G95xxie3XbkCqtE39GgQ9Ggc7xBC8Uceve7HFDEFApkc", "standard-100bps"),
    ("2fGXL8uhqxJ4tpgtosHZXT4zcQap6j62z3bMDxdkMvy5", "standard-200bps"),
    ("C7Cx2pMLtjybS3mDKSfsBj4zQ3PRZGkKt7RCYTTbCSx2", "standard-400bps"),
    ("2GveMrZhNvMHwqj12PBVJJk6pQi4vj1YjJpGJxJ8KDGe", "stable"),
    ("2FLmGwkXaLqP1BKhAAKiP4VVz5kfuV5ZUGXQUMvqMeaX", "stable-v2"),
    ("2wT8Yq49kHgDzXuPxZSaeLaH1qbmGXtEyPy64bL7aD3c", "standard-v4"),
    ("2XZRJmxBCWS3Xqu1R6QkgaXcnxA6HnuJ6qy9tY6k4pJq", "standard-v5"),
];

/// Parse the built-in config list
pub fn default_config_candidates() -> SwapResult<Vec<PoolConfigCandidate>> {
    DEFAULT_AMM_CONFIGS.iter()
        .map(|(address, label)| Ok(PoolConfigCandidate::new(parse_pubkey(address)?, *label)))
        .collect()
}

/// Parse a user-supplied config list; entries are `address` or `address:label`
pub fn parse_config_candidates(entries: &[String]) -> SwapResult<Vec<PoolConfigCandidate>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let (address, label) = match entry.split_once(':') {
                Some((address, label)) => (address, label.to_string()),
                None => (entry.as_str(), format!("config-{}", index)),
            };
            Ok(PoolConfigCandidate::new(parse_pubkey(address)?, label))
        })
        .collect()
}

/// Produces the (config, mint order) combinations to probe for a pair
#[derive(Debug, Clone)]
pub struct PoolCandidateEnumerator {
    program_id: Pubkey,
    configs: Vec<PoolConfigCandidate>,
}

impl PoolCandidateEnumerator {
    /// Duplicate configs are dropped, keeping the first occurrence
    pub fn new(program_id: Pubkey, configs: Vec<PoolConfigCandidate>) -> Self {
        let mut seen = HashSet::new();
        let configs = configs
            .into_iter()
            .filter(|config| seen.insert(config.address))
            .collect();
        Self { program_id, configs }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn configs(&self) -> &[PoolConfigCandidate] {
        &self.configs
    }

    /// Config-major cross product of configs and both mint orderings.
    ///
    /// The iterator is lazy and can be recreated at will; the order is stable.
    pub fn candidates<'a>(
        &'a self,
        mint_a: &Pubkey,
        mint_b: &Pubkey
    ) -> impl Iterator<Item = PoolCandidate> + 'a {
        let orders = [
            (*mint_a, *mint_b),
            (*mint_b, *mint_a),
        ];
        self.configs
            .iter()
            .enumerate()
            .flat_map(move |(config_index, config)| {
                orders.into_iter().map(move |(mint_x, mint_y)| PoolCandidate {
                    config_index,
                    config: config.clone(),
                    mint_x,
                    mint_y,
                    address: derive_pool_address(
                        &self.program_id,
                        &config.address,
                        &mint_x,
                        &mint_y
                    ),
                })
            })
    }
}
