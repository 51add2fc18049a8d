use solana_sdk::instruction::{ AccountMeta, Instruction };
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = pubkey!(
    "ATokenGPvbdGVxr1b2hvZbsiqW8QUWhvgWp1mYA6yqV8"
);
pub const NATIVE_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

// Instruction tags
const ATA_CREATE_IDEMPOTENT: u8 = 1;
const TOKEN_CLOSE_ACCOUNT: u8 = 9;

/// Associated token account of `owner` for `mint` under `token_program`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID
    ).0
}

/// Create the associated token account unless it already exists
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey
) -> Instruction {
    let account = associated_token_address(owner, mint, token_program);
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(account, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(*token_program, false)
        ],
        data: vec![ATA_CREATE_IDEMPOTENT],
    }
}

/// Close a token account, returning its lamports (and unwrapped SOL) to `destination`
pub fn close_account(
    token_program: &Pubkey,
    account: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey
) -> Instruction {
    Instruction {
        program_id: *token_program,
        accounts: vec![
            AccountMeta::new(*account, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true)
        ],
        data: vec![TOKEN_CLOSE_ACCOUNT],
    }
}
