use anchor_lang::prelude::*;
use instructions::*;

pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;

declare_id!("CpG92WPSAiiJLZXdTBGBGzQDoj2NTfsLwUoiaYtqJnx7");

#[program]
pub mod fifty_fifty_raffle {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::initialize(ctx)
    }

    pub fn donate(ctx: Context<Donate>, amount: u64) -> Result<()> {
        instructions::donate::donate(ctx, amount)
    }

    pub fn select_winner(ctx: Context<SelectWinner>) -> Result<()> {
        instructions::select_winner::select_winner(ctx)
    }

    pub fn withdraw_funds(ctx: Context<WithdrawFunds>) -> Result<()> {
        instructions::withdraw_funds::withdraw_funds(ctx)
    }

    pub fn blacklist_wallet(ctx: Context<BlacklistWallet>, wallet: Pubkey) -> Result<()> {
        instructions::blacklist_wallet::blacklist_wallet(ctx, wallet)
    }
}
