use anchor_lang::prelude::*;

use crate::{error::RaffleError, state::RaffleState};

/// Event emitted when a wallet is barred from donating
#[event]
pub struct WalletBlacklisted {
    pub raffle: Pubkey,
    pub wallet: Pubkey,
    pub authority: Pubkey,
}

/// Bars `wallet` from future donations to this raffle.
///
/// Any of the four authorities may call it. A wallet that already donated
/// keeps its tickets and can still be drawn.
pub fn blacklist_wallet(ctx: Context<BlacklistWallet>, wallet: Pubkey) -> Result<()> {
    let data_len = ctx.accounts.raffle_state.to_account_info().data_len();
    ctx.accounts
        .raffle_state
        .add_to_blacklist(wallet, data_len)?;

    emit!(WalletBlacklisted {
        raffle: ctx.accounts.raffle_state.key(),
        wallet,
        authority: ctx.accounts.admin.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct BlacklistWallet<'info> {
    #[account(
        mut,
        constraint = raffle_state.is_authority(&admin.key()) @ RaffleError::Unauthorized,
    )]
    pub raffle_state: Account<'info, RaffleState>,

    pub admin: Signer<'info>,
}
