use anchor_lang::prelude::*;

use crate::{
    constants::TREASURY_SEED,
    state::{RaffleState, Treasury, RAFFLE_STATE_ACCOUNT_SIZE, TREASURY_ACCOUNT_SIZE},
};

/// Event emitted when a raffle is created
#[event]
pub struct RaffleInitialized {
    /// The pubkey of the created raffle
    pub raffle: Pubkey,
    /// The treasury PDA holding this raffle's donations
    pub treasury: Pubkey,
    /// Primary admin, the only identity allowed to draw
    pub admin: Pubkey,
    /// Destination of the retained share
    pub payout_wallet: Pubkey,
}

/// Instruction to create a new raffle and its treasury
///
/// # Security Considerations
/// - The raffle account is a fresh keypair account, so a raffle can only be
///   initialized once
/// - The signer becomes the primary admin; the three auxiliary authorities
///   and the payout wallet are taken from the accounts passed in and can
///   never be changed afterwards
/// - The treasury is a PDA with seeds ["treasury", raffle_key], so every
///   raffle custodies its own funds
///
/// # Account Validations
/// * Raffle State - New account sized for the maximum participant and blacklist capacity
/// * Treasury - New PDA initialized with seeds ["treasury", raffle_key]
/// * Admin - Signer paying for both accounts
pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
    let raffle_key = ctx.accounts.raffle_state.key();
    let treasury_key = ctx.accounts.treasury.key();

    ctx.accounts.raffle_state.init(
        ctx.accounts.admin.key(),
        treasury_key,
        [
            ctx.accounts.admin_auth_1.key(),
            ctx.accounts.admin_auth_2.key(),
            ctx.accounts.admin_auth_3.key(),
        ],
        ctx.accounts.payout_wallet.key(),
    );

    let treasury = &mut ctx.accounts.treasury;
    treasury.raffle = raffle_key;
    treasury.bump = ctx.bumps.treasury;
    treasury.total_paid_out = 0;
    treasury.total_withdrawn = 0;

    emit!(RaffleInitialized {
        raffle: raffle_key,
        treasury: treasury_key,
        admin: ctx.accounts.admin.key(),
        payout_wallet: ctx.accounts.payout_wallet.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(init, payer = admin, space = RAFFLE_STATE_ACCOUNT_SIZE)]
    pub raffle_state: Account<'info, RaffleState>,

    #[account(
        init,
        payer = admin,
        space = TREASURY_ACCOUNT_SIZE,
        seeds = [
            TREASURY_SEED,
            raffle_state.key().as_ref(),
        ],
        bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub admin_auth_1: SystemAccount<'info>,
    pub admin_auth_2: SystemAccount<'info>,
    pub admin_auth_3: SystemAccount<'info>,
    pub payout_wallet: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
