use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{withdrawable, RaffleState, Treasury},
};

/// Event emitted when treasury funds are withdrawn
#[event]
pub struct FundsWithdrawn {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The authority that signed the withdrawal
    pub authority: Pubkey,
    /// Amount withdrawn in lamports
    pub amount: u64,
    /// Lamports left in escrow for a winner not yet drawn
    pub escrowed: u64,
}

/// Instruction to sweep a raffle's treasury to its payout wallet
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Verifies the signer is the primary admin or one of the three auxiliary authorities
/// 2. Ensures the treasury and payout wallet match the ones stored in the raffle
/// 3. Keeps the treasury's rent-exempt reserve
/// 4. While no winner is drawn, keeps the winner's share in the treasury so
///    the draw can always pay out
/// 5. Validates there is something to withdraw
///
/// Callable any number of times; the raffle record is left untouched.
pub fn withdraw_funds(ctx: Context<WithdrawFunds>) -> Result<()> {
    let raffle_key = ctx.accounts.raffle_state.key();
    ctx.accounts
        .treasury
        .verify(&ctx.accounts.treasury.key(), &raffle_key)?;

    let escrowed = ctx.accounts.raffle_state.pending_prize()?;

    let treasury_account = ctx.accounts.treasury.to_account_info();
    let payout_wallet = ctx.accounts.payout_wallet.to_account_info();

    // Get rent exempt balance to make sure we don't deduct ALL lamports
    let rent_reserve = Rent::get()?.minimum_balance(treasury_account.data_len());
    let lamports_to_withdraw = withdrawable(treasury_account.lamports(), rent_reserve, escrowed);
    require!(
        lamports_to_withdraw > 0,
        RaffleError::InsufficientTreasuryBalance
    );

    // Transfer lamports by directly deducting from treasury and adding to payout_wallet.
    // This only works because the treasury is a PDA owned by our program.
    treasury_account.sub_lamports(lamports_to_withdraw)?;
    payout_wallet.add_lamports(lamports_to_withdraw)?;

    let treasury = &mut ctx.accounts.treasury;
    treasury.total_withdrawn = treasury
        .total_withdrawn
        .checked_add(lamports_to_withdraw)
        .ok_or(RaffleError::Overflow)?;

    msg!(
        "Withdrew {} lamports, {} held for the winner",
        lamports_to_withdraw,
        escrowed
    );
    emit!(FundsWithdrawn {
        raffle: raffle_key,
        authority: ctx.accounts.admin.key(),
        amount: lamports_to_withdraw,
        escrowed,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct WithdrawFunds<'info> {
    #[account(
        mut,
        constraint = raffle_state.is_authority(&admin.key()) @ RaffleError::Unauthorized,
        has_one = treasury @ RaffleError::InvalidTreasury,
        has_one = payout_wallet @ RaffleError::InvalidPayoutWallet,
    )]
    pub raffle_state: Account<'info, RaffleState>,

    /// Primary admin or any auxiliary authority
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(mut)]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub payout_wallet: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
