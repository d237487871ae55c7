use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{RaffleState, Treasury},
};

/// Event emitted when a donation is recorded
#[event]
pub struct DonationReceived {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The donor's address
    pub participant: Pubkey,
    /// Amount donated in lamports
    pub amount: u64,
    /// Tickets bought by this donation
    pub tickets: u64,
    /// The donor's ticket weight after this donation
    pub participant_tickets: u64,
    /// True when this was the donor's first donation to the raffle
    pub new_participant: bool,
    /// Raffle total after this donation
    pub total_sol: u64,
}

/// Event emitted once, by the donation that makes the raffle drawable
#[event]
pub struct ThresholdReached {
    pub raffle: Pubkey,
    pub total_sol: u64,
    pub participant_count: u64,
    /// Slot whose hash will decide the draw
    pub draw_slot: u64,
}

/// Instruction to donate lamports to a raffle and receive ticket weight
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `amount` - Lamports to donate; must be worth at least one ticket
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Rejects donations once a winner has been selected or the committed
///    draw slot has been reached
/// 2. Rejects amounts below one ticket
/// 3. Rejects blacklisted donors
/// 4. Verifies the treasury is this raffle's PDA
/// 5. Rejects new participants once the account is at capacity
/// 6. Verifies the treasury received exactly `amount`
///
/// # Implementation Notes
/// - A repeat donor's existing entry is topped up, never duplicated
/// - `threshold_reached` is latched and never cleared; the donation that
///   sets it commits the draw to `DRAW_DELAY_SLOTS` slots later
/// - Uses checked arithmetic for every total
pub fn donate(ctx: Context<Donate>, amount: u64) -> Result<()> {
    let raffle_key = ctx.accounts.raffle_state.key();
    let participant_key = ctx.accounts.participant.key();
    let data_len = ctx.accounts.raffle_state.to_account_info().data_len();
    let slot = Clock::get()?.slot;

    ctx.accounts
        .treasury
        .verify(&ctx.accounts.treasury.key(), &raffle_key)?;

    let receipt = ctx
        .accounts
        .raffle_state
        .record_donation(participant_key, amount, slot, data_len)?;

    // Store pre-transfer balance for verification
    let pre_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();

    anchor_lang::solana_program::program::invoke(
        &anchor_lang::solana_program::system_instruction::transfer(
            &participant_key,
            &ctx.accounts.treasury.key(),
            amount,
        ),
        &[
            ctx.accounts.participant.to_account_info(),
            ctx.accounts.treasury.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    let post_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();
    require!(
        post_transfer_balance
            == pre_transfer_balance
                .checked_add(amount)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::TransferFailed
    );

    let raffle_state = &ctx.accounts.raffle_state;
    emit!(DonationReceived {
        raffle: raffle_key,
        participant: participant_key,
        amount,
        tickets: receipt.tickets,
        participant_tickets: receipt.participant_tickets,
        new_participant: receipt.new_participant,
        total_sol: raffle_state.total_sol,
    });

    if receipt.threshold_crossed {
        msg!(
            "Threshold reached at {} lamports, drawing from slot {}",
            raffle_state.total_sol,
            raffle_state.draw_slot
        );
        emit!(ThresholdReached {
            raffle: raffle_key,
            total_sol: raffle_state.total_sol,
            participant_count: raffle_state.participant_count,
            draw_slot: raffle_state.draw_slot,
        });
    }

    Ok(())
}

#[derive(Accounts)]
pub struct Donate<'info> {
    #[account(
        mut,
        has_one = treasury @ RaffleError::InvalidTreasury,
    )]
    pub raffle_state: Account<'info, RaffleState>,

    #[account(mut)]
    pub participant: Signer<'info>,

    /// Treasury PDA with seeds ["treasury", raffle_key], re-derived in the handler
    #[account(mut)]
    pub treasury: Account<'info, Treasury>,

    pub system_program: Program<'info, System>,
}
