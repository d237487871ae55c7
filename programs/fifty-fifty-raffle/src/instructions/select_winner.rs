use anchor_lang::prelude::*;
use anchor_lang::solana_program::{hash::hashv, sysvar::slot_hashes};
use arrayref::array_ref;

use crate::{
    error::RaffleError,
    state::{withdrawable, RaffleState, Treasury},
};

// u64 slot + [u8; 32] hash
const SLOT_HASH_ENTRY_SIZE: usize = 8 + 32;

/// Event emitted when the winner is drawn and paid
#[event]
pub struct WinnerSelected {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The winner's address
    pub winner: Pubkey,
    /// The winning ticket number
    pub winning_ticket: u64,
    /// Total ticket weight at draw time
    pub total_tickets: u64,
    /// Lamports paid to the winner
    pub prize: u64,
    /// Slot whose hash decided the draw
    pub draw_slot: u64,
}

/// Where a raffle's committed draw slot stands in the SlotHashes history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotLookup {
    /// Hash of the draw slot, or of the first produced slot after it when
    /// the draw slot itself was skipped.
    Found([u8; 32]),
    /// No slot at or after the draw slot has been produced yet.
    Pending,
    /// The history no longer reaches back to the draw slot.
    Evicted,
}

/// Draws the winner of a raffle and pays out the winner's share of the pot
/// in the same instruction.
///
/// Execution requirements:
/// 1. The signer must be the primary admin (auxiliary authorities cannot draw)
/// 2. The threshold must have been reached
/// 3. No winner may have been selected yet
/// 4. The raffle must have participants
/// 5. The committed draw slot must have been produced
///
/// The randomness is generated with these steps:
/// 1. Look up the hash of `raffle_state.draw_slot` in the SlotHashes sysvar.
///    The slot was fixed by the threshold-crossing donation and donations
///    close once it is reached, so every attempt sees the same hash and the
///    same weights
/// 2. Hash it together with the raffle address and the participant count,
///    so the same slot hash yields different draws for different raffles
/// 3. Reduce the first 8 bytes of the digest modulo the total ticket weight
/// 4. Walk the participant list until the running weight exceeds that ticket
///
/// Resubmitting cannot change the winner. Two biases remain:
/// - the leader producing the draw slot controls its hash
/// - the admin can sit on a known outcome until the slot leaves the history
///   (about 512 slots) and get the fallback seed instead, which depends only
///   on the raffle and the draw slot. That is one alternative outcome, not a
///   reroll per attempt
///
/// # Errors
/// - `Unauthorized` if the signer is not the primary admin
/// - `ThresholdNotReached`, `WinnerAlreadySelected`, `NoParticipants`
/// - `DrawSlotPending` before the draw slot is produced
/// - `InvalidSlotHashesAccount` if the sysvar account is wrong or malformed
/// - `WinnerAccountMismatch` if the destination is not the drawn wallet
/// - `InsufficientTreasuryBalance` if the treasury cannot cover the prize
pub fn select_winner(ctx: Context<SelectWinner>) -> Result<()> {
    let raffle_key = ctx.accounts.raffle_state.key();
    let data_len = ctx.accounts.raffle_state.to_account_info().data_len();

    ctx.accounts
        .treasury
        .verify(&ctx.accounts.treasury.key(), &raffle_key)?;
    ctx.accounts.raffle_state.ensure_drawable()?;

    let draw_slot = ctx.accounts.raffle_state.draw_slot;
    let slot_hash = {
        let data = ctx.accounts.recent_slothashes.data.borrow();
        match committed_slot_hash(&data, draw_slot)? {
            SlotLookup::Found(hash) => hash,
            SlotLookup::Pending => return err!(RaffleError::DrawSlotPending),
            SlotLookup::Evicted => {
                msg!("Slot {} left the SlotHashes history, using the fallback seed", draw_slot);
                evicted_slot_hash(draw_slot)
            }
        }
    };
    let random_value = draw_seed(
        &slot_hash,
        &raffle_key,
        ctx.accounts.raffle_state.participant_count,
    );

    let prize = ctx.accounts.raffle_state.winner_prize()?;
    let draw = ctx.accounts.raffle_state.draw(random_value, data_len)?;
    msg!(
        "Winning ticket {} of {}",
        draw.winning_ticket,
        draw.total_tickets
    );

    require_keys_eq!(
        ctx.accounts.winner_account.key(),
        draw.winner,
        RaffleError::WinnerAccountMismatch
    );

    let treasury_account = ctx.accounts.treasury.to_account_info();
    let rent_reserve = Rent::get()?.minimum_balance(treasury_account.data_len());
    require!(
        withdrawable(treasury_account.lamports(), rent_reserve, 0) >= prize,
        RaffleError::InsufficientTreasuryBalance
    );

    // Direct debit works because the treasury is owned by this program.
    treasury_account.sub_lamports(prize)?;
    ctx.accounts
        .winner_account
        .to_account_info()
        .add_lamports(prize)?;

    let treasury = &mut ctx.accounts.treasury;
    treasury.total_paid_out = treasury
        .total_paid_out
        .checked_add(prize)
        .ok_or(RaffleError::Overflow)?;

    emit!(WinnerSelected {
        raffle: raffle_key,
        winner: draw.winner,
        winning_ticket: draw.winning_ticket,
        total_tickets: draw.total_tickets,
        prize,
        draw_slot,
    });

    Ok(())
}

/// Finds the hash deciding a draw committed to `draw_slot`.
///
/// Layout: u64 entry count, then (u64 slot, [u8; 32] hash) entries, newest first.
pub fn committed_slot_hash(data: &[u8], draw_slot: u64) -> Result<SlotLookup> {
    require!(data.len() >= 8, RaffleError::InvalidSlotHashesAccount);
    let count = u64::from_le_bytes(*array_ref![data, 0, 8]);
    require!(count > 0, RaffleError::InvalidSlotHashesAccount);
    let end = usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(SLOT_HASH_ENTRY_SIZE))
        .and_then(|len| len.checked_add(8))
        .ok_or(RaffleError::InvalidSlotHashesAccount)?;
    require!(data.len() >= end, RaffleError::InvalidSlotHashesAccount);

    let mut candidate = None;
    for entry in data[8..end].chunks_exact(SLOT_HASH_ENTRY_SIZE) {
        let slot = u64::from_le_bytes(*array_ref![entry, 0, 8]);
        if slot < draw_slot {
            return Ok(candidate.map_or(SlotLookup::Pending, SlotLookup::Found));
        }
        let hash = *array_ref![entry, 8, 32];
        if slot == draw_slot {
            return Ok(SlotLookup::Found(hash));
        }
        candidate = Some(hash);
    }
    Ok(SlotLookup::Evicted)
}

/// Stand-in for a slot hash that is no longer retrievable.
pub fn evicted_slot_hash(draw_slot: u64) -> [u8; 32] {
    hashv(&[b"evicted-draw-slot".as_ref(), &draw_slot.to_le_bytes()]).to_bytes()
}

/// Mixes the slot hash with raffle-specific salt into a uniform u64.
pub fn draw_seed(slot_hash: &[u8; 32], raffle: &Pubkey, participant_count: u64) -> u64 {
    let digest = hashv(&[
        slot_hash.as_ref(),
        raffle.as_ref(),
        &participant_count.to_le_bytes(),
    ])
    .to_bytes();
    u64::from_le_bytes(*array_ref![digest, 0, 8])
}

/// Accounts required for the select_winner instruction
#[derive(Accounts)]
pub struct SelectWinner<'info> {
    /// The raffle to resolve. Only its primary admin may draw.
    #[account(
        mut,
        constraint = raffle_state.is_primary_admin(&admin.key()) @ RaffleError::Unauthorized,
        has_one = treasury @ RaffleError::InvalidTreasury,
    )]
    pub raffle_state: Account<'info, RaffleState>,

    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(mut)]
    pub treasury: Account<'info, Treasury>,

    /// Receives the prize; must be the drawn participant's wallet
    #[account(mut)]
    pub winner_account: SystemAccount<'info>,

    /// CHECK: Read as raw bytes. Anchor cannot deserialize the SlotHashes
    /// sysvar, so only its address is validated.
    #[account(address = slot_hashes::ID @ RaffleError::InvalidSlotHashesAccount)]
    pub recent_slothashes: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::LAMPORTS_PER_TICKET,
        state::RAFFLE_STATE_ACCOUNT_SIZE,
    };
    use anchor_lang::solana_program::hash::hash;

    const DRAW_SLOT: u64 = 5_000;

    fn slot_hashes_data(entries: &[(u64, [u8; 32])]) -> Vec<u8> {
        let mut data = (entries.len() as u64).to_le_bytes().to_vec();
        for (slot, hash) in entries {
            data.extend_from_slice(&slot.to_le_bytes());
            data.extend_from_slice(hash);
        }
        data
    }

    /// Newest-first history covering `oldest..=newest`, with `fixed` at
    /// `DRAW_SLOT` and `salt`-dependent hashes everywhere else.
    fn history(newest: u64, oldest: u64, fixed: [u8; 32], salt: u64) -> Vec<u8> {
        let entries: Vec<(u64, [u8; 32])> = (oldest..=newest)
            .rev()
            .map(|slot| {
                let hash = if slot == DRAW_SLOT {
                    fixed
                } else {
                    hashv(&[slot.to_le_bytes().as_ref(), &salt.to_le_bytes()]).to_bytes()
                };
                (slot, hash)
            })
            .collect();
        slot_hashes_data(&entries)
    }

    fn assert_slot_hashes_err(result: Result<SlotLookup>) {
        assert_eq!(
            ProgramError::from(result.unwrap_err()),
            ProgramError::Custom(RaffleError::InvalidSlotHashesAccount.into())
        );
    }

    #[test]
    fn finds_the_committed_slot() {
        let data = slot_hashes_data(&[
            (DRAW_SLOT + 2, [1u8; 32]),
            (DRAW_SLOT + 1, [2u8; 32]),
            (DRAW_SLOT, [7u8; 32]),
            (DRAW_SLOT - 1, [9u8; 32]),
        ]);
        assert_eq!(
            committed_slot_hash(&data, DRAW_SLOT).unwrap(),
            SlotLookup::Found([7u8; 32])
        );
    }

    #[test]
    fn skipped_draw_slot_uses_the_next_produced_slot() {
        let data = slot_hashes_data(&[
            (DRAW_SLOT + 4, [1u8; 32]),
            (DRAW_SLOT + 2, [2u8; 32]),
            (DRAW_SLOT - 3, [9u8; 32]),
        ]);
        assert_eq!(
            committed_slot_hash(&data, DRAW_SLOT).unwrap(),
            SlotLookup::Found([2u8; 32])
        );
    }

    #[test]
    fn future_draw_slot_is_pending() {
        let data = slot_hashes_data(&[(DRAW_SLOT - 1, [1u8; 32]), (DRAW_SLOT - 2, [2u8; 32])]);
        assert_eq!(
            committed_slot_hash(&data, DRAW_SLOT).unwrap(),
            SlotLookup::Pending
        );
    }

    #[test]
    fn evicted_draw_slot_is_reported() {
        let data = slot_hashes_data(&[(DRAW_SLOT + 600, [1u8; 32]), (DRAW_SLOT + 89, [2u8; 32])]);
        assert_eq!(
            committed_slot_hash(&data, DRAW_SLOT).unwrap(),
            SlotLookup::Evicted
        );
        assert_eq!(evicted_slot_hash(DRAW_SLOT), evicted_slot_hash(DRAW_SLOT));
        assert_ne!(evicted_slot_hash(DRAW_SLOT), evicted_slot_hash(DRAW_SLOT + 1));
    }

    #[test]
    fn rejects_empty_or_truncated_slot_hashes() {
        assert_slot_hashes_err(committed_slot_hash(&[], DRAW_SLOT));
        assert_slot_hashes_err(committed_slot_hash(&slot_hashes_data(&[]), DRAW_SLOT));

        let mut truncated = slot_hashes_data(&[(DRAW_SLOT, [1u8; 32]), (DRAW_SLOT - 1, [2u8; 32])]);
        truncated.truncate(8 + SLOT_HASH_ENTRY_SIZE + 10);
        assert_slot_hashes_err(committed_slot_hash(&truncated, DRAW_SLOT));

        let mut absurd_count = slot_hashes_data(&[(DRAW_SLOT, [1u8; 32])]);
        absurd_count[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert_slot_hashes_err(committed_slot_hash(&absurd_count, DRAW_SLOT));
    }

    #[test]
    fn resubmitting_after_new_slots_keeps_the_winner() {
        let mut raffle = RaffleState::default();
        raffle.init(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()],
            Pubkey::new_unique(),
        );
        let whale = Pubkey::new_unique();
        let friend = Pubkey::new_unique();
        raffle
            .record_donation(whale, 99 * LAMPORTS_PER_TICKET, 0, RAFFLE_STATE_ACCOUNT_SIZE)
            .unwrap();
        raffle
            .record_donation(friend, LAMPORTS_PER_TICKET, 0, RAFFLE_STATE_ACCOUNT_SIZE)
            .unwrap();
        raffle.threshold_reached = true;
        raffle.draw_slot = DRAW_SLOT;
        let raffle_key = Pubkey::new_unique();
        let committed = hash(b"block produced at the draw slot").to_bytes();

        let mut winners = Vec::new();
        for attempt in 0..200u64 {
            // Each attempt lands in a later slot with a different recent history.
            let data = history(DRAW_SLOT + 1 + attempt, DRAW_SLOT - 3, committed, attempt);
            let slot_hash = match committed_slot_hash(&data, raffle.draw_slot).unwrap() {
                SlotLookup::Found(hash) => hash,
                other => panic!("unexpected lookup {:?}", other),
            };
            let seed = draw_seed(&slot_hash, &raffle_key, raffle.participant_count);
            let mut trial = raffle.clone();
            winners.push(trial.draw(seed, RAFFLE_STATE_ACCOUNT_SIZE).unwrap().winner);
        }

        assert!(winners.iter().all(|winner| *winner == winners[0]));
    }

    #[test]
    fn seed_is_salted_by_raffle() {
        let slot_hash = [3u8; 32];
        let raffle = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        assert_eq!(
            draw_seed(&slot_hash, &raffle, 2),
            draw_seed(&slot_hash, &raffle, 2)
        );
        assert_ne!(
            draw_seed(&slot_hash, &raffle, 2),
            draw_seed(&slot_hash, &other, 2)
        );
        assert_ne!(
            draw_seed(&slot_hash, &raffle, 2),
            draw_seed(&slot_hash, &raffle, 3)
        );
    }

    #[test]
    fn seeds_spread_across_ticket_weights() {
        let raffle = Pubkey::new_unique();
        let total_tickets = 100u64;
        let mut low = 0u64;

        for slot in 0..2_000u64 {
            let mut slot_hash = [0u8; 32];
            slot_hash[..8].copy_from_slice(&slot.to_le_bytes());
            if draw_seed(&slot_hash, &raffle, 2) % total_tickets < 10 {
                low += 1;
            }
        }

        // Expect about 10% of draws to land on the first 10 tickets.
        assert!((120..=280).contains(&low), "low tickets drawn: {}", low);
    }
}
