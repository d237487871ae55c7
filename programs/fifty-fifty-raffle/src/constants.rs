use anchor_lang::prelude::*;

/// Total contribution (in lamports) that unlocks the draw. 1 SOL.
#[constant]
pub const THRESHOLD_LAMPORTS: u64 = 1_000_000_000;

/// Exchange rate between lamports and ticket weight. 0.01 SOL = 1 ticket.
#[constant]
pub const LAMPORTS_PER_TICKET: u64 = 10_000_000;

/// Share of `total_sol` paid to the winner, in basis points.
#[constant]
pub const WINNER_SHARE_BPS: u64 = 5_000;

#[constant]
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Participant slots allocated in a raffle account.
#[constant]
pub const MAX_PARTICIPANTS: u16 = 200;

/// Blacklist slots allocated in a raffle account.
#[constant]
pub const MAX_BLACKLIST: u16 = 32;

/// Slots between the threshold-crossing donation and the slot whose hash
/// decides the draw. Donations close once that slot is reached.
#[constant]
pub const DRAW_DELAY_SLOTS: u64 = 10;

#[constant]
pub const TREASURY_SEED: &[u8] = b"treasury";
