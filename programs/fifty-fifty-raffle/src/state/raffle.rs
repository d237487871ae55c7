use anchor_lang::prelude::*;

use crate::{
    constants::{
        BPS_DENOMINATOR, DRAW_DELAY_SLOTS, LAMPORTS_PER_TICKET, MAX_BLACKLIST, MAX_PARTICIPANTS,
        THRESHOLD_LAMPORTS, WINNER_SHARE_BPS,
    },
    error::RaffleError,
};

// 32 wallet + 8 tokens
pub const PARTICIPANT_SIZE: usize = 32 + 8;

// Space calculation:
// 8 (discriminator) +
// 32 * 6 (admin, treasury, admin_auth_1..3, payout_wallet) +
// 8 (total_sol) +
// 1 (threshold_reached) +
// 1 (winner_selected) +
// 32 (winner) +
// 8 (draw_slot) +
// 4 + 40 * participants (participants) +
// 8 (participant_count) +
// 4 + 32 * blacklist (blacklist)
const RAFFLE_STATE_FIXED_SIZE: usize = 8 + 32 * 6 + 8 + 1 + 1 + 32 + 8 + 4 + 8 + 4;

pub const RAFFLE_STATE_ACCOUNT_SIZE: usize =
    RaffleState::space(MAX_PARTICIPANTS as usize, MAX_BLACKLIST as usize);

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct Participant {
    pub wallet: Pubkey,
    pub tokens: u64,
}

/// The persistent record of one 50/50 raffle.
///
/// A raffle is single-use: it accumulates donations until `total_sol` crosses
/// [`THRESHOLD_LAMPORTS`], is resolved exactly once by a draw, and then stays
/// readable as history. The account is allocated once with room for
/// [`MAX_PARTICIPANTS`] participants and [`MAX_BLACKLIST`] blacklist entries
/// and never grows.
#[account]
#[derive(Debug, Default)]
pub struct RaffleState {
    pub admin: Pubkey,
    pub treasury: Pubkey,
    pub admin_auth_1: Pubkey,
    pub admin_auth_2: Pubkey,
    pub admin_auth_3: Pubkey,
    pub payout_wallet: Pubkey,
    pub total_sol: u64,
    pub threshold_reached: bool,
    pub winner_selected: bool,
    pub winner: Pubkey,
    /// Slot whose hash decides the draw. Set by the threshold-crossing
    /// donation, zero before that.
    pub draw_slot: u64,
    pub participants: Vec<Participant>,
    pub participant_count: u64,
    pub blacklist: Vec<Pubkey>,
}

/// What a successful donation changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DonationReceipt {
    pub tickets: u64,
    pub participant_tickets: u64,
    pub new_participant: bool,
    pub threshold_crossed: bool,
}

/// Outcome of a draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Draw {
    pub winner: Pubkey,
    pub winning_ticket: u64,
    pub total_tickets: u64,
}

/// Ticket weight bought by `amount` lamports. Remainders below one ticket are
/// not carried over.
pub fn tickets_for_lamports(amount: u64) -> u64 {
    amount / LAMPORTS_PER_TICKET
}

impl RaffleState {
    /// Serialized account size (discriminator included) for the given list lengths.
    pub const fn space(participants: usize, blacklist: usize) -> usize {
        RAFFLE_STATE_FIXED_SIZE + PARTICIPANT_SIZE * participants + 32 * blacklist
    }

    pub fn init(
        &mut self,
        admin: Pubkey,
        treasury: Pubkey,
        auxiliary_authorities: [Pubkey; 3],
        payout_wallet: Pubkey,
    ) {
        let [admin_auth_1, admin_auth_2, admin_auth_3] = auxiliary_authorities;
        self.admin = admin;
        self.treasury = treasury;
        self.admin_auth_1 = admin_auth_1;
        self.admin_auth_2 = admin_auth_2;
        self.admin_auth_3 = admin_auth_3;
        self.payout_wallet = payout_wallet;
        self.total_sol = 0;
        self.threshold_reached = false;
        self.winner_selected = false;
        self.winner = Pubkey::default();
        self.draw_slot = 0;
        self.participants = Vec::new();
        self.participant_count = 0;
        self.blacklist = Vec::new();
    }

    /// The four identities allowed to move treasury funds, primary admin first.
    pub fn authorities(&self) -> [Pubkey; 4] {
        [
            self.admin,
            self.admin_auth_1,
            self.admin_auth_2,
            self.admin_auth_3,
        ]
    }

    pub fn is_primary_admin(&self, key: &Pubkey) -> bool {
        self.admin == *key
    }

    pub fn is_authority(&self, key: &Pubkey) -> bool {
        self.authorities().iter().any(|authority| authority == key)
    }

    pub fn is_blacklisted(&self, wallet: &Pubkey) -> bool {
        self.blacklist.iter().any(|blacklisted| blacklisted == wallet)
    }

    /// True once the deciding slot is reached: its hash may be public, so the
    /// ticket weights are frozen from then on.
    pub fn is_draw_locked(&self, slot: u64) -> bool {
        self.threshold_reached && slot >= self.draw_slot
    }

    /// Fails with `AccountTooSmall` unless lists of the given lengths fit both
    /// the allocated account (`data_len`) and the compute-bounded capacity.
    pub fn ensure_capacity(participants: usize, blacklist: usize, data_len: usize) -> Result<()> {
        require!(
            participants <= MAX_PARTICIPANTS as usize
                && blacklist <= MAX_BLACKLIST as usize
                && Self::space(participants, blacklist) <= data_len,
            RaffleError::AccountTooSmall
        );
        Ok(())
    }

    /// Records `amount` lamports from `wallet`, donated at `slot`.
    ///
    /// Every precondition is checked before the first field is written, so an
    /// error leaves the record untouched. `data_len` is the allocated size of
    /// the raffle account. The donation that crosses the threshold commits
    /// the draw to `slot + DRAW_DELAY_SLOTS`.
    pub fn record_donation(
        &mut self,
        wallet: Pubkey,
        amount: u64,
        slot: u64,
        data_len: usize,
    ) -> Result<DonationReceipt> {
        require!(!self.winner_selected, RaffleError::RaffleAlreadyResolved);
        require!(!self.is_draw_locked(slot), RaffleError::DrawLocked);
        require!(
            amount >= LAMPORTS_PER_TICKET,
            RaffleError::InvalidAmount
        );
        require!(
            !self.is_blacklisted(&wallet),
            RaffleError::BlacklistedParticipant
        );

        let tickets = tickets_for_lamports(amount);
        let total_sol = self
            .total_sol
            .checked_add(amount)
            .ok_or(RaffleError::Overflow)?;

        let existing = self.participants.iter().position(|p| p.wallet == wallet);
        let participant_tickets = match existing {
            Some(index) => self.participants[index]
                .tokens
                .checked_add(tickets)
                .ok_or(RaffleError::Overflow)?,
            None => {
                Self::ensure_capacity(self.participants.len() + 1, self.blacklist.len(), data_len)?;
                tickets
            }
        };
        // Keep the total weight representable so the draw can never overflow.
        self.total_tickets()?
            .checked_add(tickets)
            .ok_or(RaffleError::Overflow)?;

        let threshold_crossed = !self.threshold_reached && total_sol >= THRESHOLD_LAMPORTS;
        let draw_slot = if threshold_crossed {
            slot.checked_add(DRAW_DELAY_SLOTS)
                .ok_or(RaffleError::Overflow)?
        } else {
            self.draw_slot
        };

        match existing {
            Some(index) => self.participants[index].tokens = participant_tickets,
            None => {
                let participant_count = self
                    .participant_count
                    .checked_add(1)
                    .ok_or(RaffleError::Overflow)?;
                self.participants.push(Participant {
                    wallet,
                    tokens: participant_tickets,
                });
                self.participant_count = participant_count;
            }
        }
        self.total_sol = total_sol;
        if threshold_crossed {
            self.threshold_reached = true;
            self.draw_slot = draw_slot;
        }

        Ok(DonationReceipt {
            tickets,
            participant_tickets,
            new_participant: existing.is_none(),
            threshold_crossed,
        })
    }

    pub fn total_tickets(&self) -> Result<u64> {
        self.participants.iter().try_fold(0u64, |total, p| {
            total
                .checked_add(p.tokens)
                .ok_or_else(|| error!(RaffleError::Overflow))
        })
    }

    /// Weighted lookup: the first participant whose running ticket total
    /// exceeds `ticket`. `None` when `ticket` is past the total weight.
    pub fn participant_holding(&self, ticket: u64) -> Option<&Participant> {
        let mut running: u64 = 0;
        for participant in self.participants.iter() {
            running = running.saturating_add(participant.tokens);
            if ticket < running {
                return Some(participant);
            }
        }
        None
    }

    /// Preconditions shared by the draw and the entropy lookup that feeds it.
    pub fn ensure_drawable(&self) -> Result<()> {
        require!(!self.winner_selected, RaffleError::WinnerAlreadySelected);
        require!(self.threshold_reached, RaffleError::ThresholdNotReached);
        require!(!self.participants.is_empty(), RaffleError::NoParticipants);
        Ok(())
    }

    /// Resolves the raffle from `random_value`.
    ///
    /// The value is reduced modulo the total ticket weight and mapped onto the
    /// participant list, so participant `i` wins with probability
    /// `tokens(i) / total`. The winner is also blacklisted when a slot is free.
    pub fn draw(&mut self, random_value: u64, data_len: usize) -> Result<Draw> {
        self.ensure_drawable()?;

        let total_tickets = self.total_tickets()?;
        require!(total_tickets > 0, RaffleError::NoParticipants);

        let winning_ticket = random_value % total_tickets;
        let winner = self
            .participant_holding(winning_ticket)
            .map(|p| p.wallet)
            .ok_or(RaffleError::NoParticipants)?;

        self.winner = winner;
        self.winner_selected = true;
        if !self.is_blacklisted(&winner)
            && Self::ensure_capacity(self.participants.len(), self.blacklist.len() + 1, data_len)
                .is_ok()
        {
            self.blacklist.push(winner);
        }

        Ok(Draw {
            winner,
            winning_ticket,
            total_tickets,
        })
    }

    pub fn add_to_blacklist(&mut self, wallet: Pubkey, data_len: usize) -> Result<()> {
        require!(
            !self.is_blacklisted(&wallet),
            RaffleError::AlreadyBlacklisted
        );
        Self::ensure_capacity(self.participants.len(), self.blacklist.len() + 1, data_len)?;
        self.blacklist.push(wallet);
        Ok(())
    }

    /// The winner's share of everything contributed.
    pub fn winner_prize(&self) -> Result<u64> {
        let prize = (self.total_sol as u128)
            .checked_mul(WINNER_SHARE_BPS as u128)
            .ok_or(RaffleError::Overflow)?
            / BPS_DENOMINATOR as u128;
        u64::try_from(prize).map_err(|_| error!(RaffleError::Overflow))
    }

    /// Lamports the treasury must keep for a winner not yet drawn.
    pub fn pending_prize(&self) -> Result<u64> {
        if self.winner_selected {
            Ok(0)
        } else {
            self.winner_prize()
        }
    }
}
