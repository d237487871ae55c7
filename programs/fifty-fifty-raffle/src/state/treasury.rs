use anchor_lang::prelude::*;

use crate::{constants::TREASURY_SEED, error::RaffleError};

// 8 discriminator + 32 raffle + 1 bump + 8 total_paid_out + 8 total_withdrawn
pub const TREASURY_ACCOUNT_SIZE: usize = 8 + 32 + 1 + 8 + 8;

/// Program-owned custody account for one raffle's donations.
/// PDA with seeds ["treasury", raffle_key].
#[account]
#[derive(Debug, Default)]
pub struct Treasury {
    pub raffle: Pubkey,
    pub bump: u8,
    /// Lamports paid to the drawn winner.
    pub total_paid_out: u64,
    /// Lamports swept to the payout wallet.
    pub total_withdrawn: u64,
}

impl Treasury {
    /// Recomputes the treasury address from the stored bump and checks that
    /// `treasury_key` is the treasury of `raffle`.
    pub fn verify(&self, treasury_key: &Pubkey, raffle: &Pubkey) -> Result<()> {
        require_keys_eq!(self.raffle, *raffle, RaffleError::InvalidTreasury);
        let expected = Pubkey::create_program_address(
            &[TREASURY_SEED, raffle.as_ref(), &[self.bump]],
            &crate::ID,
        )
        .map_err(|_| error!(RaffleError::InvalidTreasury))?;
        require_keys_eq!(expected, *treasury_key, RaffleError::InvalidTreasury);
        Ok(())
    }
}

/// Lamports that may leave a treasury holding `balance`, keeping the rent
/// reserve and any prize still owed to an undrawn winner.
pub fn withdrawable(balance: u64, rent_reserve: u64, escrowed: u64) -> u64 {
    balance.saturating_sub(rent_reserve).saturating_sub(escrowed)
}
