use anchor_lang::error_code;

// Variant order is the client-facing code table (6000 onwards). Append only.
#[error_code]
pub enum RaffleError {
    #[msg("Participant is blacklisted")]
    BlacklistedParticipant,
    #[msg("Threshold not reached")]
    ThresholdNotReached,
    #[msg("Winner already selected")]
    WinnerAlreadySelected,
    #[msg("Unauthorized access")]
    Unauthorized,
    #[msg("Raffle is already resolved and no longer accepts donations")]
    RaffleAlreadyResolved,
    #[msg("Donation must be worth at least one ticket")]
    InvalidAmount,
    #[msg("Raffle account has no room left for this entry")]
    AccountTooSmall,
    #[msg("Raffle has no participants")]
    NoParticipants,
    #[msg("Treasury has nothing available to transfer")]
    InsufficientTreasuryBalance,
    #[msg("Treasury account does not match the raffle")]
    InvalidTreasury,
    #[msg("Invalid SlotHashes account provided")]
    InvalidSlotHashesAccount,
    #[msg("Winner account does not match the drawn participant")]
    WinnerAccountMismatch,
    #[msg("Payout wallet does not match the raffle")]
    InvalidPayoutWallet,
    #[msg("Wallet is already blacklisted")]
    AlreadyBlacklisted,
    #[msg("Treasury transfer failed")]
    TransferFailed,
    Overflow,
    #[msg("Donations are closed while the draw is pending")]
    DrawLocked,
    #[msg("The slot deciding the draw has not been produced yet")]
    DrawSlotPending,
}
