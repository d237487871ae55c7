pub use blacklist_wallet::*;
pub use donate::*;
pub use initialize::*;
pub use select_winner::*;
pub use withdraw_funds::*;

pub mod blacklist_wallet;
pub mod donate;
pub mod initialize;
pub mod select_winner;
pub mod withdraw_funds;
