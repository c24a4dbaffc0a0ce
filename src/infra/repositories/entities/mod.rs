//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod escrow;
pub mod escrow_file;
pub mod kyc_submission;
pub mod payment_method;
pub mod session;
pub mod transaction;
pub mod user;
pub mod withdrawal_method;
