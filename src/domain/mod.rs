//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//! The escrow lifecycle state machine lives here; everything it
//! needs to validate a transition is in-memory data.

pub mod attachment;
pub mod escrow;
pub mod kyc;
pub mod password;
pub mod payment;
pub mod session;
pub mod user;

pub use attachment::{FilePurpose, FileRecord};
pub use escrow::{AuditEntry, AuditType, Escrow, EscrowStatus, EscrowTransition, TransitionError};
pub use kyc::{KycStatus, KycSubmission};
pub use password::Password;
pub use payment::{DepositInstructions, PaymentMethod, WithdrawalMethod};
pub use session::{Identity, Session};
pub use user::{User, UserResponse, UserRole};
