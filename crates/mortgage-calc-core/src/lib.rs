pub mod error;
pub mod types;

#[cfg(feature = "down_payment")]
pub mod down_payment;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "mortgage")]
pub mod mortgage;

pub use error::MortgageCalcError;
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageCalcResult<T> = Result<T, MortgageCalcError>;
