//! Binary forging of batched transfer operations.
//!
//! Layout of a forged batch:
//!
//! ```text
//! branch (32) ‖ tx₁ ‖ tx₂ ‖ … ‖ txₙ
//! tx = 0x6c ‖ source (21) ‖ fee ‖ counter ‖ gas_limit ‖ storage_limit ‖ amount
//!           ‖ destination (22) ‖ 0x00
//! ```
//!
//! Numeric fields are zarith naturals. See [`zarith`].

pub mod address;
pub mod error;
pub mod operation;
pub mod zarith;

pub use error::ForgeError;
pub use operation::{forge, ForgedOperation, Transaction, TRANSACTION_TAG};
