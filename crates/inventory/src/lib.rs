//! Stock ledger domain module.
//!
//! Movements are append-only facts; balances are always derived from them.
//! This crate holds the deterministic rules (no IO, no storage): movement
//! recording, balance derivation, availability and the deletion guard.

pub mod ledger;
pub mod movement;

pub use ledger::{Availability, Deficiency, LedgerSnapshot, StockDemand, derive_balance};
pub use movement::{Direction, Movement, Nature, NewMovement};
