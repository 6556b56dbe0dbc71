//! `tally-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the entity contract, the domain error model and the
//! currency rounding rule shared by every computation.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CatalogEntryId, DocumentId, MovementId, PartyId, TaxRateId};
pub use money::{CURRENCY_SCALE, round_currency};
