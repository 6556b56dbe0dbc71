//! # tally-cli
//!
//! Command-line front end over a JSON workspace file. Argument parsing lives
//! in `main.rs`; handlers delegate to `tally_infra::DocumentService` and hold
//! no business rules of their own.
//!
//! ## Subcommands
//!
//! - `totals`, `next-number`, `validate`, `commit`, `delete-document`
//! - `balance`, `movements`, `record-movement`, `delete-movement`

pub mod commands;
pub mod workspace;
