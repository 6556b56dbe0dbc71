//! Infrastructure layer: persistence, configuration and the async services
//! that run the invoicing and stock engines against stored collections.

pub mod bridge;
pub mod commit;
pub mod config;
pub mod ledger;
pub mod store;


pub use bridge::{BridgeReport, ConsistencyWarning, InvoiceStockBridge};
pub use commit::{CommitError, CommitReceipt, DeletionReport, DocumentService};
pub use config::{Settings, SettingsError};
pub use ledger::{LedgerError, StockLedger};
pub use store::{InMemoryRepository, Repository, StoreError, Stores};
