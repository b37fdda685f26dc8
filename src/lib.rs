//! Sentiment-weighted, hash-chained vote ledger.
//!
//! [`ledger::VotingLedger`] accepts one vote per voter, weights it by the
//! sentiment of its comment and appends it to a SHA-256 chain kept by a
//! [`store::LedgerStore`]. [`results`] tallies the weighted votes per party.

pub mod chain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod results;
pub mod seed;
pub mod sentiment;
pub mod store;

pub use error::{LedgerError, Result};
pub use ledger::{AuditReport, Receipt, VotingLedger};
pub use models::{PartySet, VoteRecord, VoteSubmission};
pub use store::{JsonFileStore, LedgerStore, MemoryStore, StoredLedger};
