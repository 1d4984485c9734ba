//! Sluice - Durable
//!
//! The durability engine: write-ahead transactions and the rotating
//! sink.
//!
//! # Architecture
//!
//! ```text
//! [upstream] --append--> [RollSink] --append--> [durable sink]
//!                            |                       |
//!                 rotation task (30s)         Transaction + WAL buffer
//!                            |                       |
//!                  swap + drain + close      commit -> destination
//! ```
//!
//! A durable sink records each batch of accepted events in a local
//! write-ahead buffer under an open [`Transaction`] and only commits
//! once the batch is durably placed downstream. The [`RollSink`]
//! bounds output units in time by periodically swapping its downstream
//! for a freshly built one, draining and closing the old one off the
//! accept path.

mod manager;
mod roll;
mod transaction;

pub use manager::{RecoveredBuffer, TransactionManager};
pub use roll::RollSink;
pub use transaction::Transaction;
