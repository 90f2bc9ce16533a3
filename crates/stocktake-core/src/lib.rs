//! Core types and reconciliation logic for the stocktake system.
//!
//! No HTTP or database dependencies here. Storage backends implement [`store::StockStore`]; the recorder, status
//! tracker and pilferage reporter are written against that trait only.

// Implementors write `async fn`; the trait signatures carry the `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod notify;
pub mod reference;
pub mod report;
pub mod status;
pub mod store;
pub mod submission;
pub mod week;

pub use error::{Error, Result};
pub use week::WeekKey;

#[cfg(test)]
pub(crate) mod testing;
