//! Batch driver behind the `gstledger` binary.

pub mod batch;

pub use batch::{Batch, BatchInvoice, IssuedInvoice, RunSummary, run};
