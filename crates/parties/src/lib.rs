//! Parties domain module (the seller issuing invoices and the buyers billed).
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod party;

pub use party::Party;
