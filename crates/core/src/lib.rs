//! `gstledger-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, aggregate and value-object traits, the event trait and
//! the GST registration identifier.

pub mod aggregate;
pub mod error;
pub mod event;
pub mod gstin;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use gstin::{Gstin, StateCode};
pub use value_object::ValueObject;
