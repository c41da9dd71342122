//! Assessment domain model.
//!
//! # Responsibility
//! - Define the organizational hierarchy supplied as seed data.
//! - Define the mutable assessment entities: tests, questions, answers,
//!   results.
//!
//! # Invariants
//! - Every entity is identified by its own identifier type; identifiers of
//!   different entities are never interchangeable.
//! - Model types carry no behavior beyond construction helpers. Business
//!   rules live in `service`.

pub mod assessment;
pub mod ids;
pub mod organization;

/// Unix epoch milliseconds.
pub type Timestamp = i64;
