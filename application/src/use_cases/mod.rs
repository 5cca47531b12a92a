//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod controller;
pub mod enrichment;
pub mod explore;
pub mod input_broker;
pub mod shared;

#[cfg(test)]
pub(crate) mod test_support;
