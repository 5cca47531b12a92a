//! Core concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: parsing and validation failures
//! - [`string`]: text helpers for log and console output

pub mod error;
pub mod string;
