//! Pure domain logic for the tradeprep exam-prep platform.
//!
//! This crate has zero internal dependencies and no I/O. It holds the
//! entitlement decision logic ([`access`]), answer grading ([`question`]),
//! role names ([`roles`]), the shared error taxonomy ([`error`]), and the
//! primitive type aliases ([`types`]).

pub mod access;
pub mod error;
pub mod question;
pub mod roles;
pub mod types;
